use catalog_pagination::{KeyValue, OrderSpec, OrderedSource};
use sqlx::{Postgres, QueryBuilder};

use super::types::{PODCAST_COLUMNS, Podcast};
use crate::keyset;

/// The podcasts table, optionally narrowed to titles containing a string.
pub struct PodcastSource<'a> {
    pool: &'a sqlx::PgPool,
    title_contains: Option<&'a str>,
}

impl<'a> PodcastSource<'a> {
    pub fn all(pool: &'a sqlx::PgPool) -> Self {
        Self {
            pool,
            title_contains: None,
        }
    }

    /// Podcasts whose title contains `query`, ignoring case.
    pub fn search(pool: &'a sqlx::PgPool, query: &'a str) -> Self {
        Self {
            pool,
            title_contains: Some(query),
        }
    }

    fn build_query(
        &self,
        order: &OrderSpec,
        after: Option<&[KeyValue]>,
        limit: usize,
    ) -> QueryBuilder<'static, Postgres> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {PODCAST_COLUMNS} FROM podcasts WHERE TRUE"));

        if let Some(query) = self.title_contains {
            builder
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(query)));
        }

        if let Some(key) = after {
            builder.push(" AND ");
            keyset::push_after(&mut builder, order, key);
        }

        keyset::push_order_by(&mut builder, order);

        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));

        builder
    }
}

impl OrderedSource for PodcastSource<'_> {
    type Item = Podcast;
    type Error = sqlx::Error;

    async fn fetch_ordered(
        &self,
        order: &OrderSpec,
        after: Option<&[KeyValue]>,
        limit: usize,
    ) -> Result<Vec<Podcast>, Self::Error> {
        let mut builder = self.build_query(order, after, limit);

        builder
            .build_query_as::<Podcast>()
            .fetch_all(self.pool)
            .await
    }
}

/// Escape `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());

    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
