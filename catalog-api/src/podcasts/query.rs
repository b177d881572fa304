use async_graphql::connection::{Connection, EmptyFields};
use async_graphql::dataloader::DataLoader;
use catalog_pagination::{Cursor, OrderSpec, paginate};
use uuid::Uuid;

use super::loader::PodcastLoader;
use super::source::PodcastSource;
use super::types::{Episode, Podcast};
use crate::prelude::*;

/// Ordering of every podcast connection.
pub const PODCAST_ORDERING: &[&str] = &["title", "-id"];

pub type PodcastConnection = Connection<ConnectionCursor, Podcast, EmptyFields, EmptyFields>;

pub struct PodcastsQuery {
    order: OrderSpec,
}

impl PodcastsQuery {
    pub fn new() -> anyhow::Result<Self> {
        let order = OrderSpec::parse::<Podcast>(PODCAST_ORDERING)?;

        Ok(Self { order })
    }

    async fn connection(
        &self,
        context: &Context<'_>,
        source: &PodcastSource<'_>,
        first: i32,
        after: Option<ID>,
    ) -> async_graphql::Result<PodcastConnection> {
        let first = context.data::<PagePolicy>()?.check("first", first)?;
        let after = after.map(|after| Cursor::from(after.0));

        tracing::info!("after: {:?}, first: {:?}", after, first);

        let page = paginate(source, &self.order, first, after.as_ref())
            .await
            .map_err(pagination_error)?;

        Ok(into_connection(page, |podcast| podcast))
    }
}

#[Object]
impl PodcastsQuery {
    /// Get a podcast by its ID.
    ///
    /// Returns `null` when there is no such podcast.
    async fn podcast(
        &self,
        context: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<Podcast>> {
        let Ok(id) = Uuid::parse_str(&id) else {
            return Ok(None);
        };

        let loader = context.data::<DataLoader<PodcastLoader>>()?;

        Ok(loader.load_one(id).await?)
    }

    /// List podcasts ordered by title.
    async fn podcasts(
        &self,
        context: &Context<'_>,
        #[graphql(default = 10)] first: i32,
        after: Option<ID>,
    ) -> async_graphql::Result<PodcastConnection> {
        let pool = get_pgpool(context)?;

        self.connection(context, &PodcastSource::all(&pool), first, after)
            .await
    }

    /// Find podcasts whose title contains `query`, ignoring case.
    async fn find_podcasts(
        &self,
        context: &Context<'_>,
        query: String,
        #[graphql(default = 10)] first: i32,
        after: Option<ID>,
    ) -> async_graphql::Result<PodcastConnection> {
        let pool = get_pgpool(context)?;

        self.connection(context, &PodcastSource::search(&pool, &query), first, after)
            .await
    }

    /// The most recently published episodes, newest first.
    async fn latest_episodes(
        &self,
        context: &Context<'_>,
        #[graphql(default = 5)] last: i32,
    ) -> async_graphql::Result<Vec<Episode>> {
        let last = context.data::<PagePolicy>()?.check("last", last)?;
        let pool = get_pgpool(context)?;

        let episodes = sqlx::query_as::<_, Episode>(
            "SELECT id, title, notes, total_time, published_at, podcast_id FROM episodes ORDER BY published_at DESC, id DESC LIMIT $1",
        )
        .bind(i64::try_from(last)?)
        .fetch_all(&pool)
        .await?;

        Ok(episodes)
    }
}
