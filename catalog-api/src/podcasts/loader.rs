use std::{collections::HashMap, sync::Arc};

use async_graphql::dataloader::Loader;
use uuid::Uuid;

use super::types::{PODCAST_COLUMNS, Podcast};

/// Batches podcast lookups by id.
///
/// A new `DataLoader<PodcastLoader>` is attached to every GraphQL request,
/// so its cache lives exactly as long as the request.
pub struct PodcastLoader {
    pool: sqlx::PgPool,
}

impl PodcastLoader {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for PodcastLoader {
    type Value = Podcast;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Loading podcasts by id");

        let podcasts = sqlx::query_as::<_, Podcast>(&format!(
            "SELECT {PODCAST_COLUMNS} FROM podcasts WHERE id = ANY($1)"
        ))
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(Arc::new)?;

        Ok(podcasts
            .into_iter()
            .map(|podcast| (podcast.id, podcast))
            .collect())
    }
}
