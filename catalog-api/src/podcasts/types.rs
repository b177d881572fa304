use async_graphql::{ComplexObject, Context, ID, SimpleObject, dataloader::DataLoader};
use catalog_pagination::{KeyKind, KeyValue, Sortable};
use uuid::Uuid;

use super::loader::PodcastLoader;

/// Columns selected whenever a [`Podcast`] row is loaded.
pub const PODCAST_COLUMNS: &str = "id, title, subtitle, hosted_by, description, website, image";

/// A podcast in the catalog.
#[derive(Debug, Clone, SimpleObject, sqlx::FromRow)]
#[graphql(complex)]
pub struct Podcast {
    #[graphql(skip)]
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    /// The host or author of the podcast.
    pub hosted_by: String,
    pub description: String,
    pub website: String,
    /// URL of the cover image.
    pub image: String,
}

#[ComplexObject]
impl Podcast {
    /// The ID of the podcast.
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }
}

// Sort field names double as column names in keyset queries.
impl Sortable for Podcast {
    const SORT_FIELDS: &'static [(&'static str, KeyKind)] =
        &[("id", KeyKind::Uuid), ("title", KeyKind::Text)];
    const UNIQUE_FIELDS: &'static [&'static str] = &["id"];

    fn sort_value(&self, field: &str) -> KeyValue {
        match field {
            "id" => self.id.into(),
            "title" => self.title.as_str().into(),
            _ => KeyValue::Null,
        }
    }
}

/// An episode of a podcast.
#[derive(Debug, Clone, SimpleObject, sqlx::FromRow)]
#[graphql(complex)]
pub struct Episode {
    #[graphql(skip)]
    pub id: Uuid,
    pub title: String,
    /// Show notes.
    pub notes: String,
    /// Length of the episode, in seconds.
    pub total_time: i32,
    pub published_at: chrono::DateTime<chrono::Utc>,
    #[graphql(skip)]
    pub podcast_id: Uuid,
}

#[ComplexObject]
impl Episode {
    /// The ID of the episode.
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    /// The podcast this episode belongs to.
    ///
    /// Lookups are batched per request, so listing many episodes costs a
    /// single podcast query.
    async fn podcast(&self, context: &Context<'_>) -> async_graphql::Result<Podcast> {
        let loader = context.data::<DataLoader<PodcastLoader>>()?;

        loader
            .load_one(self.podcast_id)
            .await?
            .ok_or_else(|| format!("Podcast {} not found", self.podcast_id).into())
    }
}
