use async_graphql::{SimpleObject, Union, dataloader::DataLoader};
use uuid::Uuid;

use super::loader::PodcastLoader;
use super::types::Podcast;
use crate::authentication::{CurrentUser, IsAuthenticated};
use crate::prelude::*;

#[derive(SimpleObject)]
pub struct PodcastDoesNotExistError {
    pub message: String,
}

impl Default for PodcastDoesNotExistError {
    fn default() -> Self {
        Self {
            message: "Podcast not found".to_string(),
        }
    }
}

#[derive(SimpleObject)]
pub struct AlreadySubscribedToPodcastError {
    pub message: String,
}

impl Default for AlreadySubscribedToPodcastError {
    fn default() -> Self {
        Self {
            message: "You are already subscribed to this podcast".to_string(),
        }
    }
}

#[derive(SimpleObject)]
pub struct SubscribeToPodcastSuccess {
    pub podcast: Podcast,
}

#[derive(Union)]
pub enum SubscribeToPodcastResponse {
    PodcastDoesNotExist(PodcastDoesNotExistError),
    AlreadySubscribed(AlreadySubscribedToPodcastError),
    Success(SubscribeToPodcastSuccess),
}

#[derive(Default)]
pub struct PodcastsMutation;

#[Object]
impl PodcastsMutation {
    /// Subscribe the logged-in user to a podcast.
    #[graphql(guard = "IsAuthenticated")]
    async fn subscribe_to_podcast(
        &self,
        context: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<SubscribeToPodcastResponse> {
        let user = context.data::<CurrentUser>()?;

        let Ok(podcast_id) = Uuid::parse_str(&id) else {
            return Ok(SubscribeToPodcastResponse::PodcastDoesNotExist(
                Default::default(),
            ));
        };

        let loader = context.data::<DataLoader<PodcastLoader>>()?;
        let Some(podcast) = loader.load_one(podcast_id).await? else {
            return Ok(SubscribeToPodcastResponse::PodcastDoesNotExist(
                Default::default(),
            ));
        };

        let pool = get_pgpool(context)?;

        let inserted = sqlx::query(
            "INSERT INTO subscriptions (user_id, podcast_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user.id)
        .bind(podcast.id)
        .execute(&pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(SubscribeToPodcastResponse::AlreadySubscribed(
                Default::default(),
            ));
        }

        tracing::info!(user = %user.id, podcast = %podcast.id, "Subscribed to podcast");

        Ok(SubscribeToPodcastResponse::Success(
            SubscribeToPodcastSuccess { podcast },
        ))
    }
}
