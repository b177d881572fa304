use async_graphql::{EmptySubscription, MergedObject, Schema, dataloader::DataLoader};
use poem::session::Session;

use crate::authentication::{AuthenticationMutation, CurrentUser};
use crate::database::DatabasePool;
use crate::podcasts::{PodcastLoader, PodcastsMutation, PodcastsQuery};
use crate::utils::PagePolicy;

#[derive(MergedObject)]
pub struct QueryRoot(PodcastsQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(PodcastsMutation, AuthenticationMutation);

pub type CatalogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema. Fails if an ordering is invalid.
pub fn build_schema(pool: DatabasePool, policy: PagePolicy) -> anyhow::Result<CatalogSchema> {
    let query = QueryRoot(PodcastsQuery::new()?);

    let schema = Schema::build(query, MutationRoot::default(), EmptySubscription)
        .data(pool)
        .data(policy)
        .finish();

    Ok(schema)
}

/// Attach the per-request data: the session, its user and a fresh loader.
pub fn with_request_data(
    request: async_graphql::Request,
    pool: &DatabasePool,
    session: &Session,
) -> async_graphql::Request {
    let loader = DataLoader::new(PodcastLoader::new(pool.get_pool()), tokio::spawn);
    let request = request.data(session.clone()).data(loader);

    match CurrentUser::from_session(session) {
        Some(user) => request.data(user),
        None => request,
    }
}
