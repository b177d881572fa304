pub(crate) mod authentication;
pub(crate) mod config;
pub(crate) mod database;
pub(crate) mod keyset;
pub(crate) mod podcasts;
pub(crate) mod prelude;
pub(crate) mod schema;
pub(crate) mod utils;

use anyhow::Context as _;
use async_graphql::http::GraphiQLSource;
use async_graphql_poem::{GraphQLRequest, GraphQLResponse};
use database::DatabasePool;
use poem::{
    EndpointExt, IntoResponse, Route, Server, get, handler,
    listener::TcpListener,
    session::{CookieConfig, MemoryStorage, ServerSession, Session},
    web::{Data, Html},
};
use schema::CatalogSchema;
use utils::PagePolicy;

const SESSION_COOKIE: &str = "podcast_session";

#[handler]
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/").finish())
}

#[handler]
async fn graphql(
    schema: Data<&CatalogSchema>,
    pool: Data<&DatabasePool>,
    session: &Session,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let request = schema::with_request_data(request.0, &pool, session);

    schema.execute(request).await.into()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::parse_config()?;

    let pool = DatabasePool::connect(&config.database_url).await?;

    if config.run_migrations {
        pool.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    let schema = schema::build_schema(
        pool.clone(),
        PagePolicy {
            max_page_size: config.max_page_size,
        },
    )?;

    let app = Route::new()
        .at("/", get(graphiql).post(graphql))
        .with(ServerSession::new(
            CookieConfig::default().name(SESSION_COOKIE),
            MemoryStorage::new(),
        ))
        .data(schema)
        .data(pool);

    tracing::info!(
        "To access the GraphQL playground, visit http://127.0.0.1:{port}",
        port = config.bind_addr.port()
    );

    Server::new(TcpListener::bind(config.bind_addr))
        .run(app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
