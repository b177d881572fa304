use std::{collections::HashMap, time::Duration};

use anyhow::Context;
use config::{Environment, File, FileFormat, builder::DefaultState};
use dotenvy::vars;

const DEFAULT_USER_AGENT: &str = concat!("podcast-import/", env!("CARGO_PKG_VERSION"));
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub struct ImporterConfig {
    pub database_url: String,
    /// Sent with every feed request.
    pub user_agent: String,
    pub fetch_timeout: Duration,
}

impl ImporterConfig {
    /// HTTP client used to download feeds.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.fetch_timeout)
            .build()
            .context("Failed to build the HTTP client")
    }
}

pub fn parse_config() -> anyhow::Result<ImporterConfig> {
    let dotenv_variables = HashMap::from_iter(vars());

    let config = config::ConfigBuilder::<DefaultState>::default()
        .add_source(Environment::default().prefix("PODCAST"))
        .add_source(Environment::default().source(Some(dotenv_variables)))
        .add_source(File::new("config.toml", FileFormat::Toml).required(false))
        .build()
        .context("Failed to build configuration")?;

    from_source(&config)
}

fn from_source(config: &config::Config) -> anyhow::Result<ImporterConfig> {
    let database_url = config.get_string("database_url").context(
        "You should define the DATABASE_URL. The importer writes podcasts to the catalog database.",
    )?;

    let user_agent = config
        .get_string("user_agent")
        .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

    let fetch_timeout = match config.get_int("fetch_timeout_secs") {
        Ok(secs) => u64::try_from(secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .context("FETCH_TIMEOUT_SECS must be a positive integer")?,
        Err(_) => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
    };

    Ok(ImporterConfig {
        database_url,
        user_agent,
        fetch_timeout,
    })
}
