use std::{collections::HashMap, net::SocketAddr};

use anyhow::Context;
use config::{Environment, File, FileFormat, builder::DefaultState};
use dotenvy::vars;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_PAGE_SIZE: usize = 50;

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Largest `first` the connection fields accept.
    pub max_page_size: usize,
    pub run_migrations: bool,
}

pub fn parse_config() -> anyhow::Result<Config> {
    let dotenv_variables = HashMap::from_iter(vars());

    let config = config::ConfigBuilder::<DefaultState>::default()
        .add_source(Environment::default().prefix("PODCAST"))
        .add_source(Environment::default().source(Some(dotenv_variables)))
        .add_source(File::new("config.toml", FileFormat::Toml).required(false))
        .build()
        .context("Failed to build configuration")?;

    from_source(&config)
}

fn from_source(config: &config::Config) -> anyhow::Result<Config> {
    let database_url = config
        .get_string("database_url")
        .context("You should define the DATABASE_URL.")?;

    let bind_addr = config
        .get_string("bind_addr")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("Invalid BIND_ADDR")?;

    let max_page_size = match config.get_int("max_page_size") {
        Ok(size) => usize::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .context("MAX_PAGE_SIZE must be a positive integer")?,
        Err(_) => DEFAULT_MAX_PAGE_SIZE,
    };

    let run_migrations = config.get_bool("run_migrations").unwrap_or(true);

    Ok(Config {
        database_url,
        bind_addr,
        max_page_size,
        run_migrations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> config::Config {
        let mut builder = config::ConfigBuilder::<DefaultState>::default();
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config =
            from_source(&build(&[("database_url", "postgres://localhost/podcasts")])).unwrap();

        assert_eq!(config.database_url, "postgres://localhost/podcasts");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_page_size, 50);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let config = from_source(&build(&[
            ("database_url", "postgres://db/podcasts"),
            ("bind_addr", "127.0.0.1:9000"),
            ("max_page_size", "20"),
            ("run_migrations", "false"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.max_page_size, 20);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(from_source(&build(&[])).is_err());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let result = from_source(&build(&[
            ("database_url", "postgres://db/podcasts"),
            ("max_page_size", "0"),
        ]));

        assert!(result.is_err());
    }
}
