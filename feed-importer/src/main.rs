//! Import podcast RSS feeds into the catalog database.
//!
//! ```bash
//! podcast-import import-feeds https://example.com/feed.xml
//! podcast-import podcast-ids --limit 10
//! podcast-import create-user --email jane@example.com --password secret
//! ```

mod config;
mod feed;
mod import;

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "podcast-import")]
#[command(about = "Maintenance commands for the podcast catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch RSS feeds and upsert their podcasts and episodes.
    ImportFeeds {
        #[arg(required = true)]
        feed_urls: Vec<String>,
    },
    /// Print `id: title` of the first podcasts.
    PodcastIds {
        #[arg(long, default_value_t = 5)]
        limit: i64,
    },
    /// Create a user that can log in to the API.
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, env = "PODCAST_USER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = config::parse_config()?;

    let pool = sqlx::PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    match cli.command {
        Command::ImportFeeds { feed_urls } => {
            let client = config.http_client()?;
            let mut failed = 0;

            for feed_url in &feed_urls {
                match import::import_feed(&pool, &client, feed_url).await {
                    Ok(summary) => println!(
                        "{id}: {title} ({episodes} episodes)",
                        id = summary.podcast_id,
                        title = summary.title,
                        episodes = summary.episodes
                    ),
                    Err(e) => {
                        tracing::error!("Failed to import {feed_url}: {e:?}");
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                tracing::warn!("{failed} of {total} feeds failed", total = feed_urls.len());
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::PodcastIds { limit } => {
            for (id, title) in import::podcast_ids(&pool, limit).await? {
                println!("{id}: {title}");
            }
        }
        Command::CreateUser {
            email,
            name,
            password,
        } => {
            let id = import::upsert_user(&pool, &email, &name, &password).await?;
            println!("{id}: {email}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_podcast_ids_default_limit() {
        let cli = Cli::try_parse_from(["podcast-import", "podcast-ids"]).unwrap();

        assert!(matches!(cli.command, Command::PodcastIds { limit: 5 }));
    }

    #[test]
    fn test_import_feeds_requires_a_url() {
        assert!(Cli::try_parse_from(["podcast-import", "import-feeds"]).is_err());
    }
}
