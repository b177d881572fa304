use anyhow::Context;
use uuid::Uuid;

use crate::feed::{self, ParsedPodcast};

/// Outcome of importing one feed.
#[derive(Debug)]
pub struct ImportSummary {
    pub podcast_id: Uuid,
    pub title: String,
    pub episodes: usize,
}

/// Download, parse and store one feed.
#[tracing::instrument(skip(pool, client))]
pub async fn import_feed(
    pool: &sqlx::PgPool,
    client: &reqwest::Client,
    feed_url: &str,
) -> anyhow::Result<ImportSummary> {
    let body = client
        .get(feed_url)
        .send()
        .await
        .context("Failed to fetch the feed")?
        .error_for_status()?
        .text()
        .await?;

    let podcast = feed::parse_feed(&body)?;

    tracing::info!(
        "Parsed feed: {title}, found {count} episodes",
        title = podcast.title,
        count = podcast.episodes.len()
    );

    store_podcast(pool, &podcast).await
}

/// Upsert the podcast by title and each episode by `(podcast, title)`.
///
/// A feed is stored in a single transaction.
pub async fn store_podcast(
    pool: &sqlx::PgPool,
    podcast: &ParsedPodcast,
) -> anyhow::Result<ImportSummary> {
    let mut tx = pool.begin().await?;

    let podcast_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO podcasts (title, subtitle, description, website, image, hosted_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (title) DO UPDATE SET
            subtitle = EXCLUDED.subtitle,
            description = EXCLUDED.description,
            website = EXCLUDED.website,
            image = EXCLUDED.image,
            hosted_by = EXCLUDED.hosted_by
        RETURNING id
        "#,
    )
    .bind(&podcast.title)
    .bind(&podcast.subtitle)
    .bind(&podcast.description)
    .bind(&podcast.link)
    .bind(&podcast.cover_url)
    .bind(&podcast.itunes_author)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to store the podcast")?;

    tracing::info!("Podcast id: {podcast_id}");

    let mut episodes = 0;

    for episode in &podcast.episodes {
        if episode.title.is_empty() {
            tracing::warn!(guid = %episode.guid, "Skipping episode without title");
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO episodes (podcast_id, title, notes, published_at, total_time, audio)
            VALUES ($1, $2, $3, COALESCE($4, now()), $5, $6)
            ON CONFLICT (podcast_id, title) DO UPDATE SET
                notes = EXCLUDED.notes,
                published_at = COALESCE($4, episodes.published_at),
                total_time = EXCLUDED.total_time,
                audio = EXCLUDED.audio
            "#,
        )
        .bind(podcast_id)
        .bind(&episode.title)
        .bind(&episode.description)
        .bind(episode.published)
        .bind(episode.total_time)
        .bind(&episode.audio_url)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to store episode {:?}", episode.title))?;

        tracing::debug!(title = %episode.title, "Imported episode");
        episodes += 1;
    }

    tx.commit().await?;

    Ok(ImportSummary {
        podcast_id,
        title: podcast.title.clone(),
        episodes,
    })
}

/// Id and title of the first `limit` podcasts.
pub async fn podcast_ids(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<Vec<(Uuid, String)>> {
    let podcasts = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, title FROM podcasts ORDER BY title LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(podcasts)
}

/// Create a user, or reset the name and password of an existing one.
pub async fn upsert_user(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash =
        bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash the password")?;

    let id = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, name, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
