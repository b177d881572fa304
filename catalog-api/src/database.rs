use anyhow::Context;

#[derive(Clone)]
pub struct DatabasePool(sqlx::PgPool);

impl DatabasePool {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = sqlx::PgPool::connect(url)
            .await
            .context("Failed to connect to the database")?;

        Ok(Self(pool))
    }

    /// Apply the pending migrations of the shared schema.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("../migrations")
            .run(&self.0)
            .await
            .context("Failed to run database migrations")?;

        Ok(())
    }

    pub fn get_pool(&self) -> sqlx::PgPool {
        self.0.clone()
    }
}

impl From<sqlx::PgPool> for DatabasePool {
    fn from(pool: sqlx::PgPool) -> Self {
        Self(pool)
    }
}
