use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::error::Result;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str) -> Result<Self> {
        // Ensure the data directory exists
        if let Some(path) = url.strip_prefix("sqlite:") {
            let path = path.split('?').next().unwrap_or(path);
            if !path.starts_with(":memory:") {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // Every connection to an in-memory database sees its own empty database.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?
        };

        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect("sqlite::memory:").await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
