use crate::models::{EntitySet, TableCounts};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod repositories;
pub mod schema;

pub use repositories::{DirectorCount, GenreAverage, MovieAverage, YearAverage};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

/// Filesystem path behind a `sqlite:` URL, or `None` for in-memory stores.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let path = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(path)
    }
}

impl Store {
    /// Open the store and apply the schema. A single connection keeps the
    /// foreign-key pragma and the refresh transaction on the same handle.
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 1, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        schema::apply(&conn).await?;

        info!(
            "Database connected & schema applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn refresh_repo(&self) -> repositories::RefreshRepository {
        repositories::RefreshRepository::new(self.conn.clone())
    }

    fn analytics_repo(&self) -> repositories::AnalyticsRepository {
        repositories::AnalyticsRepository::new(self.conn.clone())
    }

    pub async fn replace_all(&self, set: &EntitySet, chunk_size: usize) -> Result<TableCounts> {
        self.refresh_repo().replace_all(set, chunk_size).await
    }

    pub async fn table_counts(&self) -> Result<TableCounts> {
        self.analytics_repo().table_counts().await
    }

    pub async fn top_rated_movies(&self, min_ratings: u32) -> Result<Vec<MovieAverage>> {
        self.analytics_repo().top_rated_movies(min_ratings).await
    }

    pub async fn most_prolific_directors(&self) -> Result<Vec<DirectorCount>> {
        self.analytics_repo().most_prolific_directors().await
    }

    pub async fn top_genres_by_average(&self, limit: u32) -> Result<Vec<GenreAverage>> {
        self.analytics_repo().top_genres_by_average(limit).await
    }

    pub async fn average_rating_by_year(&self) -> Result<Vec<YearAverage>> {
        self.analytics_repo().average_rating_by_year().await
    }
}
