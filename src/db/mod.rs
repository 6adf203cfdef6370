use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::{EpisodeRef, SeriesId};

pub mod migrator;
pub mod repositories;

/// Failure of the local database or of a stored document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<serde_json::Error>() {
            Ok(json) => Self::Serialization(json),
            Err(other) => Self::Database(other.to_string()),
        }
    }
}

/// String-keyed, JSON-valued document storage for watch state.
#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the whole document stored under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Operator-curated links for one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDocument {
    pub series: SeriesId,
    pub episode: EpisodeRef,
    pub links: Vec<String>,
}

/// Read access to the override document store.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Looks up the document at `series/{series}/seasons/{s}/episodes/{e}`.
    async fn get(
        &self,
        series: SeriesId,
        episode: EpisodeRef,
    ) -> Result<Option<OverrideDocument>, StoreError>;

    /// Collection-wide scan over every series' episode documents.
    async fn scan(&self) -> Result<Vec<OverrideDocument>, StoreError>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        let in_memory = path_str.starts_with(":memory:");

        if !in_memory {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each in-memory connection would see its own empty database.
        let max_connections = if in_memory { 1 } else { max_connections };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections.min(max_connections),
            max_connections
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

    fn state_repo(&self) -> repositories::state::StateRepository {
        repositories::state::StateRepository::new(self.conn.clone())
    }

    fn override_repo(&self) -> repositories::overrides::OverrideRepository {
        repositories::overrides::OverrideRepository::new(self.conn.clone())
    }

    fn metadata_cache_repo(&self) -> repositories::metadata_cache::MetadataCacheRepository {
        repositories::metadata_cache::MetadataCacheRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Override documents
    // ========================================================================

    pub async fn set_override(
        &self,
        series: SeriesId,
        episode: EpisodeRef,
        links: &[String],
    ) -> Result<()> {
        self.override_repo().upsert(series, episode, links).await
    }

    pub async fn remove_override(&self, series: SeriesId, episode: EpisodeRef) -> Result<bool> {
        self.override_repo().delete(series, episode).await
    }

    // ========================================================================
    // Metadata cache
    // ========================================================================

    pub async fn get_cached_metadata(&self, series: SeriesId) -> Result<Option<String>> {
        self.metadata_cache_repo().get_fresh(series).await
    }

    pub async fn cache_metadata(
        &self,
        series: SeriesId,
        payload_json: &str,
        ttl: chrono::Duration,
    ) -> Result<()> {
        self.metadata_cache_repo()
            .put(series, payload_json, ttl)
            .await
    }
}

#[async_trait]
impl StateBackend for Store {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state_repo().get(key).await?)
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.state_repo().put(key, value).await?)
    }
}

#[async_trait]
impl OverrideStore for Store {
    async fn get(
        &self,
        series: SeriesId,
        episode: EpisodeRef,
    ) -> Result<Option<OverrideDocument>, StoreError> {
        Ok(self.override_repo().get(series, episode).await?)
    }

    async fn scan(&self) -> Result<Vec<OverrideDocument>, StoreError> {
        Ok(self.override_repo().list_all().await?)
    }
}
