use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::db::Store;
use crate::domain::SeriesId;
use crate::models::series::{Recommendation, SeriesDetails};

/// Read-only series metadata source.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// `Ok(None)` when the provider does not know the series.
    async fn series(&self, id: SeriesId) -> anyhow::Result<Option<SeriesDetails>>;

    async fn recommendations(&self, id: SeriesId) -> anyhow::Result<Vec<Recommendation>>;
}

/// Serves series details from the local cache while fresh, falling back to
/// the wrapped provider and refreshing the cache on success.
///
/// Cache failures are logged and otherwise ignored.
pub struct CachedMetadata {
    store: Store,
    inner: Arc<dyn MetadataProvider>,
    ttl: chrono::Duration,
}

impl CachedMetadata {
    #[must_use]
    pub fn new(store: Store, inner: Arc<dyn MetadataProvider>, ttl: chrono::Duration) -> Self {
        Self { store, inner, ttl }
    }

    async fn cached(&self, id: SeriesId) -> Option<SeriesDetails> {
        match self.store.get_cached_metadata(id).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(details) => Some(details),
                Err(e) => {
                    debug!(series = %id, error = %e, "Ignoring unreadable cached metadata");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(series = %id, error = %e, "Metadata cache lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for CachedMetadata {
    async fn series(&self, id: SeriesId) -> anyhow::Result<Option<SeriesDetails>> {
        if let Some(details) = self.cached(id).await {
            debug!(series = %id, "Metadata cache hit");
            return Ok(Some(details));
        }

        let details = self.inner.series(id).await?;

        if let Some(details) = &details {
            let payload = serde_json::to_string(details)?;
            if let Err(e) = self.store.cache_metadata(id, &payload, self.ttl).await {
                debug!(series = %id, error = %e, "Failed to cache metadata");
            }
        }

        Ok(details)
    }

    async fn recommendations(&self, id: SeriesId) -> anyhow::Result<Vec<Recommendation>> {
        self.inner.recommendations(id).await
    }
}
