use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::clients::availability::AvailabilityClient;
use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::SeriesId;
use crate::models::watch::SeriesSummary;
use crate::services::{
    AvailabilityProbe, CachedMetadata, EpisodeCatalogBuilder, PlaybackResolver, SeriesView,
    SeriesViewService, SourceSelector, WatchStateStore,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub series: Arc<SeriesViewService>,

    pub resolver: Arc<PlaybackResolver>,

    pub watch: Arc<WatchStateStore>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            1,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tmdb = Arc::new(TmdbClient::new(&config.metadata));
        let ttl = i64::try_from(config.metadata.cache_ttl_seconds).unwrap_or(i64::MAX);
        let metadata = Arc::new(CachedMetadata::new(
            store.clone(),
            tmdb,
            chrono::Duration::seconds(ttl),
        ));

        let overrides = Arc::new(store.clone());

        let series = Arc::new(SeriesViewService::new(
            metadata,
            overrides.clone(),
            EpisodeCatalogBuilder::new(config.catalog.episodes_per_season),
        ));

        let probe = AvailabilityProbe::new(
            overrides,
            Arc::new(AvailabilityClient::new(&config.sources)),
            Duration::from_secs(config.sources.request_timeout_seconds),
        );
        let resolver = Arc::new(PlaybackResolver::new(
            probe,
            SourceSelector::from_config(&config.sources),
        ));

        let watch = Arc::new(WatchStateStore::with_capacity(
            Arc::new(store.clone()),
            config.watch.continue_watching_capacity,
        ));

        Self {
            config: Arc::new(config),
            store,
            series,
            resolver,
            watch,
        }
    }

    /// Display fields for watch-state entries. Without metadata the entries
    /// are still written, with empty title and poster.
    pub async fn summary(&self, id: SeriesId) -> SeriesSummary {
        match self.series.load(id).await {
            Ok(view) => view.summary(),
            Err(e) => {
                warn!(series = %id, error = %e, "Recording watch state without series details");
                SeriesSummary::new(id, "", "")
            }
        }
    }

    pub async fn load_view(&self, id: SeriesId) -> Option<SeriesView> {
        match self.series.load(id).await {
            Ok(view) => Some(view),
            Err(e) => {
                println!("⚠ {e}");
                None
            }
        }
    }
}
