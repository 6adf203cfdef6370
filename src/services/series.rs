//! Loading a series view: metadata, episode catalog and recommendations.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::limits::MAX_RECOMMENDATIONS;
use crate::db::OverrideStore;
use crate::domain::{EpisodeRef, SeriesId};
use crate::models::catalog::EpisodeCatalog;
use crate::models::series::{GroupedCrewMember, Recommendation, SeriesDetails, group_crew};
use crate::models::watch::SeriesSummary;
use crate::services::catalog::EpisodeCatalogBuilder;
use crate::services::metadata::MetadataProvider;

/// The only failures surfaced to the viewer: without core metadata there is
/// nothing to show.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Series {0} not found")]
    NotFound(SeriesId),

    #[error("Metadata for series {series} is unavailable: {message}")]
    MetadataUnavailable { series: SeriesId, message: String },
}

#[derive(Debug, Clone)]
pub struct SeriesView {
    pub details: SeriesDetails,
    pub catalog: EpisodeCatalog,
}

impl SeriesView {
    #[must_use]
    pub fn summary(&self) -> SeriesSummary {
        SeriesSummary::new(self.details.id, &self.details.name, self.details.poster())
    }

    #[must_use]
    pub fn crew(&self) -> Vec<GroupedCrewMember> {
        group_crew(&self.details.credits.crew)
    }

    /// A caller-requested episode is honored only when both numbers are given.
    #[must_use]
    pub fn requested_episode(season: Option<u32>, episode: Option<u32>) -> Option<EpisodeRef> {
        EpisodeRef::new(season?, episode?).ok()
    }
}

pub struct SeriesViewService {
    metadata: Arc<dyn MetadataProvider>,
    overrides: Arc<dyn OverrideStore>,
    builder: EpisodeCatalogBuilder,
}

impl SeriesViewService {
    #[must_use]
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        overrides: Arc<dyn OverrideStore>,
        builder: EpisodeCatalogBuilder,
    ) -> Self {
        Self {
            metadata,
            overrides,
            builder,
        }
    }

    /// Metadata and the override scan run concurrently; the catalog is built
    /// once both are done. A failed scan only loses the override entries.
    pub async fn load(&self, series: SeriesId) -> Result<SeriesView, SeriesError> {
        let (details, overrides) =
            tokio::join!(self.metadata.series(series), self.overrides.scan());

        let details = match details {
            Ok(Some(details)) => details,
            Ok(None) => return Err(SeriesError::NotFound(series)),
            Err(e) => {
                warn!(%series, error = %e, "Failed to load series metadata");
                return Err(SeriesError::MetadataUnavailable {
                    series,
                    message: e.to_string(),
                });
            }
        };

        let overrides = overrides.unwrap_or_else(|e| {
            warn!(%series, error = %e, "Override scan failed, catalog uses generated range only");
            Vec::new()
        });

        let catalog = self
            .builder
            .build(series, details.number_of_seasons, &overrides);

        info!(%series, name = %details.name, episodes = catalog.len(), "Series loaded");

        Ok(SeriesView { details, catalog })
    }

    /// At most 20 entries, all reported available. Failures yield an empty list.
    pub async fn recommendations(&self, series: SeriesId) -> Vec<Recommendation> {
        match self.metadata.recommendations(series).await {
            Ok(recommendations) => recommendations
                .into_iter()
                .take(MAX_RECOMMENDATIONS)
                .map(|mut r| {
                    r.available = true;
                    r
                })
                .collect(),
            Err(e) => {
                warn!(%series, error = %e, "Failed to load recommendations");
                Vec::new()
            }
        }
    }
}
