use std::collections::BTreeSet;
use tracing::debug;

use crate::constants::catalog::EPISODES_PER_SEASON;
use crate::db::OverrideDocument;
use crate::domain::{EpisodeRef, SeriesId};
use crate::models::catalog::EpisodeCatalog;

/// Merges the generated season/episode range with override entries.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeCatalogBuilder {
    episodes_per_season: u32,
}

impl Default for EpisodeCatalogBuilder {
    fn default() -> Self {
        Self::new(EPISODES_PER_SEASON)
    }
}

impl EpisodeCatalogBuilder {
    #[must_use]
    pub const fn new(episodes_per_season: u32) -> Self {
        Self {
            episodes_per_season,
        }
    }

    /// Seasons `1..=number_of_seasons` each get episodes `1..=episodes_per_season`.
    /// Overrides of other series are ignored; overrides outside the generated
    /// range extend the catalog. Missing metadata (`None`) behaves like zero
    /// seasons.
    #[must_use]
    pub fn build(
        &self,
        series: SeriesId,
        number_of_seasons: Option<u32>,
        overrides: &[OverrideDocument],
    ) -> EpisodeCatalog {
        let seasons = number_of_seasons.unwrap_or(0);

        let mut episodes: BTreeSet<EpisodeRef> = (1..=seasons)
            .flat_map(|season| {
                (1..=self.episodes_per_season)
                    .filter_map(move |episode| EpisodeRef::new(season, episode).ok())
            })
            .collect();
        let generated = episodes.len();

        episodes.extend(
            overrides
                .iter()
                .filter(|doc| doc.series == series)
                .map(|doc| doc.episode),
        );

        debug!(
            %series,
            generated,
            extra = episodes.len() - generated,
            "Episode catalog built"
        );

        EpisodeCatalog::from_sorted(episodes.into_iter().collect())
    }
}
