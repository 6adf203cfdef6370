use serde::Serialize;

use crate::domain::EpisodeRef;

/// Selectable episodes of one series, strictly ascending by (season, episode).
///
/// Only the catalog builder creates non-empty catalogs, so the ordering and
/// uniqueness hold for every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EpisodeCatalog {
    episodes: Vec<EpisodeRef>,
}

impl EpisodeCatalog {
    /// Builds a catalog from episodes that are already sorted and unique.
    pub(crate) fn from_sorted(episodes: Vec<EpisodeRef>) -> Self {
        debug_assert!(episodes.windows(2).all(|w| w[0] < w[1]));
        Self { episodes }
    }

    #[must_use]
    pub fn episodes(&self) -> &[EpisodeRef] {
        &self.episodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, episode: EpisodeRef) -> bool {
        self.episodes.binary_search(&episode).is_ok()
    }

    /// Distinct seasons, ascending.
    #[must_use]
    pub fn seasons(&self) -> Vec<u32> {
        let mut seasons: Vec<u32> = self.episodes.iter().map(EpisodeRef::season).collect();
        seasons.dedup();
        seasons
    }

    pub fn episodes_for_season(&self, season: u32) -> impl Iterator<Item = EpisodeRef> + '_ {
        self.episodes
            .iter()
            .copied()
            .filter(move |ep| ep.season() == season)
    }

    /// Episode the selection moves to when the viewer switches season.
    #[must_use]
    pub fn first_episode_of(&self, season: u32) -> Option<EpisodeRef> {
        self.episodes_for_season(season).next()
    }
}
