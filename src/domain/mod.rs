//! Domain types for series and episode identity.
//!
//! Every season/episode pair flowing through the crate is an [`EpisodeRef`];
//! string keys used in persisted documents are derived from it through
//! [`EpisodeKey`] and never built by hand.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when constructing domain identifiers from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid series id: {0:?}")]
    InvalidSeriesId(String),

    #[error("Season must be >= 1, got {0}")]
    InvalidSeason(u32),

    #[error("Episode must be >= 1, got {0}")]
    InvalidEpisode(u32),

    #[error("Invalid episode key: {0:?}")]
    InvalidEpisodeKey(String),
}

/// Identifier of a series in the metadata provider.
///
/// Persisted as a JSON number so index entries stay compatible with
/// documents written by other clients.
///
/// # Examples
///
/// ```rust
/// use episodic::domain::SeriesId;
///
/// let id: SeriesId = "100".parse().unwrap();
/// assert_eq!(id.value(), 100);
/// assert_eq!(id.to_string(), "100");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(u64);

impl SeriesId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for SeriesId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for SeriesId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| DomainError::InvalidSeriesId(s.to_string()))
    }
}

/// A (season, episode) pair, both 1-based.
///
/// Ordering is season first, then episode, which is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEpisodeRef")]
pub struct EpisodeRef {
    season: u32,
    episode: u32,
}

#[derive(Deserialize)]
struct RawEpisodeRef {
    season: u32,
    episode: u32,
}

impl TryFrom<RawEpisodeRef> for EpisodeRef {
    type Error = DomainError;

    fn try_from(raw: RawEpisodeRef) -> Result<Self, Self::Error> {
        Self::new(raw.season, raw.episode)
    }
}

impl EpisodeRef {
    pub const fn new(season: u32, episode: u32) -> Result<Self, DomainError> {
        if season == 0 {
            return Err(DomainError::InvalidSeason(season));
        }
        if episode == 0 {
            return Err(DomainError::InvalidEpisode(episode));
        }
        Ok(Self { season, episode })
    }

    #[must_use]
    pub const fn season(&self) -> u32 {
        self.season
    }

    #[must_use]
    pub const fn episode(&self) -> u32 {
        self.episode
    }

    #[must_use]
    pub const fn key(&self) -> EpisodeKey {
        EpisodeKey(*self)
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// Canonical string key of an episode, `s{season}e{episode}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeKey(EpisodeRef);

impl EpisodeKey {
    #[must_use]
    pub const fn episode_ref(&self) -> EpisodeRef {
        self.0
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}e{}", self.0.season, self.0.episode)
    }
}

impl FromStr for EpisodeKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidEpisodeKey(s.to_string());

        let rest = s.strip_prefix('s').ok_or_else(invalid)?;
        let (season, episode) = rest.split_once('e').ok_or_else(invalid)?;
        let season = season.parse::<u32>().map_err(|_| invalid())?;
        let episode = episode.parse::<u32>().map_err(|_| invalid())?;

        EpisodeRef::new(season, episode)
            .map(|episode| episode.key())
            .map_err(|_| invalid())
    }
}

impl Serialize for EpisodeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EpisodeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a playback request: which episode of which series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackKey {
    pub series: SeriesId,
    pub episode: EpisodeRef,
}

impl PlaybackKey {
    #[must_use]
    pub const fn new(series: SeriesId, episode: EpisodeRef) -> Self {
        Self { series, episode }
    }
}

impl fmt::Display for PlaybackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.series, self.episode)
    }
}
