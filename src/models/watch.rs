use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::watch::MEDIA_TYPE_TV;
use crate::domain::{EpisodeKey, EpisodeRef, SeriesId};

/// Per-series viewing flags, stored under `tv_{id}_status`.
///
/// Fields are read one by one: a flag of the wrong type reads as `false`, an
/// episode entry whose key is not `s{S}e{E}` is skipped, and unknown fields
/// are carried through rewrites untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub watchlist: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub favorite: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub watched: bool,
    #[serde(default, deserialize_with = "episode_flags")]
    pub episode_watchlist: BTreeMap<EpisodeKey, bool>,
    #[serde(default, deserialize_with = "episode_flags")]
    pub episode_watched: BTreeMap<EpisodeKey, bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchStatus {
    #[must_use]
    pub const fn series_flag(&self, flag: SeriesFlag) -> bool {
        match flag {
            SeriesFlag::Watchlist => self.watchlist,
            SeriesFlag::Favorite => self.favorite,
            SeriesFlag::Watched => self.watched,
        }
    }

    pub const fn set_series_flag(&mut self, flag: SeriesFlag, value: bool) {
        match flag {
            SeriesFlag::Watchlist => self.watchlist = value,
            SeriesFlag::Favorite => self.favorite = value,
            SeriesFlag::Watched => self.watched = value,
        }
    }

    #[must_use]
    pub fn episode_flag(&self, flag: EpisodeFlag, episode: EpisodeRef) -> bool {
        self.episode_map(flag)
            .get(&episode.key())
            .copied()
            .unwrap_or(false)
    }

    pub fn set_episode_flag(&mut self, flag: EpisodeFlag, episode: EpisodeRef, value: bool) {
        let map = match flag {
            EpisodeFlag::Watchlist => &mut self.episode_watchlist,
            EpisodeFlag::Watched => &mut self.episode_watched,
        };
        map.insert(episode.key(), value);
    }

    const fn episode_map(&self, flag: EpisodeFlag) -> &BTreeMap<EpisodeKey, bool> {
        match flag {
            EpisodeFlag::Watchlist => &self.episode_watchlist,
            EpisodeFlag::Watched => &self.episode_watched,
        }
    }
}

/// Series-level flags. Each owns a global index document `{flag}_tv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesFlag {
    Watchlist,
    Favorite,
    Watched,
}

impl SeriesFlag {
    pub const ALL: [Self; 3] = [Self::Watchlist, Self::Favorite, Self::Watched];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watchlist => "watchlist",
            Self::Favorite => "favorite",
            Self::Watched => "watched",
        }
    }

    #[must_use]
    pub fn index_key(self) -> String {
        format!("{}_tv", self.as_str())
    }
}

impl fmt::Display for SeriesFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watchlist" => Ok(Self::Watchlist),
            "favorite" | "favourite" => Ok(Self::Favorite),
            "watched" => Ok(Self::Watched),
            other => Err(format!("unknown series flag '{other}'")),
        }
    }
}

/// Episode-level flags. Each owns a global index document `{flag}_tv_episodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeFlag {
    Watchlist,
    Watched,
}

impl EpisodeFlag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watchlist => "episodeWatchlist",
            Self::Watched => "episodeWatched",
        }
    }

    #[must_use]
    pub fn index_key(self) -> String {
        format!("{}_tv_episodes", self.as_str())
    }
}

impl fmt::Display for EpisodeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchlist" | "episodeWatchlist" => Ok(Self::Watchlist),
            "watched" | "episodeWatched" => Ok(Self::Watched),
            other => Err(format!("unknown episode flag '{other}'")),
        }
    }
}

/// Either kind of global index, for enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Series(SeriesFlag),
    Episode(EpisodeFlag),
}

impl IndexKind {
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::Series(flag) => flag.index_key(),
            Self::Episode(flag) => flag.index_key(),
        }
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episodeWatchlist" | "episode-watchlist" => Ok(Self::Episode(EpisodeFlag::Watchlist)),
            "episodeWatched" | "episode-watched" => Ok(Self::Episode(EpisodeFlag::Watched)),
            other => other.parse().map(Self::Series),
        }
    }
}

/// Display fields copied into index and continue-watching entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub id: SeriesId,
    pub title: String,
    pub poster_path: String,
}

impl SeriesSummary {
    #[must_use]
    pub fn new(id: SeriesId, title: impl Into<String>, poster_path: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: poster_path.into(),
        }
    }
}

/// Entry of a global `{flag}_tv` / `{flag}_tv_episodes` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: SeriesId,
    #[serde(rename = "type", default = "default_media_type")]
    pub media_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(rename = "poster_path", default, deserialize_with = "lenient")]
    pub poster_path: String,
    pub added_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub episode_info: Option<EpisodeRef>,
}

impl IndexEntry {
    #[must_use]
    pub fn new(summary: &SeriesSummary, episode: Option<EpisodeRef>, added_at: DateTime<Utc>) -> Self {
        Self {
            id: summary.id,
            media_type: MEDIA_TYPE_TV.to_string(),
            title: summary.title.clone(),
            poster_path: summary.poster_path.clone(),
            added_at,
            episode_info: episode,
        }
    }

    /// Typed view of a stored element, `None` when it has another shape.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Identity inside an index: the series, plus the episode for episode
    /// indices. Works on the stored element so foreign shapes can be matched
    /// without being parsed.
    #[must_use]
    pub fn matches(value: &Value, id: SeriesId, episode: Option<EpisodeRef>) -> bool {
        if stored_id(value) != Some(id) {
            return false;
        }
        episode.is_none_or(|episode| {
            value
                .get("episodeInfo")
                .and_then(|info| serde_json::from_value::<EpisodeRef>(info.clone()).ok())
                == Some(episode)
        })
    }
}

/// Entry of the bounded, most-recent-first `continueWatching` list.
///
/// The list is shared with other media types and with older entry shapes,
/// so it is only ever edited as raw JSON; this type is the view of the
/// elements that describe a series episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueWatchingEntry {
    pub id: SeriesId,
    #[serde(default, alias = "name", deserialize_with = "lenient")]
    pub title: String,
    #[serde(rename = "poster_path", default, deserialize_with = "lenient")]
    pub poster_path: String,
    #[serde(rename = "media_type", default = "default_media_type")]
    pub media_type: String,
    pub current_episode: EpisodeRef,
    #[serde(rename = "lastWatched")]
    pub last_watched: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
}

impl ContinueWatchingEntry {
    #[must_use]
    pub fn new(summary: &SeriesSummary, current_episode: EpisodeRef, last_watched: DateTime<Utc>) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            poster_path: summary.poster_path.clone(),
            media_type: MEDIA_TYPE_TV.to_string(),
            current_episode,
            last_watched,
            progress: None,
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Typed view of a stored element. Accepts the older shape where
    /// `lastWatched` holds the episode and `lastWatchedDate` the time.
    /// Elements without an episode, such as movies, give `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Ok(entry) = serde_json::from_value::<Self>(value.clone()) {
            return Some(entry);
        }

        let older: EpisodeChangeEntry = serde_json::from_value(value.clone()).ok()?;
        Some(Self {
            id: older.id,
            title: older.title,
            poster_path: older.poster_path,
            media_type: older.media_type,
            current_episode: older.last_watched,
            last_watched: older.last_watched_date,
            progress: None,
        })
    }

    /// Whether a stored element belongs to `id`, whatever its shape.
    #[must_use]
    pub fn is_for(value: &Value, id: SeriesId) -> bool {
        stored_id(value) == Some(id)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeChangeEntry {
    id: SeriesId,
    #[serde(default, alias = "name", deserialize_with = "lenient")]
    title: String,
    #[serde(rename = "poster_path", default, deserialize_with = "lenient")]
    poster_path: String,
    #[serde(rename = "media_type", default = "default_media_type")]
    media_type: String,
    last_watched: EpisodeRef,
    last_watched_date: DateTime<Utc>,
}

fn default_media_type() -> String {
    MEDIA_TYPE_TV.to_string()
}

fn stored_id(value: &Value) -> Option<SeriesId> {
    value.get("id")?.as_u64().map(SeriesId::new)
}

/// Falls back to the default when the stored value has another type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn episode_flags<'de, D>(deserializer: D) -> Result<BTreeMap<EpisodeKey, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, flag)| Some((key.parse().ok()?, flag.as_bool()?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_status_persisted_shape() {
        let mut status = WatchStatus::default();
        status.set_series_flag(SeriesFlag::Favorite, true);
        status.set_episode_flag(EpisodeFlag::Watched, EpisodeRef::new(1, 2).unwrap(), true);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "watchlist": false,
                "favorite": true,
                "watched": false,
                "episodeWatchlist": {},
                "episodeWatched": {"s1e2": true}
            })
        );
    }

    #[test]
    fn index_entry_persisted_shape() {
        let summary = SeriesSummary::new(SeriesId::new(7), "Show", "/p.jpg");
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);

        let series = serde_json::to_value(IndexEntry::new(&summary, None, at)).unwrap();
        assert_eq!(series["id"], 7);
        assert_eq!(series["type"], "tv");
        assert_eq!(series["poster_path"], "/p.jpg");
        assert!(series["addedAt"].is_string());
        assert!(series.get("episodeInfo").is_none());

        let episode = IndexEntry::new(&summary, Some(EpisodeRef::new(2, 3).unwrap()), at);
        let json = serde_json::to_value(episode).unwrap();
        assert_eq!(json["episodeInfo"], serde_json::json!({"season": 2, "episode": 3}));
    }

    #[test]
    fn continue_watching_persisted_shape() {
        let summary = SeriesSummary::new(SeriesId::new(9), "Show", "/p.jpg");
        let entry = ContinueWatchingEntry::new(&summary, EpisodeRef::new(1, 4).unwrap(), Utc::now());
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["media_type"], "tv");
        assert_eq!(json["currentEpisode"], serde_json::json!({"season": 1, "episode": 4}));
        assert!(json["lastWatched"].is_string());
        assert!(json.get("progress").is_none());
    }

    #[test]
    fn watch_status_reads_fields_independently() {
        let status: WatchStatus = serde_json::from_value(serde_json::json!({
            "watchlist": true,
            "favorite": null,
            "episodeWatched": {"snulle2": true, "s2e1": true, "s2e2": "yes"},
            "episodeWatchlist": [],
            "note": {"kept": 1}
        }))
        .unwrap();

        assert!(status.watchlist);
        assert!(!status.favorite);
        assert_eq!(status.episode_watched.len(), 1);
        assert!(status.episode_flag(EpisodeFlag::Watched, EpisodeRef::new(2, 1).unwrap()));
        assert!(status.episode_watchlist.is_empty());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["note"], serde_json::json!({"kept": 1}));
    }

    #[test]
    fn index_identity_on_stored_elements() {
        let id = SeriesId::new(4);
        let episode = EpisodeRef::new(1, 3).unwrap();
        let stored = serde_json::json!({"id": 4, "episodeInfo": {"season": 1, "episode": 3}});
        let unset = serde_json::json!({"id": 4, "episodeInfo": {"season": null, "episode": null}});

        assert!(IndexEntry::matches(&stored, id, Some(episode)));
        assert!(IndexEntry::matches(&stored, id, None));
        assert!(!IndexEntry::matches(&unset, id, Some(episode)));
        assert!(!IndexEntry::matches(&stored, SeriesId::new(5), None));
        assert!(IndexEntry::from_value(&unset).is_none());
    }

    #[test]
    fn flags_parse() {
        assert_eq!("favourite".parse::<SeriesFlag>().unwrap(), SeriesFlag::Favorite);
        assert_eq!(SeriesFlag::Watched.index_key(), "watched_tv");
        assert_eq!(EpisodeFlag::Watchlist.index_key(), "episodeWatchlist_tv_episodes");
        assert_eq!(
            "episode-watched".parse::<IndexKind>().unwrap(),
            IndexKind::Episode(EpisodeFlag::Watched)
        );
        assert!("bogus".parse::<IndexKind>().is_err());
    }
}
