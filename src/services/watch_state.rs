//! Persisted viewing state: per-series flags, global flag indices and the
//! bounded continue-watching list.
//!
//! Every logical document is read-modify-written under its own lock, so
//! concurrent toggles on one document serialize and never lose updates.
//! Writes go straight through to the backend. When a write fails the
//! in-memory copy is kept and used for later reads, and the caller gets a
//! non-fatal [`WatchStateError::Persist`].
//!
//! The global lists are shared with other writers, so they are edited as raw
//! JSON arrays: elements this crate does not understand keep their place and
//! content, and only typed reads skip them.
//!
//! One lock slot is kept per document key touched and none are evicted. The
//! key space is bounded by the series a user interacts with, plus five
//! global lists.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::watch::{CONTINUE_WATCHING_CAPACITY, CONTINUE_WATCHING_KEY};
use crate::db::{StateBackend, StoreError};
use crate::domain::{EpisodeRef, SeriesId};
use crate::models::watch::{
    ContinueWatchingEntry, EpisodeFlag, IndexEntry, IndexKind, SeriesFlag, SeriesSummary,
    WatchStatus,
};

#[derive(Debug, Error)]
pub enum WatchStateError {
    #[error("Failed to persist '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl WatchStateError {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Persist { key, .. } => key,
        }
    }
}

type Slot = Arc<Mutex<Option<Value>>>;

#[must_use]
pub fn status_key(series: SeriesId) -> String {
    format!("tv_{series}_status")
}

pub struct WatchStateStore {
    backend: Arc<dyn StateBackend>,
    capacity: usize,
    documents: Mutex<HashMap<String, Slot>>,
}

impl WatchStateStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self::with_capacity(backend, CONTINUE_WATCHING_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(backend: Arc<dyn StateBackend>, capacity: usize) -> Self {
        Self {
            backend,
            capacity,
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Stored status of `series`, or the empty default. Never fails.
    pub async fn load(&self, series: SeriesId) -> WatchStatus {
        self.read(&status_key(series)).await
    }

    pub async fn set_series_flag(
        &self,
        summary: &SeriesSummary,
        flag: SeriesFlag,
        value: bool,
    ) -> Result<WatchStatus, WatchStateError> {
        debug!(series = %summary.id, %flag, value, "Setting series flag");

        let status = self
            .update(&status_key(summary.id), |status: &mut WatchStatus| {
                status.set_series_flag(flag, value);
                status.clone()
            })
            .await;

        let index = self.update_index(&flag.index_key(), summary, None, value).await;

        let status = status?;
        index?;
        Ok(status)
    }

    /// Index entries are identified by series and episode together, so one
    /// episode's toggle never touches another episode's entry.
    pub async fn set_episode_flag(
        &self,
        summary: &SeriesSummary,
        episode: EpisodeRef,
        flag: EpisodeFlag,
        value: bool,
    ) -> Result<WatchStatus, WatchStateError> {
        debug!(series = %summary.id, %episode, %flag, value, "Setting episode flag");

        let status = self
            .update(&status_key(summary.id), |status: &mut WatchStatus| {
                status.set_episode_flag(flag, episode, value);
                status.clone()
            })
            .await;

        let index = self
            .update_index(&flag.index_key(), summary, Some(episode), value)
            .await;

        let status = status?;
        index?;
        Ok(status)
    }

    /// Moves the series to the front of the list, dropping its previous entry
    /// and anything past capacity.
    pub async fn record_continue_watching(
        &self,
        entry: ContinueWatchingEntry,
    ) -> Result<(), WatchStateError> {
        let capacity = self.capacity;
        let id = entry.id;
        let entry = to_document(CONTINUE_WATCHING_KEY, &entry)?;

        self.update(CONTINUE_WATCHING_KEY, |list: &mut Vec<Value>| {
            list.retain(|existing| !ContinueWatchingEntry::is_for(existing, id));
            list.insert(0, entry);
            list.truncate(capacity);
        })
        .await
    }

    pub async fn record_progress(
        &self,
        summary: &SeriesSummary,
        episode: EpisodeRef,
        progress: f32,
    ) -> Result<(), WatchStateError> {
        let entry = ContinueWatchingEntry::new(summary, episode, Utc::now())
            .with_progress(progress.clamp(0.0, 100.0));
        self.record_continue_watching(entry).await
    }

    /// Series episodes in the continue-watching list, most recent first.
    pub async fn continue_watching(&self) -> Vec<ContinueWatchingEntry> {
        let list: Vec<Value> = self.read(CONTINUE_WATCHING_KEY).await;
        list.iter().filter_map(ContinueWatchingEntry::from_value).collect()
    }

    pub async fn index(&self, kind: IndexKind) -> Vec<IndexEntry> {
        let entries: Vec<Value> = self.read(&kind.key()).await;
        entries.iter().filter_map(IndexEntry::from_value).collect()
    }

    async fn update_index(
        &self,
        key: &str,
        summary: &SeriesSummary,
        episode: Option<EpisodeRef>,
        value: bool,
    ) -> Result<(), WatchStateError> {
        let entry = if value {
            Some(to_document(key, &IndexEntry::new(summary, episode, Utc::now()))?)
        } else {
            None
        };

        self.update(key, |entries: &mut Vec<Value>| {
            entries.retain(|existing| !IndexEntry::matches(existing, summary.id, episode));
            if let Some(entry) = entry {
                entries.insert(0, entry);
            }
        })
        .await
    }

    async fn slot(&self, key: &str) -> Slot {
        let mut documents = self.documents.lock().await;
        documents.entry(key.to_string()).or_default().clone()
    }

    async fn read<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let slot = self.slot(key).await;
        let cached = slot.lock().await;
        self.current(key, cached.as_ref()).await
    }

    /// The in-memory copy when one exists, else the persisted document.
    /// Unreadable or malformed documents count as absent.
    async fn current<T>(&self, key: &str, cached: Option<&Value>) -> T
    where
        T: DeserializeOwned + Default,
    {
        if let Some(value) = cached {
            return serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!(key, error = %e, "Cached document has unexpected shape");
                T::default()
            });
        }

        match self.backend.read(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "Discarding malformed persisted document");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted document");
                T::default()
            }
        }
    }

    async fn update<T, R, F>(&self, key: &str, mutate: F) -> Result<R, WatchStateError>
    where
        T: Serialize + DeserializeOwned + Default + Send,
        R: Send,
        F: FnOnce(&mut T) -> R + Send,
    {
        let slot = self.slot(key).await;
        let mut cached = slot.lock().await;

        let mut document: T = self.current(key, cached.as_ref()).await;
        let output = mutate(&mut document);

        let value = to_document(key, &document)?;
        let raw = value.to_string();
        *cached = Some(value);

        if let Err(source) = self.backend.write(key, &raw).await {
            warn!(key, error = %source, "Failed to persist document, keeping in-memory copy");
            return Err(WatchStateError::Persist {
                key: key.to_string(),
                source,
            });
        }

        Ok(output)
    }
}

fn to_document<T: Serialize>(key: &str, document: &T) -> Result<Value, WatchStateError> {
    serde_json::to_value(document).map_err(|e| WatchStateError::Persist {
        key: key.to_string(),
        source: StoreError::Serialization(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct MemoryBackend {
        values: std::sync::Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
    }

    impl MemoryBackend {
        fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn json(&self, key: &str) -> serde_json::Value {
            serde_json::from_str(&self.raw(key).unwrap()).unwrap()
        }

        fn insert(&self, key: &str, value: &str) {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    #[async_trait]
    impl StateBackend for MemoryBackend {
        async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.raw(key))
        }

        async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Database("disk full".into()));
            }
            self.insert(key, value);
            Ok(())
        }
    }

    fn setup() -> (Arc<MemoryBackend>, WatchStateStore) {
        let backend = Arc::new(MemoryBackend::default());
        let store = WatchStateStore::new(backend.clone());
        (backend, store)
    }

    fn summary(id: u64) -> SeriesSummary {
        SeriesSummary::new(SeriesId::new(id), format!("Show {id}"), format!("/{id}.jpg"))
    }

    fn ep(season: u32, episode: u32) -> EpisodeRef {
        EpisodeRef::new(season, episode).unwrap()
    }

    #[tokio::test]
    async fn load_defaults_when_missing_or_corrupt() {
        let (backend, store) = setup();
        assert_eq!(store.load(SeriesId::new(1)).await, WatchStatus::default());

        backend.insert("tv_2_status", "{not json");
        assert_eq!(store.load(SeriesId::new(2)).await, WatchStatus::default());
    }

    #[tokio::test]
    async fn series_flag_persists_status_and_index() {
        let (backend, store) = setup();

        let status = store
            .set_series_flag(&summary(5), SeriesFlag::Favorite, true)
            .await
            .unwrap();
        assert!(status.favorite);
        assert_eq!(backend.json("tv_5_status")["favorite"], true);

        let index = store.index(IndexKind::Series(SeriesFlag::Favorite)).await;
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].title, "Show 5");

        store
            .set_series_flag(&summary(5), SeriesFlag::Favorite, true)
            .await
            .unwrap();
        assert_eq!(backend.json("favorite_tv").as_array().unwrap().len(), 1);

        store
            .set_series_flag(&summary(5), SeriesFlag::Favorite, false)
            .await
            .unwrap();
        assert_eq!(backend.json("favorite_tv"), serde_json::json!([]));
        assert!(!store.load(SeriesId::new(5)).await.favorite);
    }

    #[tokio::test]
    async fn episode_toggle_round_trip_restores_index() {
        let (backend, store) = setup();
        let flag = EpisodeFlag::Watched;

        store
            .set_episode_flag(&summary(1), ep(1, 1), flag, true)
            .await
            .unwrap();
        let before = backend.raw(&flag.index_key()).unwrap();

        store
            .set_episode_flag(&summary(1), ep(1, 2), flag, true)
            .await
            .unwrap();
        store
            .set_episode_flag(&summary(1), ep(1, 2), flag, false)
            .await
            .unwrap();

        assert_eq!(backend.raw(&flag.index_key()).unwrap(), before);

        let status = store.load(SeriesId::new(1)).await;
        assert!(status.episode_flag(flag, ep(1, 1)));
        assert!(!status.episode_flag(flag, ep(1, 2)));
    }

    #[tokio::test]
    async fn continue_watching_is_bounded_and_deduplicated() {
        let (_backend, store) = setup();

        for id in 1..=21 {
            let entry = ContinueWatchingEntry::new(&summary(id), ep(1, 1), Utc::now());
            store.record_continue_watching(entry).await.unwrap();
        }

        let list = store.continue_watching().await;
        assert_eq!(list.len(), 20);
        let ids: Vec<u64> = list.iter().map(|e| e.id.value()).collect();
        assert_eq!(ids, (2..=21).rev().collect::<Vec<_>>());

        store.record_progress(&summary(10), ep(2, 3), 42.0).await.unwrap();

        let list = store.continue_watching().await;
        assert_eq!(list.len(), 20);
        assert_eq!(list[0].id, SeriesId::new(10));
        assert_eq!(list[0].current_episode, ep(2, 3));
        assert_eq!(list[0].progress, Some(42.0));
        assert_eq!(list.iter().filter(|e| e.id == SeriesId::new(10)).count(), 1);
    }

    #[tokio::test]
    async fn write_failure_is_reported_and_memory_kept() {
        let (backend, store) = setup();
        backend.fail_writes.store(true, Ordering::SeqCst);

        let err = store
            .set_series_flag(&summary(3), SeriesFlag::Watchlist, true)
            .await
            .unwrap_err();
        assert_eq!(err.key(), "tv_3_status");
        assert!(backend.raw("tv_3_status").is_none());

        // Later reads see the in-memory copy.
        assert!(store.load(SeriesId::new(3)).await.watchlist);
        assert_eq!(store.index(IndexKind::Series(SeriesFlag::Watchlist)).await.len(), 1);

        backend.fail_writes.store(false, Ordering::SeqCst);
        store
            .set_series_flag(&summary(3), SeriesFlag::Watched, true)
            .await
            .unwrap();
        let persisted = backend.json("tv_3_status");
        assert_eq!(persisted["watchlist"], true);
        assert_eq!(persisted["watched"], true);
    }

    fn ids(list: &serde_json::Value) -> Vec<u64> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn true_toggle_moves_entry_to_front() {
        let (backend, store) = setup();

        for id in [1, 2, 1] {
            store
                .set_series_flag(&summary(id), SeriesFlag::Favorite, true)
                .await
                .unwrap();
        }
        assert_eq!(ids(&backend.json("favorite_tv")), vec![1, 2]);

        let flag = EpisodeFlag::Watched;
        for episode in [1, 2, 1] {
            store
                .set_episode_flag(&summary(1), ep(1, episode), flag, true)
                .await
                .unwrap();
        }
        let episodes: Vec<_> = store
            .index(IndexKind::Episode(flag))
            .await
            .iter()
            .map(|entry| entry.episode_info)
            .collect();
        assert_eq!(episodes, vec![Some(ep(1, 1)), Some(ep(1, 2))]);
    }

    #[tokio::test]
    async fn continue_watching_keeps_entries_of_other_shapes() {
        let (backend, store) = setup();
        let seeded = serde_json::json!([
            {
                "id": 1,
                "title": "Show 1",
                "poster_path": "/1.jpg",
                "media_type": "tv",
                "lastWatched": {"season": 2, "episode": 5},
                "lastWatchedDate": "2024-01-01T00:00:00.000Z"
            },
            {
                "id": 2,
                "title": "Film",
                "poster_path": null,
                "media_type": "movie",
                "lastWatched": "2024-01-02T00:00:00.000Z",
                "progress": 35
            },
            {
                "id": 3,
                "name": "Show 3",
                "poster_path": "/3.jpg",
                "media_type": "tv",
                "progress": 0,
                "lastWatched": "2024-01-03T00:00:00.000Z",
                "currentEpisode": {"season": 1, "episode": 2}
            }
        ]);
        backend.insert(CONTINUE_WATCHING_KEY, &seeded.to_string());

        let entry = ContinueWatchingEntry::new(&summary(9), ep(1, 1), Utc::now());
        store.record_continue_watching(entry).await.unwrap();

        let persisted = backend.json(CONTINUE_WATCHING_KEY);
        assert_eq!(ids(&persisted), vec![9, 1, 2, 3]);
        assert_eq!(persisted.as_array().unwrap()[1..], seeded.as_array().unwrap()[..]);

        let list = store.continue_watching().await;
        let listed: Vec<u64> = list.iter().map(|e| e.id.value()).collect();
        assert_eq!(listed, vec![9, 1, 3]);
        assert_eq!(list[1].current_episode, ep(2, 5));
        assert_eq!(list[2].title, "Show 3");

        store.record_progress(&summary(3), ep(1, 3), 10.0).await.unwrap();
        assert_eq!(ids(&backend.json(CONTINUE_WATCHING_KEY)), vec![3, 9, 1, 2]);
    }

    #[tokio::test]
    async fn episode_toggle_keeps_unreadable_index_entries_and_status_fields() {
        let (backend, store) = setup();
        let flag = EpisodeFlag::Watched;
        let seeded = serde_json::json!([
            {
                "id": 4,
                "type": "tv",
                "title": "Show 4",
                "poster_path": "/4.jpg",
                "addedAt": "2024-01-01T00:00:00.000Z",
                "episodeInfo": {"season": 1, "episode": 3}
            },
            {
                "id": 4,
                "type": "tv",
                "title": "Show 4",
                "poster_path": "/4.jpg",
                "addedAt": "2024-01-02T00:00:00.000Z",
                "episodeInfo": {"season": null, "episode": null}
            }
        ]);
        backend.insert(&flag.index_key(), &seeded.to_string());
        backend.insert(
            "tv_9_status",
            r#"{"watchlist":true,"favorite":true,"watched":false,"episodeWatchlist":{},"episodeWatched":{"snulle4":true,"s1e3":true},"lastSeen":"x"}"#,
        );

        store
            .set_episode_flag(&summary(9), ep(1, 1), flag, true)
            .await
            .unwrap();

        let persisted = backend.json(&flag.index_key());
        assert_eq!(ids(&persisted), vec![9, 4, 4]);
        assert_eq!(persisted.as_array().unwrap()[1..], seeded.as_array().unwrap()[..]);
        assert_eq!(store.index(IndexKind::Episode(flag)).await.len(), 3);

        let status = store.load(SeriesId::new(9)).await;
        assert!(status.watchlist);
        assert!(status.favorite);
        assert!(status.episode_flag(flag, ep(1, 3)));
        assert!(status.episode_flag(flag, ep(1, 1)));
        assert_eq!(backend.json("tv_9_status")["lastSeen"], "x");

        store
            .set_episode_flag(&summary(4), ep(1, 3), flag, false)
            .await
            .unwrap();
        let persisted = backend.json(&flag.index_key());
        assert_eq!(ids(&persisted), vec![9, 4]);
        assert_eq!(persisted[1]["episodeInfo"]["season"], serde_json::Value::Null);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_do_not_lose_updates() {
        let (backend, store) = setup();
        let store = Arc::new(store);

        let handles: Vec<_> = (1..=30)
            .map(|episode| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .set_episode_flag(&summary(9), ep(1, episode), EpisodeFlag::Watchlist, true)
                        .await
                })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        let status: WatchStatus = serde_json::from_str(&backend.raw("tv_9_status").unwrap()).unwrap();
        assert_eq!(status.episode_watchlist.len(), 30);
        assert_eq!(
            store
                .index(IndexKind::Episode(EpisodeFlag::Watchlist))
                .await
                .len(),
            30
        );
    }
}
