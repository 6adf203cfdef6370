//! Persistence tests against a temporary SQLite database.

use episodic::db::{OverrideStore, StateBackend, Store};
use episodic::domain::{EpisodeRef, SeriesId};

async fn temp_store() -> (Store, String) {
    let db_path =
        std::env::temp_dir().join(format!("episodic-store-test-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite:{}", db_path.display());
    let store = Store::new(&url).await.expect("failed to open store");
    (store, url)
}

fn ep(season: u32, episode: u32) -> EpisodeRef {
    EpisodeRef::new(season, episode).unwrap()
}

#[tokio::test]
async fn state_documents_are_replaced_whole() {
    let (store, _) = temp_store().await;

    assert_eq!(store.read("continueWatching").await.unwrap(), None);

    store.write("continueWatching", "[1]").await.unwrap();
    store.write("continueWatching", "[2,3]").await.unwrap();

    assert_eq!(
        store.read("continueWatching").await.unwrap().as_deref(),
        Some("[2,3]")
    );
}

#[tokio::test]
async fn state_survives_reopen() {
    let (store, url) = temp_store().await;
    store.write("tv_1_status", r#"{"watched":true}"#).await.unwrap();
    drop(store);

    let reopened = Store::new(&url).await.unwrap();
    assert_eq!(
        reopened.read("tv_1_status").await.unwrap().as_deref(),
        Some(r#"{"watched":true}"#)
    );
}

#[tokio::test]
async fn override_documents_upsert_and_remove() {
    let (store, _) = temp_store().await;
    let series = SeriesId::new(100);

    assert!(store.get(series, ep(1, 21)).await.unwrap().is_none());

    store
        .set_override(series, ep(1, 21), &["https://a".to_string()])
        .await
        .unwrap();
    store
        .set_override(
            series,
            ep(1, 21),
            &["https://b".to_string(), "https://c".to_string()],
        )
        .await
        .unwrap();

    let doc = store.get(series, ep(1, 21)).await.unwrap().unwrap();
    assert_eq!(doc.links, vec!["https://b", "https://c"]);
    assert_eq!(store.scan().await.unwrap().len(), 1);

    assert!(store.remove_override(series, ep(1, 21)).await.unwrap());
    assert!(!store.remove_override(series, ep(1, 21)).await.unwrap());
    assert!(store.get(series, ep(1, 21)).await.unwrap().is_none());
}

#[tokio::test]
async fn scan_covers_every_series_in_order() {
    let (store, _) = temp_store().await;

    store.set_override(SeriesId::new(2), ep(1, 1), &[]).await.unwrap();
    store.set_override(SeriesId::new(1), ep(3, 2), &[]).await.unwrap();
    store.set_override(SeriesId::new(1), ep(1, 5), &[]).await.unwrap();

    let docs = store.scan().await.unwrap();
    let paths: Vec<_> = docs.iter().map(|d| (d.series, d.episode)).collect();
    assert_eq!(
        paths,
        vec![
            (SeriesId::new(1), ep(1, 5)),
            (SeriesId::new(1), ep(3, 2)),
            (SeriesId::new(2), ep(1, 1)),
        ]
    );
}

#[tokio::test]
async fn metadata_cache_honors_ttl() {
    let (store, _) = temp_store().await;
    let series = SeriesId::new(1399);

    store
        .cache_metadata(series, r#"{"id":1399}"#, chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(
        store.get_cached_metadata(series).await.unwrap().as_deref(),
        Some(r#"{"id":1399}"#)
    );

    store
        .cache_metadata(series, r#"{"id":1399}"#, chrono::Duration::seconds(-1))
        .await
        .unwrap();
    assert_eq!(store.get_cached_metadata(series).await.unwrap(), None);
}

#[tokio::test]
async fn in_memory_database_is_usable() {
    let store = Store::new("sqlite::memory:").await.unwrap();
    store.ping().await.unwrap();
    store.write("k", "v").await.unwrap();
    assert_eq!(store.read("k").await.unwrap().as_deref(), Some("v"));
}
