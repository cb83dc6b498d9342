// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `RecordListStore`.

use std::path::Path;

use chrono::DateTime;
use stow::{CacheStore, DiskTier, ErrorPolicy, StorageTier, StoreError};
use stow_records::{MutationMode, RECORD_ITEMS_KEY, RECORD_ITEMS_NAMESPACE, RecordItem, RecordListStore};
use tokio::sync::oneshot;

/// Bytes that are not a JSON record list.
const GARBAGE: &[u8] = b"{ not a list";

fn item(id: &str) -> RecordItem {
    let created_at = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    RecordItem::new(id, format!("file:///media/{id}.jpg"), format!("Record {id}")).created_at(created_at)
}

fn cache(base: &Path, policy: ErrorPolicy) -> CacheStore {
    CacheStore::builder(RECORD_ITEMS_NAMESPACE)
        .base_dir(base)
        .policy(policy)
        .build()
        .expect("build")
}

fn record_list(base: &Path) -> RecordListStore {
    RecordListStore::new(cache(base, ErrorPolicy::BestEffort))
}

fn ids(items: &[RecordItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

fn corrupt_list(base: &Path) {
    DiskTier::open(base, RECORD_ITEMS_NAMESPACE)
        .expect("open")
        .insert(RECORD_ITEMS_KEY, GARBAGE.into())
        .expect("write garbage");
}

fn stored_bytes(base: &Path) -> Option<Vec<u8>> {
    DiskTier::open(base, RECORD_ITEMS_NAMESPACE)
        .expect("open")
        .get(RECORD_ITEMS_KEY)
        .expect("read")
        .map(|bytes| bytes.to_vec())
}

#[tokio::test]
async fn never_written_list_is_empty() {
    let base = tempfile::tempdir().expect("tempdir");
    assert!(record_list(base.path()).load_all().await.expect("load_all").is_empty());
}

#[tokio::test]
async fn insert_front_places_newest_first() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());

    records.insert_front(item("A")).await.expect("insert");
    records.insert_front(item("B")).await.expect("insert");

    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["B", "A"]);
}

#[tokio::test]
async fn delete_by_id_keeps_the_rest_in_order() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());
    for id in ["3", "2", "1"] {
        records.insert_front(item(id)).await.expect("insert");
    }

    records.delete_by_id(&item("2")).await.expect("delete");

    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["1", "3"]);
}

#[tokio::test]
async fn delete_removes_every_item_with_the_id() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());
    for id in ["x", "y", "x"] {
        records.insert_front(item(id)).await.expect("insert");
    }

    records.delete_id("x").await.expect("delete");
    records.delete_id("absent").await.expect("delete of absent id");

    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["y"]);
}

#[tokio::test]
async fn insert_delete_clear_scenario() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());
    assert_eq!(records.cache().namespace(), "LocalRecordItems");
    assert_eq!(records.key(), "local record items");

    for id in ["1", "2", "3"] {
        records.insert_front(item(id)).await.expect("insert");
    }
    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["3", "2", "1"]);

    records.delete_by_id(&item("2")).await.expect("delete");
    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["3", "1"]);

    records.clear_all().await.expect("clear");
    assert!(records.load_all().await.expect("load_all").is_empty());
    assert_eq!(stored_bytes(base.path()), None);
}

#[tokio::test]
async fn list_survives_a_new_cache_instance() {
    let base = tempfile::tempdir().expect("tempdir");
    let first = record_list(base.path());
    first.insert_front(item("1")).await.expect("insert");
    first.insert_front(item("2").favorited(true)).await.expect("insert");

    let reopened = record_list(base.path());
    let items = reopened.load_all().await.expect("load_all");

    assert_eq!(ids(&items), ["2", "1"]);
    assert!(items[0].flags.favorited);
    assert_eq!(items[1], item("1"));
}

#[tokio::test]
async fn concurrent_unserialized_inserts_lose_an_update() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());
    assert_eq!(records.mode(), MutationMode::Unserialized);

    let (first, second) = tokio::join!(records.insert_front(item("1")), records.insert_front(item("2")));
    first.expect("insert");
    second.expect("insert");

    // Both started from the same empty list; only the last save survives.
    assert_eq!(records.load_all().await.expect("load_all").len(), 1);
    assert_eq!(record_list(base.path()).load_all().await.expect("load_all").len(), 1);
}

#[tokio::test]
async fn concurrent_serialized_inserts_keep_both() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path()).mutation_mode(MutationMode::Serialized);

    let (first, second) = tokio::join!(records.insert_front(item("1")), records.insert_front(item("2")));
    first.expect("insert");
    second.expect("insert");

    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["2", "1"]);
}

#[tokio::test]
async fn serialized_mode_supports_every_operation() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path()).mutation_mode(MutationMode::Serialized);

    for id in ["1", "2", "3"] {
        records.insert_front(item(id)).await.expect("insert");
    }
    records.delete_by_id(&item("2")).await.expect("delete");
    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["3", "1"]);

    records.clear_all().await.expect("clear");
    assert!(records.load_all().await.expect("load_all").is_empty());
}

#[tokio::test]
async fn best_effort_reads_corrupt_list_as_empty() {
    let base = tempfile::tempdir().expect("tempdir");
    corrupt_list(base.path());
    let records = record_list(base.path());

    assert!(records.load_all().await.expect("best effort").is_empty());

    records.insert_front(item("1")).await.expect("insert");
    assert_eq!(ids(&records.load_all().await.expect("load_all")), ["1"]);
}

#[tokio::test]
async fn strict_mutations_stop_at_a_corrupt_list() {
    let base = tempfile::tempdir().expect("tempdir");
    corrupt_list(base.path());

    for mode in [MutationMode::Unserialized, MutationMode::Serialized] {
        let records = RecordListStore::new(cache(base.path(), ErrorPolicy::Strict)).mutation_mode(mode);

        assert!(matches!(records.load_all().await, Err(StoreError::Decode { .. })));
        assert!(matches!(records.insert_front(item("1")).await, Err(StoreError::Decode { .. })));
        assert!(matches!(records.delete_id("1").await, Err(StoreError::Decode { .. })));
        assert_eq!(stored_bytes(base.path()).as_deref(), Some(GARBAGE), "{mode:?}");
    }
}

#[tokio::test]
async fn custom_key_keeps_lists_apart() {
    let base = tempfile::tempdir().expect("tempdir");
    let cache = cache(base.path(), ErrorPolicy::BestEffort);
    let history = RecordListStore::with_key(cache.clone(), "history");
    let favorites = RecordListStore::with_key(cache, "favorites");

    history.insert_front(item("1")).await.expect("insert");
    favorites.insert_front(item("2")).await.expect("insert");

    assert_eq!(ids(&history.load_all().await.expect("load_all")), ["1"]);
    assert_eq!(ids(&favorites.load_all().await.expect("load_all")), ["2"]);
}

#[tokio::test]
async fn callbacks_report_items_and_success() {
    let base = tempfile::tempdir().expect("tempdir");
    let records = record_list(base.path());

    let (tx, rx) = oneshot::channel();
    records.insert_front_then(item("1"), move |ok| tx.send(ok).expect("receiver alive"));
    assert!(rx.await.expect("callback ran"));

    let (tx, rx) = oneshot::channel();
    records.insert_front_then(item("2"), move |ok| tx.send(ok).expect("receiver alive"));
    assert!(rx.await.expect("callback ran"));

    let (tx, rx) = oneshot::channel();
    records.delete_by_id_then(&item("1"), move |ok| tx.send(ok).expect("receiver alive"));
    assert!(rx.await.expect("callback ran"));

    let (tx, rx) = oneshot::channel();
    records.load_all_then(move |items, ok| tx.send((items, ok)).expect("receiver alive"));
    let (items, ok) = rx.await.expect("callback ran");
    assert!(ok);
    assert_eq!(ids(&items), ["2"]);

    let (tx, rx) = oneshot::channel();
    records.clear_all_then(move |ok| tx.send(ok).expect("receiver alive"));
    assert!(rx.await.expect("callback ran"));

    let (tx, rx) = oneshot::channel();
    records.load_all_then(move |items, ok| tx.send((items, ok)).expect("receiver alive"));
    assert_eq!(rx.await.expect("callback ran"), (Vec::new(), true));
}

#[tokio::test]
async fn strict_callbacks_report_failure() {
    let base = tempfile::tempdir().expect("tempdir");
    corrupt_list(base.path());
    let records = RecordListStore::new(cache(base.path(), ErrorPolicy::Strict));

    let (tx, rx) = oneshot::channel();
    records.load_all_then(move |items, ok| tx.send((items, ok)).expect("receiver alive"));
    assert_eq!(rx.await.expect("callback ran"), (Vec::new(), false));

    let (tx, rx) = oneshot::channel();
    records.insert_front_then(item("1"), move |ok| tx.send(ok).expect("receiver alive"));
    assert!(!rx.await.expect("callback ran"));
}
