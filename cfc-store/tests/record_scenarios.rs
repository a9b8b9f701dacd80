//! End-to-end record scenarios against the in-memory backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cfc_store::backend::{Connector, DatabaseBackend};
use cfc_store::id::{external_to_internal, internal_to_external};
use cfc_store::{ConnectionRegistry, Document, ErrorKind, MemoryConnector, RecordStore};
use serde_json::{json, Value};

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[tokio::test]
async fn resource_lifecycle() {
    let registry = Arc::new(ConnectionRegistry::in_memory());
    let store = RecordStore::new(registry, "cfc_db");

    // Create
    let created = store
        .create("resources", object(json!({ "title": "A", "type": "note" })))
        .await
        .expect("create failed");
    let id = created["id"].as_str().expect("id is a string").to_owned();
    assert_eq!(id.len(), 24);
    assert_eq!(created["title"], "A");

    // List with filter
    let notes = store
        .list("resources", Some(&object(json!({ "type": "note" }))))
        .await
        .expect("list failed");
    assert!(notes.iter().any(|d| d["id"] == id.as_str()));

    // Update
    store
        .update("resources", &id, object(json!({ "title": "B" })))
        .await
        .expect("update failed");
    let fetched = store.get_by_id("resources", &id).await.expect("get failed");
    assert_eq!(fetched["title"], "B");
    assert_eq!(fetched["type"], "note");

    // Delete
    assert!(store.delete("resources", &id).await.expect("delete failed"));
    let err = store.get_by_id("resources", &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn explicit_duplicate_id_conflicts() {
    let store = RecordStore::new(Arc::new(ConnectionRegistry::in_memory()), "cfc_db");
    let first = store
        .create("quiz", object(json!({ "category": "rust" })))
        .await
        .unwrap();

    let err = store
        .create("quiz", object(json!({ "id": first["id"].clone(), "category": "go" })))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // The first document is untouched
    let id = first["id"].as_str().unwrap();
    assert_eq!(store.get_by_id("quiz", id).await.unwrap()["category"], "rust");
}

#[tokio::test]
async fn stored_ids_round_trip() {
    let store = RecordStore::new(Arc::new(ConnectionRegistry::in_memory()), "cfc_db");
    for i in 0..10 {
        let created = store
            .create("resources", object(json!({ "n": i })))
            .await
            .unwrap();
        let external = created["id"].as_str().unwrap();
        let internal = external_to_internal(external).unwrap();
        assert_eq!(internal_to_external(&internal), external);
    }
}

#[tokio::test]
async fn collections_are_isolated_per_database() {
    let registry = Arc::new(ConnectionRegistry::in_memory());
    let content = RecordStore::new(registry.clone(), "cfc_db");
    let auth = RecordStore::new(registry, "auth_db");

    content
        .create("users", object(json!({ "username": "not-a-real-user" })))
        .await
        .unwrap();

    assert!(auth.list("users", None).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_requests_share_one_connection() {
    let connector = MemoryConnector::new();
    let registry = Arc::new(ConnectionRegistry::new(connector.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.get_handle("auth_db").await })
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.expect("task panicked").expect("get_handle failed"));
    }

    let first = &handles[0];
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, first)));
    assert_eq!(connector.connection_count(), 1);
}

/// Memory connector that takes a while to connect
struct SlowConnector {
    inner: MemoryConnector,
    delay: Duration,
}

#[async_trait]
impl Connector for SlowConnector {
    async fn connect(&self, database: &str) -> cfc_store::Result<Arc<dyn DatabaseBackend>> {
        tokio::time::sleep(self.delay).await;
        self.inner.connect(database).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_during_connect_leaves_no_live_orphan() {
    let connector = MemoryConnector::new();
    let registry = Arc::new(ConnectionRegistry::new(SlowConnector {
        inner: connector.clone(),
        delay: Duration::from_millis(100),
    }));

    let pending = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.get_handle("auth_db").await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    registry.shutdown("auth_db").await;

    let fresh = registry.get_handle("auth_db").await.expect("reconnect failed");
    let evicted = pending.await.expect("task panicked");

    let err = evicted.expect_err("evicted connect must not hand out a handle");
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    assert!(fresh.is_live());
    assert_eq!(registry.databases(), vec!["auth_db"]);
    assert!(Arc::ptr_eq(&fresh, &registry.get_handle("auth_db").await.unwrap()));

    registry.shutdown_all().await;
    assert!(!fresh.is_live());
    assert!(registry.databases().is_empty());
}

#[tokio::test]
async fn integers_beyond_i64_are_rejected() {
    let store = RecordStore::new(Arc::new(ConnectionRegistry::in_memory()), "cfc_db");

    let err = store
        .create("resources", object(json!({ "title": "A", "views": u64::MAX })))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);

    assert!(store.list("resources", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn null_filter_matches_missing_field() {
    let store = RecordStore::new(Arc::new(ConnectionRegistry::in_memory()), "cfc_db");
    store
        .create("resources", object(json!({ "title": "A" })))
        .await
        .unwrap();
    store
        .create("resources", object(json!({ "title": "B", "category": null })))
        .await
        .unwrap();
    store
        .create("resources", object(json!({ "title": "C", "category": "rust" })))
        .await
        .unwrap();

    let found = store
        .list("resources", Some(&object(json!({ "category": null }))))
        .await
        .unwrap();
    let titles: Vec<_> = found.iter().map(|d| d["title"].clone()).collect();
    assert_eq!(titles, vec![json!("A"), json!("B")]);
}
