//! `KeyWatcher` propagation with and without change notifications.

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use snaptrack_core::{KeyWatcher, PersistenceStore, WatchMode};
use snaptrack_domain::constants::{KEY_USER, KEY_IS_RUNNING};
use snaptrack_domain::{AuthUser, StoreValues};
use support::store::MemoryStore;

async fn wait_for(
    receiver: &mut tokio::sync::watch::Receiver<Option<AuthUser>>,
    expected: Option<AuthUser>,
) {
    tokio::time::timeout(Duration::from_secs(2), receiver.wait_for(|value| *value == expected))
        .await
        .expect("watcher did not publish in time")
        .unwrap();
}

#[tokio::test]
async fn subscription_publishes_sign_in_and_sign_out() {
    let store = Arc::new(MemoryStore::new());
    let watcher: KeyWatcher<AuthUser> =
        KeyWatcher::spawn(store.clone(), KEY_USER, Duration::from_secs(60)).await.unwrap();
    assert_eq!(watcher.mode(), WatchMode::Subscription);
    assert_eq!(watcher.current(), None);
    let mut receiver = watcher.receiver();

    store.set(StoreValues::new().with(KEY_USER, &json!({ "id": "user-1" })).unwrap()).await.unwrap();
    wait_for(&mut receiver, Some(AuthUser::new("user-1"))).await;

    store.set(StoreValues::new().with(KEY_USER, &json!(null)).unwrap()).await.unwrap();
    wait_for(&mut receiver, None).await;

    watcher.shutdown().await;
}

#[tokio::test]
async fn other_keys_do_not_wake_receivers() {
    let store = Arc::new(MemoryStore::new());
    store.seed(KEY_USER, json!({ "id": "user-1" }));
    let watcher: KeyWatcher<AuthUser> =
        KeyWatcher::spawn(store.clone(), KEY_USER, Duration::from_secs(60)).await.unwrap();
    let mut receiver = watcher.receiver();

    store.set(StoreValues::new().with(KEY_IS_RUNNING, &true).unwrap()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!receiver.has_changed().unwrap());
    assert_eq!(watcher.current(), Some(AuthUser::new("user-1")));
}

#[tokio::test]
async fn falls_back_to_polling_without_notifications() {
    let store = Arc::new(MemoryStore::without_notifications());
    let watcher: KeyWatcher<AuthUser> =
        KeyWatcher::spawn(store.clone(), KEY_USER, Duration::from_millis(20)).await.unwrap();
    assert_eq!(watcher.mode(), WatchMode::Polling(Duration::from_millis(20)));
    let mut receiver = watcher.receiver();

    store.seed(KEY_USER, json!({ "id": "user-2", "email": "b@example.com" }));

    let expected = AuthUser { id: "user-2".into(), email: Some("b@example.com".into()) };
    wait_for(&mut receiver, Some(expected)).await;
    watcher.shutdown().await;
}

#[tokio::test]
async fn malformed_value_reads_as_signed_out() {
    let store = Arc::new(MemoryStore::new());
    store.seed(KEY_USER, json!({ "email": "missing-id@example.com" }));

    let watcher: KeyWatcher<AuthUser> =
        KeyWatcher::spawn(store, KEY_USER, Duration::from_secs(60)).await.unwrap();

    assert_eq!(watcher.current(), None);
}
