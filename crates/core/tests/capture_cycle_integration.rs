//! Capture cycle ordering, preconditions and failure handling.

mod support;

use std::sync::Arc;

use serde_json::json;
use snaptrack_core::{CaptureDeps, CaptureService};
use snaptrack_domain::constants::{
    KEY_IS_RUNNING, KEY_SCREENSHOT, KEY_SELECTED_TASK, KEY_URL_MAPPINGS, KEY_USER,
};
use snaptrack_domain::{CaptureOutcome, CaptureTrigger, EntityId, SkipReason};
use support::capture::{FakeScreenshots, FixedTab, RecordingSink};
use support::clock::ManualClock;
use support::store::MemoryStore;

struct Harness {
    store: Arc<MemoryStore>,
    screenshots: Arc<FakeScreenshots>,
    sink: Arc<RecordingSink>,
    service: CaptureService,
}

fn harness(tab: FixedTab, screenshots: FakeScreenshots, sink: RecordingSink) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let screenshots = Arc::new(screenshots);
    let sink = Arc::new(sink);
    let service = CaptureService::new(CaptureDeps {
        store: store.clone(),
        tabs: Arc::new(tab),
        screenshots: screenshots.clone(),
        sink: sink.clone(),
        clock: Arc::new(ManualClock::at(1_700_000_000_000)),
    });
    Harness { store, screenshots, sink, service }
}

fn ready(store: &MemoryStore) {
    store.seed(KEY_USER, json!({ "id": "user-1", "email": "dev@example.com" }));
    store.seed(KEY_IS_RUNNING, json!(true));
    store.seed(KEY_SELECTED_TASK, json!({ "task_id": 3, "title": "Manual" }));
}

#[tokio::test]
async fn mapped_domain_overrides_selected_task() {
    let h = harness(FixedTab::url("https://github.com/org/repo/pull/1"), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);
    h.store.seed(
        KEY_URL_MAPPINGS,
        json!([{ "url_mapping_id": 1, "url": "https://github.com", "task_id": 7, "title": "Code review" }]),
    );

    let outcome = h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    let CaptureOutcome::Captured(receipt) = outcome else { panic!("expected a capture") };
    assert_eq!(receipt.task.task_id, Some(EntityId::Numeric(7)));
    assert!(receipt.filename.starts_with("7_1700000000000"));
    assert!(receipt.filename.ends_with(".png"));

    let records = h.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].task_id, Some(EntityId::Numeric(7)));
    assert_eq!(records[0].user_id, "user-1");
    assert_eq!(records[0].website, "https://github.com/org/repo/pull/1");
    assert_eq!(records[0].duration, None);
    assert_eq!(records[0].image_url, receipt.public_url);

    assert_eq!(h.store.write_count(), 1, "the screenshot key is written exactly once");
    assert_eq!(h.store.value(KEY_SCREENSHOT), Some(json!(receipt.public_url)));
}

#[tokio::test]
async fn unmapped_domain_uses_selected_task() {
    let h = harness(FixedTab::url("https://news.ycombinator.com/"), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);
    h.store.seed(
        KEY_URL_MAPPINGS,
        json!([{ "url_mapping_id": 1, "url": "https://github.com", "task_id": 7, "title": "Code review" }]),
    );

    let outcome = h.service.run_cycle(CaptureTrigger::TabActivated).await.unwrap();

    let CaptureOutcome::Captured(receipt) = outcome else { panic!("expected a capture") };
    assert_eq!(receipt.task.task_id, Some(EntityId::Numeric(3)));
    assert!(receipt.filename.starts_with("3_"));
}

#[tokio::test]
async fn no_user_skips_before_any_io() {
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::ok(), RecordingSink::default());
    h.store.seed(KEY_IS_RUNNING, json!(true));

    let outcome = h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    assert_eq!(outcome, CaptureOutcome::Skipped(SkipReason::NoUser));
    assert_eq!(h.screenshots.calls(), 0);
    assert!(h.sink.uploads().is_empty());
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn stopped_timer_skips() {
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);
    h.store.seed(KEY_IS_RUNNING, json!(false));

    let outcome = h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    assert_eq!(outcome, CaptureOutcome::Skipped(SkipReason::TimerStopped));
    assert_eq!(h.screenshots.calls(), 0);
}

#[tokio::test]
async fn unreadable_tab_uses_placeholder_website() {
    let h = harness(FixedTab::failing(), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);

    let outcome = h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    assert!(outcome.is_captured());
    assert_eq!(h.sink.records()[0].website, "N/A");
}

#[tokio::test]
async fn missing_task_records_null_and_names_file_none() {
    let h = harness(FixedTab::none(), FakeScreenshots::ok(), RecordingSink::default());
    h.store.seed(KEY_USER, json!({ "id": "user-1" }));
    h.store.seed(KEY_IS_RUNNING, json!(true));

    let outcome = h.service.run_cycle(CaptureTrigger::Manual).await.unwrap();

    let CaptureOutcome::Captured(receipt) = outcome else { panic!("expected a capture") };
    assert!(receipt.filename.starts_with("none_"));
    assert_eq!(h.sink.records()[0].task_id, None);
}

#[tokio::test]
async fn malformed_mappings_fall_back_to_selection() {
    let h = harness(FixedTab::url("https://github.com"), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);
    h.store.seed(KEY_URL_MAPPINGS, json!("not a list"));

    let outcome = h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    let CaptureOutcome::Captured(receipt) = outcome else { panic!("expected a capture") };
    assert_eq!(receipt.task.task_id, Some(EntityId::Numeric(3)));
}

#[tokio::test]
async fn screenshot_failure_stops_the_cycle() {
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::failing(), RecordingSink::default());
    ready(&h.store);

    assert!(h.service.run_cycle(CaptureTrigger::Alarm).await.is_err());
    assert!(h.sink.uploads().is_empty());
    assert!(h.sink.records().is_empty());
    assert_eq!(h.store.value(KEY_SCREENSHOT), None);
}

#[tokio::test]
async fn upload_failure_skips_insert_and_pointer() {
    let sink = RecordingSink::failing_upload();
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::ok(), sink);
    ready(&h.store);

    assert!(h.service.run_cycle(CaptureTrigger::Alarm).await.is_err());
    assert!(h.sink.records().is_empty());
    assert_eq!(h.store.value(KEY_SCREENSHOT), None);
}

#[tokio::test]
async fn insert_failure_skips_pointer() {
    let sink = RecordingSink::failing_insert();
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::ok(), sink);
    ready(&h.store);

    assert!(h.service.run_cycle(CaptureTrigger::Alarm).await.is_err());
    assert_eq!(h.sink.uploads().len(), 1);
    assert_eq!(h.store.value(KEY_SCREENSHOT), None);
}

#[tokio::test]
async fn each_cycle_uploads_a_distinct_file() {
    let h = harness(FixedTab::url("https://a.com"), FakeScreenshots::ok(), RecordingSink::default());
    ready(&h.store);

    h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();
    h.service.run_cycle(CaptureTrigger::Alarm).await.unwrap();

    let uploads = h.sink.uploads();
    assert_eq!(uploads.len(), 2);
    assert_ne!(uploads[0], uploads[1]);
}
