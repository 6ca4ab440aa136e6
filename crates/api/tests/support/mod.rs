#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use snaptrack_core::AuthProvider;
use snaptrack_domain::{AuthUser, CaptureConfig, Config, SinkConfig, StoreConfig, StoreKind};
use snaptrack_lib::{router, AppContext};
use tower::ServiceExt;
use wiremock::MockServer;

/// Config for a context backed by the in-memory store, with the alarm
/// disabled and the remote pointed at `sink_url`.
pub fn test_config(sink_url: &str) -> Config {
    Config {
        store: StoreConfig { kind: StoreKind::Memory, ..StoreConfig::default() },
        capture: CaptureConfig {
            enabled: false,
            screenshot_endpoint: format!("{sink_url}/screenshot"),
            ..CaptureConfig::default()
        },
        sink: SinkConfig {
            base_url: sink_url.to_string(),
            api_key: Some("anon-test-key".into()),
            ..SinkConfig::default()
        },
        ..Config::default()
    }
}

pub async fn context(sink_url: &str) -> Arc<AppContext> {
    Arc::new(AppContext::new_with_config(test_config(sink_url)).await.expect("context should build"))
}

/// Send one request through a fresh router and decode the JSON reply
/// (`Value::Null` for empty bodies).
pub async fn send(ctx: &Arc<AppContext>, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app: Router = router(ctx.clone());
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

/// Sign `user-1` in and wait until the refresh that sign-in triggers has
/// finished, so later mirror writes are not raced by it.
pub async fn sign_in_and_settle(ctx: &AppContext, server: &MockServer) {
    ctx.auth.sign_in(AuthUser::new("user-1")).await.unwrap();

    for _ in 0..100 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.iter().any(|request| request.method.as_str() == "GET") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    // Serialized behind the background refresh.
    let _ = ctx.mappings.refresh().await;
}

pub fn mapping_row(id: i64, title: &str, url: &str, task_id: i64) -> Value {
    json!({
        "url_mapping_id": id,
        "team_id": 1,
        "project_id": 2,
        "task_id": task_id,
        "title": title,
        "url": url,
        "owner_id": "user-1",
        "created_at": "2024-05-01T10:00:00+00:00",
        "updated_at": null
    })
}

pub fn draft_json(title: &str, url: &str) -> Value {
    json!({ "title": title, "url": url, "team_id": 1, "project_id": 2, "task_id": 3 })
}
