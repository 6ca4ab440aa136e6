//! Loopback HTTP surface
//!
//! The popup, the login flow, the mapping page and the tab event hook talk
//! to the daemon through these routes. Errors are returned as `{"type", "message"}` with
//! a status derived from the error kind.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use snaptrack_core::{BackgroundRequest, BackgroundResponse, Selection};
use snaptrack_domain::{
    AuthUser, MappingId, Result, SnaptrackError, TimerState, UrlMapping, UrlMappingDraft,
};
use snaptrack_infra::CaptureStats;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::commands::{self, tabs::TabActivatedPayload};
use crate::context::AppContext;
use crate::utils::health::HealthReport;

type SharedContext = Arc<AppContext>;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub SnaptrackError);

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self.0 {
            SnaptrackError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SnaptrackError::Auth(_) => StatusCode::UNAUTHORIZED,
            SnaptrackError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SnaptrackError> for ApiError {
    fn from(err: SnaptrackError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SnaptrackError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(self.0)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the router over a shared context.
pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/messages", post(post_message))
        .route("/tabs/activated", post(post_tab_activated))
        .route("/timer", get(get_timer))
        .route("/mappings", get(get_mappings).post(post_mapping))
        .route("/mappings/refresh", post(post_mappings_refresh))
        .route("/mappings/{id}", put(put_mapping).delete(delete_mapping))
        .route("/selection", get(get_selection).put(put_selection).delete(delete_selection))
        .route("/session", get(get_session).put(put_session).delete(delete_session))
        .route("/capture", post(post_capture))
        .route("/metrics/capture", get(get_capture_stats))
        .route("/health", get(get_health))
        .with_state(ctx)
}

async fn post_message(
    State(ctx): State<SharedContext>,
    payload: std::result::Result<Json<BackgroundRequest>, JsonRejection>,
) -> ApiResult<Json<BackgroundResponse>> {
    let Json(request) = payload?;
    Ok(Json(commands::handle_message(&ctx, request).await?))
}

async fn post_tab_activated(
    State(ctx): State<SharedContext>,
    payload: std::result::Result<Json<TabActivatedPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(payload) = payload?;
    commands::tab_activated(&ctx, payload);
    Ok(StatusCode::ACCEPTED)
}

async fn get_timer(State(ctx): State<SharedContext>) -> ApiResult<Json<TimerState>> {
    Ok(Json(commands::timer_state(&ctx).await?))
}

async fn get_mappings(State(ctx): State<SharedContext>) -> ApiResult<Json<Vec<UrlMapping>>> {
    Ok(Json(commands::list_mappings(&ctx).await?))
}

async fn post_mappings_refresh(State(ctx): State<SharedContext>) -> ApiResult<Json<Vec<UrlMapping>>> {
    Ok(Json(commands::refresh_mappings(&ctx).await?))
}

async fn post_mapping(
    State(ctx): State<SharedContext>,
    payload: std::result::Result<Json<UrlMappingDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UrlMapping>)> {
    let Json(draft) = payload?;
    let created = commands::create_mapping(&ctx, draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn put_mapping(
    State(ctx): State<SharedContext>,
    Path(id): Path<MappingId>,
    payload: std::result::Result<Json<UrlMappingDraft>, JsonRejection>,
) -> ApiResult<Json<UrlMapping>> {
    let Json(draft) = payload?;
    Ok(Json(commands::update_mapping(&ctx, id, draft).await?))
}

async fn delete_mapping(State(ctx): State<SharedContext>, Path(id): Path<MappingId>) -> ApiResult<StatusCode> {
    commands::delete_mapping(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_selection(State(ctx): State<SharedContext>) -> ApiResult<Json<Selection>> {
    Ok(Json(commands::get_selection(&ctx).await?))
}

async fn put_selection(
    State(ctx): State<SharedContext>,
    payload: std::result::Result<Json<Selection>, JsonRejection>,
) -> ApiResult<Json<Selection>> {
    let Json(selection) = payload?;
    Ok(Json(commands::set_selection(&ctx, selection).await?))
}

async fn delete_selection(State(ctx): State<SharedContext>) -> ApiResult<StatusCode> {
    commands::clear_selection(&ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_session(State(ctx): State<SharedContext>) -> ApiResult<Json<Option<AuthUser>>> {
    Ok(Json(commands::get_session(&ctx).await?))
}

async fn put_session(
    State(ctx): State<SharedContext>,
    payload: std::result::Result<Json<AuthUser>, JsonRejection>,
) -> ApiResult<Json<AuthUser>> {
    let Json(user) = payload?;
    Ok(Json(commands::sign_in(&ctx, user).await?))
}

async fn delete_session(State(ctx): State<SharedContext>) -> ApiResult<StatusCode> {
    commands::sign_out(&ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_capture(State(ctx): State<SharedContext>) -> StatusCode {
    commands::trigger_capture(&ctx).await;
    StatusCode::ACCEPTED
}

async fn get_capture_stats(State(ctx): State<SharedContext>) -> Json<CaptureStats> {
    Json(commands::capture_stats(&ctx))
}

async fn get_health(State(ctx): State<SharedContext>) -> (StatusCode, Json<HealthReport>) {
    let report = ctx.health_check().await;
    let status = if report.healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(report))
}

/// Running loopback server.
pub struct MessageServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MessageServer {
    /// Bind `bind_addr` and serve the router until [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    /// Returns `SnaptrackError::Network` if the address cannot be bound.
    pub async fn start(ctx: SharedContext, bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
            SnaptrackError::Network(format!("failed to bind message server on {bind_addr}: {err}"))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| SnaptrackError::Network(format!("failed to determine local address: {err}")))?;

        let app = router(ctx);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "message server error");
            }
        });

        info!(addr = %local_addr, "message server listening");
        Ok(Self { local_addr, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for open requests to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(SnaptrackError::Internal(format!("message server panicked: {err}")));
                }
            }
        }

        info!("message server stopped");
        Ok(())
    }
}

impl Drop for MessageServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}
