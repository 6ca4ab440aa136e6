//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use snaptrack_core::{
    AuthProvider, CaptureDeps, CaptureService, Clock, PersistenceStore, SelectionService,
    TimerActor, TimerHandle, TimerService, UrlMappingService,
};
use snaptrack_domain::constants::KEY_IS_RUNNING;
use snaptrack_domain::{CaptureTrigger, Config, Result, SnaptrackError, StoreKind};
use snaptrack_infra::{
    ActiveTabTracker, CaptureMetrics, CaptureScheduler, CaptureSchedulerConfig, HttpClient,
    HttpScreenshotSource, InMemoryStore, SqliteKvStore, StoreAuthProvider, SupabaseClient,
    SystemClock,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::utils::health::{ComponentHealth, HealthReport};

const LISTENER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn PersistenceStore>,
    pub auth: Arc<StoreAuthProvider>,
    pub timer: TimerHandle,
    pub tabs: Arc<ActiveTabTracker>,
    pub capture: Arc<CaptureService>,
    pub metrics: Arc<CaptureMetrics>,
    pub mappings: Arc<UrlMappingService>,
    pub selection: Arc<SelectionService>,

    scheduler: Mutex<CaptureScheduler>,
    identity_listener: Mutex<Option<JoinHandle<()>>>,
    cancellation: CancellationToken,
}

impl AppContext {
    /// Build every service from `config` and start the capture scheduler
    /// (unless `capture.enabled` is false).
    ///
    /// # Errors
    /// Fails if the capture interval is invalid, the store cannot be opened,
    /// an endpoint URL is invalid, or the scheduler does not start.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        config.capture.validate()?;
        let store = open_store(&config)?;

        // Capture cycles never retry; only mapping reads honor `max_attempts`.
        let capture_http = HttpClient::fail_fast(&config.http)?;
        let sink = Arc::new(SupabaseClient::new(capture_http.clone(), &config.sink)?);
        let screenshots = Arc::new(HttpScreenshotSource::new(capture_http, &config.capture)?);
        let remote = Arc::new(SupabaseClient::new(HttpClient::from_config(&config.http)?, &config.sink)?);

        let poll_fallback = Duration::from_secs(config.identity.poll_fallback_secs.max(1));
        let auth = Arc::new(StoreAuthProvider::start(store.clone(), poll_fallback).await?);

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        // The actor stops on its own once the last handle is dropped.
        let (timer, _timer_task) = TimerActor::spawn(TimerService::new(store.clone(), clock.clone()));

        let tabs = Arc::new(ActiveTabTracker::new());
        let capture = Arc::new(CaptureService::new(CaptureDeps {
            store: store.clone(),
            tabs: tabs.clone(),
            screenshots,
            sink,
            clock,
        }));

        let metrics = Arc::new(CaptureMetrics::new());
        let mut scheduler = CaptureScheduler::new(
            CaptureSchedulerConfig::from_capture(&config.capture),
            capture.clone(),
            metrics.clone(),
        )
        .with_tab_activations(tabs.clone());

        if config.capture.enabled {
            scheduler.start().await.map_err(|err| {
                error!(error = %err, "failed to start capture scheduler");
                SnaptrackError::from(err)
            })?;
        } else {
            warn!("capture disabled by configuration; scheduler not started");
        }

        let mappings = Arc::new(UrlMappingService::new(remote, store.clone(), auth.clone()));
        let selection = Arc::new(SelectionService::new(store.clone()));

        let cancellation = CancellationToken::new();
        let identity_listener =
            spawn_identity_listener(auth.as_ref(), mappings.clone(), cancellation.clone());

        info!(
            store = ?config.store.kind,
            capture_enabled = config.capture.enabled,
            interval_minutes = config.capture.interval_minutes,
            "application context initialized"
        );

        Ok(Self {
            config,
            store,
            auth,
            timer,
            tabs,
            capture,
            metrics,
            mappings,
            selection,
            scheduler: Mutex::new(scheduler),
            identity_listener: Mutex::new(Some(identity_listener)),
            cancellation,
        })
    }

    pub async fn scheduler_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Run one cycle now, outside the alarm schedule.
    pub async fn trigger_capture(&self) -> JoinHandle<()> {
        self.scheduler.lock().await.trigger(CaptureTrigger::Manual)
    }

    /// Check the store, the scheduler and the session.
    pub async fn health_check(&self) -> HealthReport {
        let store = match self.store.get(&[KEY_IS_RUNNING]).await {
            Ok(_) => ComponentHealth::healthy("store"),
            Err(err) => ComponentHealth::unhealthy("store", err.to_string()),
        };

        let scheduler = match (self.config.capture.enabled, self.scheduler_running().await) {
            (_, true) => ComponentHealth::healthy("scheduler"),
            (true, false) => ComponentHealth::unhealthy("scheduler", "not running"),
            (false, false) => ComponentHealth::unhealthy("scheduler", "disabled").advisory(),
        };

        let session = match self.auth.get_session().await {
            Ok(Some(_)) => ComponentHealth::healthy("session").advisory(),
            Ok(None) => ComponentHealth::unhealthy("session", "signed out").advisory(),
            Err(err) => ComponentHealth::unhealthy("session", err.to_string()).advisory(),
        };

        HealthReport::from_components(vec![store, scheduler, session])
    }

    /// Stop the scheduler and background listeners. In-flight cycles finish
    /// on their own.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        self.cancellation.cancel();

        {
            let mut scheduler = self.scheduler.lock().await;
            if scheduler.is_running() {
                scheduler.stop().await?;
            }
        }

        if let Some(handle) = self.identity_listener.lock().await.take() {
            match tokio::time::timeout(LISTENER_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "identity listener ended abnormally"),
                Err(_) => warn!("identity listener did not stop in time"),
            }
        }

        let stats = self.metrics.snapshot();
        info!(
            captured = stats.captured,
            failed = stats.failed,
            skipped_no_user = stats.skipped_no_user,
            skipped_timer_stopped = stats.skipped_timer_stopped,
            p95_duration_ms = ?stats.p95_duration_ms,
            "capture totals at shutdown"
        );
        Ok(())
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn PersistenceStore>> {
    match config.store.kind {
        StoreKind::Sqlite => {
            let store = SqliteKvStore::open(&config.store.path, config.store.pool_size)?;
            info!(path = %config.store.path, "sqlite store opened");
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("using in-memory store; state is lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Refresh the mapping mirror whenever a user signs in (and once at start
/// if one already is).
fn spawn_identity_listener(
    auth: &dyn AuthProvider,
    mappings: Arc<UrlMappingService>,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    let mut sessions = auth.on_change();
    let signed_in = sessions.borrow_and_update().is_some();

    tokio::spawn(async move {
        if signed_in {
            refresh_mappings(&mappings).await;
        }

        loop {
            tokio::select! {
                () = cancellation.cancelled() => break,
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let user = sessions.borrow_and_update().clone();
                    match user {
                        Some(user) => {
                            info!(user_id = %user.id, "user signed in");
                            refresh_mappings(&mappings).await;
                        }
                        None => info!("user signed out"),
                    }
                }
            }
        }
        debug!("identity listener stopped");
    })
}

async fn refresh_mappings(mappings: &UrlMappingService) {
    match mappings.refresh().await {
        Ok(list) => debug!(count = list.len(), "url mappings refreshed"),
        Err(err) => warn!(error = %err, "failed to refresh url mappings"),
    }
}
