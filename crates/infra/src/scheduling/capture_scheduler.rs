//! Periodic and tab-driven capture scheduling.
//!
//! Two sources start capture cycles: a cron job firing every
//! `capture.interval_minutes`, and every tab activation reported to the
//! [`ActiveTabTracker`]. Each trigger spawns its own cycle. Cycles are never
//! retried, cancelled or time-limited here; HTTP timeouts bound them instead.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use snaptrack_infra::observability::metrics::CaptureMetrics;
//! use snaptrack_infra::platform::ActiveTabTracker;
//! use snaptrack_infra::scheduling::{
//!     CaptureJob, CaptureScheduler, CaptureSchedulerConfig, SchedulerResult,
//! };
//!
//! # async fn example(job: Arc<dyn CaptureJob>) -> SchedulerResult<()> {
//! let tabs = Arc::new(ActiveTabTracker::new());
//! let mut scheduler = CaptureScheduler::new(
//!     CaptureSchedulerConfig::default(),
//!     job,
//!     Arc::new(CaptureMetrics::new()),
//! )
//! .with_tab_activations(tabs);
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use snaptrack_core::CaptureService;
use snaptrack_domain::constants::SCREENSHOT_ALARM_NAME;
use snaptrack_domain::{CaptureConfig, CaptureOutcome, CaptureTrigger};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::InfraError;
use crate::observability::metrics::CaptureMetrics;
use crate::observability::MetricsResult;
use crate::platform::tabs::{ActiveTabTracker, TabActivation};
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// One capture cycle.
#[async_trait]
pub trait CaptureJob: Send + Sync {
    async fn run(&self, trigger: CaptureTrigger) -> Result<CaptureOutcome, InfraError>;
}

#[async_trait]
impl CaptureJob for CaptureService {
    async fn run(&self, trigger: CaptureTrigger) -> Result<CaptureOutcome, InfraError> {
        self.run_cycle(trigger).await.map_err(InfraError::from)
    }
}

/// Configuration for the capture scheduler.
#[derive(Debug, Clone)]
pub struct CaptureSchedulerConfig {
    /// Cron expression (with seconds) for the periodic alarm.
    pub cron_expression: String,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the listener task join handle.
    pub join_timeout: Duration,
}

impl Default for CaptureSchedulerConfig {
    fn default() -> Self {
        Self::from_capture(&CaptureConfig::default())
    }
}

impl CaptureSchedulerConfig {
    pub fn from_capture(config: &CaptureConfig) -> Self {
        Self {
            cron_expression: config.cron_expression(),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Capture scheduler with explicit lifecycle management.
pub struct CaptureScheduler {
    config: CaptureSchedulerConfig,
    job: Arc<dyn CaptureJob>,
    metrics: Arc<CaptureMetrics>,
    tabs: Option<Arc<ActiveTabTracker>>,
    scheduler: Option<JobScheduler>,
    listener_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl CaptureScheduler {
    pub fn new(config: CaptureSchedulerConfig, job: Arc<dyn CaptureJob>, metrics: Arc<CaptureMetrics>) -> Self {
        Self {
            config,
            job,
            metrics,
            tabs: None,
            scheduler: None,
            listener_handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Also run a cycle for every tab activation reported to `tabs`.
    #[must_use]
    pub fn with_tab_activations(mut self, tabs: Arc<ActiveTabTracker>) -> Self {
        self.tabs = Some(tabs);
        self
    }

    /// Register the alarm job, start the cron scheduler and the tab listener.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let start_timeout = self.config.start_timeout;
        let scheduler = with_timeout(start_timeout, JobScheduler::new())
            .await?
            .map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;

        let alarm = self.alarm_job()?;
        let job_id = alarm.guid();
        with_timeout(start_timeout, scheduler.add(alarm))
            .await?
            .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;
        with_timeout(start_timeout, scheduler.start())
            .await?
            .map_err(|err| SchedulerError::StartFailed(err.to_string()))?;

        let handle = tokio::spawn(listen_for_tabs(
            self.tabs.clone(),
            self.job.clone(),
            self.metrics.clone(),
            self.cancellation.clone(),
        ));

        self.scheduler = Some(scheduler);
        self.listener_handle = Some(handle);
        info!(alarm = SCREENSHOT_ALARM_NAME, job_id = %job_id, "capture scheduler started");
        Ok(())
    }

    /// Stop the cron scheduler and wait for the tab listener to finish.
    /// Cycles already in flight run to completion.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(mut scheduler) = self.scheduler.take() {
            with_timeout(self.config.stop_timeout, scheduler.shutdown())
                .await?
                .map_err(|err| SchedulerError::StopFailed(err.to_string()))?;
        }

        if let Some(handle) = self.listener_handle.take() {
            with_timeout(self.config.join_timeout, handle)
                .await?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!("capture scheduler stopped");
        Ok(())
    }

    /// Returns true while the tab listener task is active.
    pub fn is_running(&self) -> bool {
        self.listener_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn a single cycle outside the schedule.
    pub fn trigger(&self, trigger: CaptureTrigger) -> JoinHandle<()> {
        spawn_cycle(self.job.clone(), self.metrics.clone(), trigger)
    }

    pub fn metrics(&self) -> &Arc<CaptureMetrics> {
        &self.metrics
    }

    fn alarm_job(&self) -> SchedulerResult<Job> {
        let job = self.job.clone();
        let metrics = self.metrics.clone();

        Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let job = job.clone();
            let metrics = metrics.clone();
            Box::pin(async move {
                debug!(alarm = SCREENSHOT_ALARM_NAME, "alarm fired");
                run_cycle(job.as_ref(), &metrics, CaptureTrigger::Alarm).await;
            })
        })
        .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CaptureScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

async fn with_timeout<F: std::future::Future>(limit: Duration, future: F) -> SchedulerResult<F::Output> {
    tokio::time::timeout(limit, future).await.map_err(|_| SchedulerError::Timeout { seconds: limit.as_secs() })
}

async fn listen_for_tabs(
    tabs: Option<Arc<ActiveTabTracker>>,
    job: Arc<dyn CaptureJob>,
    metrics: Arc<CaptureMetrics>,
    cancel: CancellationToken,
) {
    let Some(tabs) = tabs else {
        cancel.cancelled().await;
        debug!("capture scheduler monitor cancelled");
        return;
    };

    let mut activations = tabs.subscribe();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("tab listener cancelled");
                break;
            }
            activation = activations.recv() => match activation {
                Ok(TabActivation { url }) => {
                    debug!(url = ?url, "tab activation, starting capture");
                    spawn_cycle(job.clone(), metrics.clone(), CaptureTrigger::TabActivated);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "tab activations dropped while cycles were starting");
                }
                Err(RecvError::Closed) => {
                    debug!("tab activation feed closed");
                    cancel.cancelled().await;
                    break;
                }
            },
        }
    }
}

fn spawn_cycle(job: Arc<dyn CaptureJob>, metrics: Arc<CaptureMetrics>, trigger: CaptureTrigger) -> JoinHandle<()> {
    tokio::spawn(async move { run_cycle(job.as_ref(), &metrics, trigger).await })
}

async fn run_cycle(job: &dyn CaptureJob, metrics: &CaptureMetrics, trigger: CaptureTrigger) {
    log_metric(metrics.record_cycle_started(trigger), "capture.cycle.started");
    let started = Instant::now();

    match job.run(trigger).await {
        Ok(outcome) => {
            log_metric(metrics.record_outcome(&outcome), "capture.cycle.outcome");
            debug!(trigger = %trigger, captured = outcome.is_captured(), "capture cycle finished");
        }
        Err(err) => {
            log_metric(metrics.record_failure(), "capture.cycle.failed");
            error!(trigger = %trigger, error = ?err, "capture cycle failed");
        }
    }

    log_metric(metrics.record_duration(started.elapsed()), "capture.cycle.duration");
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record scheduler metric");
    }
}
