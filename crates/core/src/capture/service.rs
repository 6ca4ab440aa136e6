//! Capture cycle orchestration
//!
//! One cycle: read the active tab and the capture context, check the
//! preconditions, resolve the task, then fetch, upload, record and publish the
//! screenshot. Steps run strictly in order; the first failure ends the cycle
//! and nothing after it runs. Cycles are not retried.

use std::sync::Arc;

use snaptrack_domain::constants::{
    CAPTURE_CONTEXT_KEYS, KEY_IS_RUNNING, KEY_SCREENSHOT, KEY_SELECTED_PROJECT,
    KEY_SELECTED_TASK, KEY_URL_MAPPINGS, KEY_USER,
};
use snaptrack_domain::{
    extract_domain, ActiveTabSnapshot, AuthUser, CaptureOutcome, CaptureReceipt, CaptureRecord,
    CaptureTrigger, Result, SelectedProject, SelectedTask, SkipReason, StoreValues, UrlMapping,
};
use tracing::{debug, error, info, instrument, warn};

use super::filename::screenshot_filename;
use super::ports::{ScreenshotSink, ScreenshotSource, TabSource};
use crate::mapping::resolve_task;
use crate::store::PersistenceStore;
use crate::timer::Clock;

/// Collaborators of a capture cycle.
pub struct CaptureDeps {
    pub store: Arc<dyn PersistenceStore>,
    pub tabs: Arc<dyn TabSource>,
    pub screenshots: Arc<dyn ScreenshotSource>,
    pub sink: Arc<dyn ScreenshotSink>,
    pub clock: Arc<dyn Clock>,
}

/// Runs capture cycles. Cheap to share behind an `Arc`; cycles may overlap.
pub struct CaptureService {
    deps: CaptureDeps,
}

impl CaptureService {
    pub const fn new(deps: CaptureDeps) -> Self {
        Self { deps }
    }

    /// Run one cycle.
    ///
    /// Missing preconditions (no user, timer stopped) are `Ok(Skipped)`.
    /// Failures while fetching, uploading, recording or publishing are
    /// returned as `Err` after being logged.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, trigger: CaptureTrigger) -> Result<CaptureOutcome> {
        let tab = self.read_active_tab().await;
        let website = tab.url_or_unknown().to_string();

        let context = self.deps.store.get(&CAPTURE_CONTEXT_KEYS).await.inspect_err(|err| {
            error!(error = %err, "failed to read capture context");
        })?;

        let Some(user) = context.get_as::<AuthUser>(KEY_USER) else {
            info!("no signed-in user, skipping capture");
            return Ok(CaptureOutcome::Skipped(SkipReason::NoUser));
        };
        if !context.bool_or(KEY_IS_RUNNING, false) {
            info!("timer is stopped, skipping capture");
            return Ok(CaptureOutcome::Skipped(SkipReason::TimerStopped));
        }

        let task = resolve_cycle_task(&context, &website);

        let image = self.deps.screenshots.fetch_screenshot().await.inspect_err(|err| {
            error!(error = %err, "failed to fetch screenshot");
        })?;

        let filename = {
            let mut rng = rand::thread_rng();
            screenshot_filename(task.task_id.as_ref(), self.deps.clock.now_ms(), &mut rng)
        };

        let public_url = self.deps.sink.upload(&filename, &image).await.inspect_err(|err| {
            error!(error = %err, filename = %filename, "failed to upload screenshot");
        })?;

        let record = CaptureRecord::new(&task, user.id.as_str(), public_url.as_str(), website);
        self.deps.sink.insert_record(&record).await.inspect_err(|err| {
            error!(error = %err, "failed to insert time log record");
        })?;

        self.deps
            .store
            .set(StoreValues::new().with(KEY_SCREENSHOT, &public_url)?)
            .await
            .inspect_err(|err| error!(error = %err, "failed to store screenshot url"))?;

        info!(
            filename = %filename,
            task_id = ?task.task_id.as_ref().map(ToString::to_string),
            website = %record.website,
            "screenshot captured"
        );
        Ok(CaptureOutcome::Captured(CaptureReceipt { filename, public_url, task, record }))
    }

    async fn read_active_tab(&self) -> ActiveTabSnapshot {
        match self.deps.tabs.active_tab().await {
            Ok(tab) => tab,
            Err(err) => {
                warn!(error = %err, "failed to read active tab, continuing without url");
                ActiveTabSnapshot::default()
            }
        }
    }
}

fn resolve_cycle_task(context: &StoreValues, website: &str) -> SelectedTask {
    let fallback = context.get_as::<SelectedTask>(KEY_SELECTED_TASK).unwrap_or_default();
    let mappings: Vec<UrlMapping> = context.get_list(KEY_URL_MAPPINGS);
    if let Some(project) = context.get_as::<SelectedProject>(KEY_SELECTED_PROJECT) {
        debug!(project_id = %project.project_id, "selected project");
    }

    let active_domain = extract_domain(website);
    let task = resolve_task(&active_domain, &mappings, &fallback);
    debug!(
        active_domain = %active_domain,
        mappings = mappings.len(),
        mapped = task != fallback,
        "task resolved"
    );
    task
}
