//! Capture control and statistics

use snaptrack_infra::CaptureStats;

use crate::context::AppContext;

/// Start a manual cycle without waiting for it.
pub async fn trigger_capture(ctx: &AppContext) {
    // The cycle logs its own outcome and records metrics.
    drop(ctx.trigger_capture().await);
}

pub fn capture_stats(ctx: &AppContext) -> CaptureStats {
    ctx.metrics.snapshot()
}
