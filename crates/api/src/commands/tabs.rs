//! Tab focus reports from the browser

use serde::Deserialize;

use crate::context::AppContext;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabActivatedPayload {
    #[serde(default)]
    pub url: Option<String>,
}

/// Record the newly focused tab. The scheduler picks the activation up and
/// runs a cycle.
pub fn tab_activated(ctx: &AppContext, payload: TabActivatedPayload) {
    ctx.tabs.activate(payload.url);
}
