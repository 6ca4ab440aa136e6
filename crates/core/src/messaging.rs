//! Request/response protocol spoken by the popup and page contexts

use serde::{Deserialize, Serialize};
use snaptrack_domain::Result;
use tracing::debug;

use crate::timer::TimerHandle;

/// Message addressed to the background coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundRequest {
    ToggleTimer,
    GetElapsedTime,
}

/// Reply to a [`BackgroundRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundResponse {
    Toggled { success: bool },
    Elapsed { elapsed: i64 },
}

/// Route a request to the timer.
pub async fn dispatch(timer: &TimerHandle, request: BackgroundRequest) -> Result<BackgroundResponse> {
    debug!(?request, "dispatching background request");
    match request {
        BackgroundRequest::ToggleTimer => {
            timer.toggle().await?;
            Ok(BackgroundResponse::Toggled { success: true })
        }
        BackgroundRequest::GetElapsedTime => {
            let elapsed = timer.elapsed_ms().await?;
            Ok(BackgroundResponse::Elapsed { elapsed })
        }
    }
}
