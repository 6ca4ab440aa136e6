//! Single-writer actor serializing timer commands
//!
//! Toggles arriving concurrently are applied one at a time, each against the
//! state left by the previous one.

use snaptrack_domain::{Result, SnaptrackError, TimerState};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::service::TimerService;

const COMMAND_BUFFER: usize = 32;

/// Request sent to the timer actor.
#[derive(Debug)]
pub enum TimerCommand {
    Toggle { respond_to: oneshot::Sender<Result<TimerState>> },
    Elapsed { respond_to: oneshot::Sender<Result<i64>> },
    State { respond_to: oneshot::Sender<Result<TimerState>> },
}

/// Owns the [`TimerService`] and processes commands in arrival order.
pub struct TimerActor {
    service: TimerService,
    receiver: mpsc::Receiver<TimerCommand>,
}

impl TimerActor {
    /// Start the actor. It runs until every [`TimerHandle`] is dropped.
    pub fn spawn(service: TimerService) -> (TimerHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let actor = Self { service, receiver };
        let handle = tokio::spawn(actor.run());
        (TimerHandle { sender }, handle)
    }

    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            self.handle(command).await;
        }
        debug!("timer actor stopped");
    }

    async fn handle(&self, command: TimerCommand) {
        // A dropped responder means the caller gave up; the command still
        // takes effect.
        match command {
            TimerCommand::Toggle { respond_to } => {
                let _ = respond_to.send(self.service.toggle().await);
            }
            TimerCommand::Elapsed { respond_to } => {
                let _ = respond_to.send(self.service.elapsed_ms().await);
            }
            TimerCommand::State { respond_to } => {
                let _ = respond_to.send(self.service.load().await);
            }
        }
    }
}

/// Cloneable client for the timer actor.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    sender: mpsc::Sender<TimerCommand>,
}

impl TimerHandle {
    pub async fn toggle(&self) -> Result<TimerState> {
        self.request(|respond_to| TimerCommand::Toggle { respond_to }).await
    }

    pub async fn elapsed_ms(&self) -> Result<i64> {
        self.request(|respond_to| TimerCommand::Elapsed { respond_to }).await
    }

    pub async fn state(&self) -> Result<TimerState> {
        self.request(|respond_to| TimerCommand::State { respond_to }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> TimerCommand,
    ) -> Result<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| SnaptrackError::Internal("timer actor is not running".to_string()))?;
        response
            .await
            .map_err(|_| SnaptrackError::Internal("timer actor dropped the request".to_string()))?
    }
}
