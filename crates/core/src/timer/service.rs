//! Timer operations over the persistent store
//!
//! Every operation reads the timer keys fresh, so a timer started before a
//! restart keeps counting after it.

use std::sync::Arc;

use snaptrack_domain::constants::TIMER_KEYS;
use snaptrack_domain::{Result, TimerState};
use tracing::{debug, info, instrument};

use super::ports::Clock;
use crate::store::PersistenceStore;

/// Stateless timer logic. Not safe for concurrent toggles on its own; route
/// mutations through [`TimerActor`](super::actor::TimerActor).
pub struct TimerService {
    store: Arc<dyn PersistenceStore>,
    clock: Arc<dyn Clock>,
}

impl TimerService {
    pub fn new(store: Arc<dyn PersistenceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current persisted state.
    pub async fn load(&self) -> Result<TimerState> {
        let values = self.store.get(&TIMER_KEYS).await?;
        Ok(TimerState::from_store(&values))
    }

    /// Start or stop the timer and persist all three keys in one write.
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<TimerState> {
        let current = self.load().await?;
        let now_ms = self.clock.now_ms();
        let next = current.toggled(now_ms);

        self.store.set(next.to_store_values()?).await?;

        info!(
            from = %current.phase(),
            to = %next.phase(),
            accumulated_ms = next.accumulated_ms(),
            "timer toggled"
        );
        Ok(next)
    }

    /// Total tracked milliseconds including the live session.
    pub async fn elapsed_ms(&self) -> Result<i64> {
        let state = self.load().await?;
        let elapsed = state.elapsed_ms(self.clock.now_ms());
        debug!(phase = %state.phase(), elapsed_ms = elapsed, "elapsed time read");
        Ok(elapsed)
    }
}
