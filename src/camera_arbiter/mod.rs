//! CameraArbiter - Exclusive active camera feed with manual-override lock
//!
//! ## State machine
//!
//! | state    | select(auto)    | select(manual)          | unlock()  |
//! |----------|-----------------|-------------------------|-----------|
//! | Unlocked | switch          | switch, -> Locked       | no change |
//! | Locked   | suppressed      | switch, stay Locked     | -> Unlocked |
//!
//! Switching always disables the previous feed before enabling the new one,
//! so at most one feed is active. `unlock` never changes the active feed.

mod types;

pub use types::*;

use crate::error::DispatchError;
use crate::presentation::PresentationSink;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Narrow selection interface used by the dispatcher
#[async_trait::async_trait]
pub trait CameraSelector: Send + Sync {
    async fn select(&self, feed: u8, manual: bool) -> Result<SelectOutcome, DispatchError>;
    async fn unlock(&self);
}

/// CameraArbiter instance
pub struct CameraArbiter {
    state: RwLock<CameraArbiterState>,
    sink: Arc<dyn PresentationSink>,
}

impl CameraArbiter {
    /// Create arbiter in the initial state (unlocked, no active feed)
    pub fn new(sink: Arc<dyn PresentationSink>) -> Self {
        Self {
            state: RwLock::new(CameraArbiterState::default()),
            sink,
        }
    }

    /// Get current state
    pub async fn state(&self) -> CameraArbiterState {
        *self.state.read().await
    }

    /// Request a feed; out-of-range feeds are rejected and leave state unchanged
    pub async fn select(&self, feed: u8, manual: bool) -> Result<SelectOutcome, DispatchError> {
        let feed = CameraFeedIndex::new(feed)?;

        let outcome = {
            let mut state = self.state.write().await;
            let (next, outcome) = transition(*state, feed, manual);
            *state = next;
            outcome
        };

        match outcome {
            SelectOutcome::Switched {
                previous,
                feed,
                locked,
            } => {
                tracing::info!(
                    previous = ?previous.map(u8::from),
                    feed = feed.value(),
                    floor = feed.floor_index() + 1,
                    zone = feed.zone_index(),
                    manual,
                    locked,
                    "Camera feed switched"
                );
                self.sink.switch_camera(feed, manual).await;
            }
            SelectOutcome::Suppressed => {
                tracing::debug!(feed = feed.value(), "Automated camera switch suppressed (locked)");
            }
        }

        Ok(outcome)
    }

    /// Clear the manual lock; the active feed stays as is
    pub async fn unlock(&self) {
        let was_locked = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut state.locked, false)
        };

        tracing::info!(was_locked, "Camera display unlocked");
        self.sink.unlock().await;
    }

    /// Back to the initial state (shutdown)
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = CameraArbiterState::default();
        tracing::info!("Camera arbiter reset");
    }
}

#[async_trait::async_trait]
impl CameraSelector for CameraArbiter {
    async fn select(&self, feed: u8, manual: bool) -> Result<SelectOutcome, DispatchError> {
        CameraArbiter::select(self, feed, manual).await
    }

    async fn unlock(&self) {
        CameraArbiter::unlock(self).await;
    }
}

fn transition(
    state: CameraArbiterState,
    feed: CameraFeedIndex,
    manual: bool,
) -> (CameraArbiterState, SelectOutcome) {
    if state.locked && !manual {
        return (state, SelectOutcome::Suppressed);
    }

    let next = CameraArbiterState {
        active_feed: Some(feed),
        locked: state.locked || manual,
    };
    let outcome = SelectOutcome::Switched {
        previous: state.active_feed,
        feed,
        locked: next.locked,
    };
    (next, outcome)
}
