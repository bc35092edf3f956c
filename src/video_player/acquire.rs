// SPDX-License-Identifier: MPL-2.0
//! Bounded, cancellable poll for video engine availability.
//!
//! The engine library becomes available asynchronously and never signals
//! completion directly, so the synchronizer asks the [`EngineProvider`] on a
//! fixed interval until it hands out an engine or the attempt budget runs out.
//! The poll races a oneshot cancellation signal; firing or dropping the
//! [`CancelHandle`] stops it before the next `try_acquire` call.
//!
//! An acquired engine never travels back to the caller. It lands in the
//! session's [`EngineSlot`], so releasing the session disposes it even if the
//! load was never completed.

use crate::application::port::{EngineOptions, EngineProvider, VideoEngine};
use crate::config::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use crate::domain::error::PlaybackError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Poll interval and attempt budget for engine acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquirePolicy {
    interval: Duration,
    max_attempts: u32,
}

impl AcquirePolicy {
    /// Creates a policy. A zero interval is raised to one millisecond and a
    /// zero attempt budget to a single attempt.
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            max_attempts: max_attempts.max(1),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on how long a failing poll runs.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for AcquirePolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            DEFAULT_MAX_POLL_ATTEMPTS,
        )
    }
}

/// Cancels an in-flight acquisition. Dropping the handle cancels as well.
#[derive(Debug)]
pub struct CancelHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl CancelHandle {
    /// Signals cancellation. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_none()
    }
}

/// Creates a linked cancel handle and the signal the poll listens on.
pub(crate) fn cancel_pair() -> (CancelHandle, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle { tx: Some(tx) }, rx)
}

#[derive(Default)]
struct SlotState {
    engine: Option<Box<dyn VideoEngine>>,
    closed: bool,
}

impl Drop for SlotState {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
        }
    }
}

/// Landing place for the engine of one load, shared by the poll and the
/// session that started it.
///
/// Once closed, the slot disposes anything that lands in it.
#[derive(Clone, Default)]
pub(crate) struct EngineSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl EngineSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores an acquired engine.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Cancelled`] if the slot was closed; the engine
    /// is disposed.
    pub(crate) fn fill(&self, mut engine: Box<dyn VideoEngine>) -> Result<(), PlaybackError> {
        {
            let mut state = self.state();
            if !state.closed {
                state.engine = Some(engine);
                return Ok(());
            }
        }
        engine.dispose();
        tracing::debug!("engine landed in a closed slot, disposed");
        Err(PlaybackError::Cancelled)
    }

    /// Closes the slot and hands out the landed engine.
    pub(crate) fn take(&self) -> Option<Box<dyn VideoEngine>> {
        let mut state = self.state();
        state.closed = true;
        state.engine.take()
    }

    /// Closes the slot and disposes a landed engine. Returns true if one was disposed.
    pub(crate) fn close(&self) -> bool {
        match self.take() {
            Some(mut engine) => {
                engine.dispose();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("EngineSlot")
            .field("filled", &state.engine.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Polls `provider` until it returns an engine.
///
/// The first attempt happens immediately, the following ones once per
/// `policy.interval()`.
///
/// # Errors
///
/// - [`PlaybackError::Cancelled`] once `cancel` resolves (fired or dropped)
/// - [`PlaybackError::EngineUnavailable`] after `policy.max_attempts()` misses
pub async fn acquire_engine(
    provider: Arc<dyn EngineProvider>,
    options: EngineOptions,
    policy: AcquirePolicy,
    mut cancel: oneshot::Receiver<()>,
) -> Result<Box<dyn VideoEngine>, PlaybackError> {
    let mut ticker = tokio::time::interval(policy.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 1..=policy.max_attempts() {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                tracing::debug!(attempt, "engine acquisition cancelled");
                return Err(PlaybackError::Cancelled);
            }
            _ = ticker.tick() => {}
        }

        if let Some(engine) = provider.try_acquire(&options) {
            tracing::debug!(attempt, "video engine acquired");
            return Ok(engine);
        }
        tracing::trace!(attempt, "video engine not available yet");
    }

    tracing::warn!(
        attempts = policy.max_attempts(),
        "video engine unavailable, giving up"
    );
    Err(PlaybackError::EngineUnavailable {
        attempts: policy.max_attempts(),
    })
}
