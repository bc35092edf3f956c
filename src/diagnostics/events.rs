// SPDX-License-Identifier: MPL-2.0
//! Lifecycle events recorded by the synchronizer.

use crate::application::port::HandleId;
use crate::domain::error::TrackKind;
use crate::domain::video::{SessionId, SessionState};
use chrono::{DateTime, Utc};

/// What kind of resource a handle owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// The primary video engine instance.
    Video,
    /// A dubbed audio element.
    Audio,
    /// A remote subtitle track registration.
    Subtitle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    HandleAcquired {
        handle: HandleId,
        kind: HandleKind,
    },
    HandleReleased {
        handle: HandleId,
        kind: HandleKind,
    },
    /// An auxiliary track failed and was dropped; playback continues.
    Degraded {
        track: TrackKind,
        message: String,
    },
    LoadFailed {
        reason: String,
    },
}

/// One entry of the lifecycle log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Monotonic sequence number; orders events across sessions.
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub session: SessionId,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    #[must_use]
    pub fn new(seq: u64, session: SessionId, kind: SessionEventKind) -> Self {
        Self {
            seq,
            at: Utc::now(),
            session,
            kind,
        }
    }

    /// Returns the target state for a state change.
    #[must_use]
    pub fn entered_state(&self) -> Option<SessionState> {
        match self.kind {
            SessionEventKind::StateChanged { to, .. } => Some(to),
            _ => None,
        }
    }
}
