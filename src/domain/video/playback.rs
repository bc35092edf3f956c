// SPDX-License-Identifier: MPL-2.0
//! Playback session state machine.
//!
//! This module defines the lifecycle states of a playback session:
//! - Idle: created, nothing acquired yet
//! - Loading: waiting for the engine or rebuilding handles
//! - Ready: engine attached, tracks wired, transport mirrored
//! - Disposed: every handle released; terminal

use std::fmt;

/// Identifier of one playback session, unique per synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Lifecycle state of one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Ready,
    Disposed,
}

impl SessionState {
    /// Returns true if the session may own engine resources.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Loading | Self::Ready)
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub fn is_disposed(self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// Returns true if `self -> next` is an edge of the state machine.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Loading)
                | (Self::Idle, Self::Disposed)
                | (Self::Loading, Self::Ready)
                | (Self::Loading, Self::Disposed)
                | (Self::Ready, Self::Loading)
                | (Self::Ready, Self::Disposed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_disposed_is_terminal() {
        for next in [
            SessionState::Idle,
            SessionState::Loading,
            SessionState::Ready,
            SessionState::Disposed,
        ] {
            assert!(!SessionState::Disposed.can_transition_to(next));
        }
    }

    #[test]
    fn test_ready_can_rebuild_through_loading() {
        assert!(SessionState::Ready.can_transition_to(SessionState::Loading));
        assert!(SessionState::Loading.can_transition_to(SessionState::Ready));
        assert!(!SessionState::Idle.can_transition_to(SessionState::Ready));
    }

    #[test]
    fn test_is_live() {
        assert!(!SessionState::Idle.is_live());
        assert!(SessionState::Loading.is_live());
        assert!(SessionState::Ready.is_live());
        assert!(!SessionState::Disposed.is_live());
    }
}
