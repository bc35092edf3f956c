// SPDX-License-Identifier: MPL-2.0
//! Session lifecycle log.
//!
//! The synchronizer records every state change, handle acquisition and
//! release, and degradation into a memory-bounded ring buffer. Hosts read it
//! to display what happened; tests read it to check ordering guarantees
//! (a release's sequence number must precede the next acquisition's).
//!
//! - [`CircularBuffer`]: Generic ring buffer with configurable capacity
//! - [`SessionEvent`]: One timestamped, sequenced entry
//! - [`SessionLog`]: The log itself

mod buffer;
mod events;

pub use buffer::{CircularBuffer, HistoryCapacity};
pub use events::{HandleKind, SessionEvent, SessionEventKind};

use crate::domain::video::{SessionId, SessionState};

/// Sequenced, bounded record of session lifecycle events.
#[derive(Debug, Clone)]
pub struct SessionLog {
    buffer: CircularBuffer<SessionEvent>,
    next_seq: u64,
}

impl SessionLog {
    #[must_use]
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            buffer: CircularBuffer::new(capacity),
            next_seq: 1,
        }
    }

    /// Appends an event and returns its sequence number.
    pub fn record(&mut self, session: SessionId, kind: SessionEventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.buffer.push(SessionEvent::new(seq, session, kind));
        seq
    }

    /// Oldest-first iterator over retained events.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SessionEvent> {
        self.buffer.iter()
    }

    /// Events of one session, oldest first.
    pub fn for_session(&self, session: SessionId) -> impl Iterator<Item = &SessionEvent> {
        self.buffer.iter().filter(move |e| e.session == session)
    }

    /// States a session entered, in order.
    #[must_use]
    pub fn state_trail(&self, session: SessionId) -> Vec<SessionState> {
        self.for_session(session)
            .filter_map(SessionEvent::entered_state)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(HistoryCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_assigns_increasing_sequence_numbers() {
        let mut log = SessionLog::default();
        let a = log.record(
            SessionId(1),
            SessionEventKind::LoadFailed {
                reason: "x".into(),
            },
        );
        let b = log.record(
            SessionId(2),
            SessionEventKind::LoadFailed {
                reason: "y".into(),
            },
        );
        assert!(b > a);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn state_trail_filters_by_session() {
        let mut log = SessionLog::default();
        let change = |from, to| SessionEventKind::StateChanged { from, to };
        log.record(SessionId(1), change(SessionState::Idle, SessionState::Loading));
        log.record(SessionId(2), change(SessionState::Idle, SessionState::Loading));
        log.record(SessionId(1), change(SessionState::Loading, SessionState::Ready));

        assert_eq!(
            log.state_trail(SessionId(1)),
            vec![SessionState::Loading, SessionState::Ready]
        );
        assert_eq!(log.state_trail(SessionId(2)), vec![SessionState::Loading]);
    }

    #[test]
    fn log_is_bounded() {
        let mut log = SessionLog::new(HistoryCapacity::new(0));
        for _ in 0..100 {
            log.record(
                SessionId(1),
                SessionEventKind::LoadFailed {
                    reason: String::new(),
                },
            );
        }
        assert_eq!(
            log.len(),
            crate::domain::diagnostics::history_bounds::MIN
        );
    }
}
