// SPDX-License-Identifier: MPL-2.0
//! Events reported by engines and elements back to the synchronizer.
//!
//! Every sink is stamped with the [`HandleId`] of the handle that registered
//! it. The synchronizer compares that origin with its live handles and drops
//! anything coming from a handle it has already released.

use std::fmt;
use tokio::sync::mpsc;

/// Identifier of a handle owned by a playback session.
///
/// Ids are allocated from a monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    #[must_use]
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport signal from the primary video timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    Play,
    Pause,
    /// A seek finished; carries the video's position after the jump.
    Seeked { position_secs: f64 },
    /// The playback rate changed; carries the new rate.
    RateChanged { rate: f64 },
}

/// Anything an engine or element can report.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Transport(TransportEvent),
    /// The dubbed audio resource failed to load or decode.
    AudioFailed { message: String },
    /// The remote subtitle resource failed to load or parse.
    SubtitleFailed { message: String },
}

pub(crate) type EventSender = mpsc::UnboundedSender<(HandleId, MediaEvent)>;
pub(crate) type EventReceiver = mpsc::UnboundedReceiver<(HandleId, MediaEvent)>;

pub(crate) fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Callback endpoint handed to engines and elements.
///
/// Cheap to clone. Emitting never blocks; events sent after the
/// synchronizer is gone are discarded.
#[derive(Clone)]
pub struct EventSink {
    origin: HandleId,
    tx: EventSender,
}

impl EventSink {
    pub(crate) fn new(origin: HandleId, tx: EventSender) -> Self {
        Self { origin, tx }
    }

    /// The handle this sink reports for.
    #[must_use]
    pub fn origin(&self) -> HandleId {
        self.origin
    }

    /// Delivers an event. Returns false if nobody is listening any more.
    pub fn emit(&self, event: MediaEvent) -> bool {
        self.tx.send((self.origin, event)).is_ok()
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("origin", &self.origin)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_stamps_origin() {
        let (tx, mut rx) = event_channel();
        let sink = EventSink::new(HandleId::new(3), tx);
        assert!(sink.emit(MediaEvent::Transport(TransportEvent::Play)));

        let (origin, event) = rx.try_recv().unwrap();
        assert_eq!(origin, HandleId::new(3));
        assert_eq!(event, MediaEvent::Transport(TransportEvent::Play));
    }

    #[test]
    fn emit_after_receiver_dropped_reports_false() {
        let (tx, rx) = event_channel();
        let sink = EventSink::new(HandleId::new(1), tx);
        drop(rx);
        assert!(!sink.emit(MediaEvent::AudioFailed {
            message: "gone".into()
        }));
    }
}
