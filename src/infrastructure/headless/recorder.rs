// SPDX-License-Identifier: MPL-2.0
//! Shared record of everything the headless engines and elements did.
//!
//! Engines and elements write into the recorder; hosts and tests read
//! snapshots from it and drive the scripted timeline through it (play,
//! seek, element failures). Every lifecycle entry carries a sequence number
//! so acquire/release ordering can be checked across sessions.

use crate::application::port::{
    EngineOptions, EventSink, HandleId, MediaEvent, MediaSource, TrackMode, TransportEvent,
};
use crate::domain::media::LanguageCode;
use crate::domain::video::rate_bounds;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One acquire or release performed by a headless engine or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    EngineAcquired { engine: usize },
    EngineDisposed { engine: usize },
    AudioCreated { element: usize, url: String },
    AudioDisposed { element: usize },
    TrackAdded { engine: usize, url: String },
    TrackRemoved { engine: usize, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEntry {
    pub seq: u64,
    pub action: LifecycleAction,
}

/// A remote text track registered on a headless engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub id: HandleId,
    pub url: String,
    pub language: LanguageCode,
    pub label: String,
    pub default: bool,
    pub mode: TrackMode,
}

/// Observable state of one headless video engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub index: usize,
    pub options: EngineOptions,
    pub source: Option<MediaSource>,
    pub muted: bool,
    pub paused: bool,
    pub position_secs: f64,
    pub rate: f64,
    pub tracks: Vec<TrackSnapshot>,
    pub transport_listeners: usize,
    pub disposed: bool,
}

impl EngineSnapshot {
    /// The track currently in `Showing` mode.
    #[must_use]
    pub fn showing_track(&self) -> Option<&TrackSnapshot> {
        self.tracks.iter().find(|t| t.mode == TrackMode::Showing)
    }
}

/// Observable state of one headless audio element.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSnapshot {
    pub index: usize,
    pub url: String,
    pub playing: bool,
    pub position_secs: f64,
    pub rate: f64,
    pub play_calls: u32,
    pub pause_calls: u32,
    /// Every position the element was told to jump to, in order.
    pub seeks: Vec<f64>,
    pub disposed: bool,
}

struct EngineRecord {
    snapshot: EngineSnapshot,
    track_sinks: Vec<EventSink>,
    transport: Vec<EventSink>,
}

struct ElementRecord {
    snapshot: AudioSnapshot,
    sink: EventSink,
}

#[derive(Default)]
struct RecorderState {
    next_seq: u64,
    entries: Vec<LifecycleEntry>,
    engines: Vec<EngineRecord>,
    elements: Vec<ElementRecord>,
    live_engines: usize,
    peak_engines: usize,
    live_audio: usize,
    peak_audio: usize,
    acquire_attempts: u32,
    reject_sources: bool,
    reject_audio: bool,
}

impl RecorderState {
    fn log(&mut self, action: LifecycleAction) {
        self.next_seq += 1;
        self.entries.push(LifecycleEntry {
            seq: self.next_seq,
            action,
        });
    }

    fn current_engine_mut(&mut self) -> Option<&mut EngineRecord> {
        self.engines.iter_mut().rev().find(|e| !e.snapshot.disposed)
    }

    fn current_element_mut(&mut self) -> Option<&mut ElementRecord> {
        self.elements.iter_mut().rev().find(|e| !e.snapshot.disposed)
    }
}

/// Cheaply cloneable handle on the shared headless state.
#[derive(Clone, Default)]
pub struct HeadlessRecorder {
    inner: Arc<Mutex<RecorderState>>,
}

impl HeadlessRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecorderState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Number of `try_acquire` calls seen by any provider on this recorder.
    #[must_use]
    pub fn acquire_attempts(&self) -> u32 {
        self.state().acquire_attempts
    }

    #[must_use]
    pub fn live_engines(&self) -> usize {
        self.state().live_engines
    }

    /// Highest number of simultaneously live engines ever observed.
    #[must_use]
    pub fn peak_engines(&self) -> usize {
        self.state().peak_engines
    }

    #[must_use]
    pub fn live_audio(&self) -> usize {
        self.state().live_audio
    }

    /// Highest number of simultaneously live audio elements ever observed.
    #[must_use]
    pub fn peak_audio(&self) -> usize {
        self.state().peak_audio
    }

    #[must_use]
    pub fn engine_count(&self) -> usize {
        self.state().engines.len()
    }

    #[must_use]
    pub fn audio_count(&self) -> usize {
        self.state().elements.len()
    }

    #[must_use]
    pub fn engine(&self, index: usize) -> Option<EngineSnapshot> {
        self.state().engines.get(index).map(|e| e.snapshot.clone())
    }

    /// Most recently acquired engine that is still live.
    #[must_use]
    pub fn current_engine(&self) -> Option<EngineSnapshot> {
        self.state().current_engine_mut().map(|e| e.snapshot.clone())
    }

    #[must_use]
    pub fn audio(&self, index: usize) -> Option<AudioSnapshot> {
        self.state().elements.get(index).map(|e| e.snapshot.clone())
    }

    /// Most recently created audio element that is still live.
    #[must_use]
    pub fn current_audio(&self) -> Option<AudioSnapshot> {
        self.state().current_element_mut().map(|e| e.snapshot.clone())
    }

    /// Transport subscriptions still registered on any engine.
    #[must_use]
    pub fn transport_listeners(&self) -> usize {
        self.state()
            .engines
            .iter()
            .map(|e| e.transport.len())
            .sum()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LifecycleEntry> {
        self.state().entries.clone()
    }

    /// Sequence number of the first entry matching `action`.
    #[must_use]
    pub fn seq_of(&self, action: &LifecycleAction) -> Option<u64> {
        self.state()
            .entries
            .iter()
            .find(|e| &e.action == action)
            .map(|e| e.seq)
    }

    // =========================================================================
    // Failure injection
    // =========================================================================

    /// Makes `set_source` fail on every engine.
    pub fn reject_sources(&self, reject: bool) {
        self.state().reject_sources = reject;
    }

    /// Makes the audio factory refuse to create elements.
    pub fn reject_audio(&self, reject: bool) {
        self.state().reject_audio = reject;
    }

    // =========================================================================
    // Scripted timeline
    // =========================================================================

    /// Delivers `event` to every transport listener of the current engine,
    /// updating the engine's state first. Returns the number of listeners.
    pub fn emit_transport(&self, event: TransportEvent) -> usize {
        let sinks = {
            let mut state = self.state();
            let Some(engine) = state.current_engine_mut() else {
                return 0;
            };
            let snapshot = &mut engine.snapshot;
            match event {
                TransportEvent::Play => snapshot.paused = false,
                TransportEvent::Pause => snapshot.paused = true,
                TransportEvent::Seeked { position_secs } => snapshot.position_secs = position_secs,
                TransportEvent::RateChanged { rate } => snapshot.rate = rate,
            }
            engine.transport.clone()
        };
        sinks
            .iter()
            .filter(|sink| sink.emit(MediaEvent::Transport(event)))
            .count()
    }

    /// Delivers `event` to the current engine's transport listeners without
    /// touching the engine's state, as an adapter with a stale payload would.
    pub fn deliver_transport(&self, event: TransportEvent) -> usize {
        let sinks = match self.state().current_engine_mut() {
            Some(engine) => engine.transport.clone(),
            None => return 0,
        };
        sinks
            .iter()
            .filter(|sink| sink.emit(MediaEvent::Transport(event)))
            .count()
    }

    pub fn play(&self) -> usize {
        self.emit_transport(TransportEvent::Play)
    }

    pub fn pause(&self) -> usize {
        self.emit_transport(TransportEvent::Pause)
    }

    pub fn seek(&self, position_secs: f64) -> usize {
        self.emit_transport(TransportEvent::Seeked { position_secs })
    }

    pub fn set_rate(&self, rate: f64) -> usize {
        self.emit_transport(TransportEvent::RateChanged { rate })
    }

    /// Reports a load failure from the current audio element.
    pub fn fail_audio(&self, message: &str) -> bool {
        let sink = self.state().current_element_mut().map(|e| e.sink.clone());
        sink.is_some_and(|sink| {
            sink.emit(MediaEvent::AudioFailed {
                message: message.to_string(),
            })
        })
    }

    /// Reports a load failure from the showing subtitle track of the current engine.
    pub fn fail_subtitles(&self, message: &str) -> bool {
        let sink = {
            let mut state = self.state();
            state.current_engine_mut().and_then(|engine| {
                let id = engine.snapshot.showing_track()?.id;
                engine.track_sinks.iter().find(|s| s.origin() == id).cloned()
            })
        };
        sink.is_some_and(|sink| {
            sink.emit(MediaEvent::SubtitleFailed {
                message: message.to_string(),
            })
        })
    }

    /// Moves the current engine's position without telling anyone.
    pub fn drift_video(&self, delta_secs: f64) {
        if let Some(engine) = self.state().current_engine_mut() {
            engine.snapshot.position_secs += delta_secs;
        }
    }

    /// Moves the current audio element's position without telling anyone.
    pub fn drift_audio(&self, delta_secs: f64) {
        if let Some(element) = self.state().current_element_mut() {
            element.snapshot.position_secs += delta_secs;
        }
    }

    // =========================================================================
    // Engine / element side
    // =========================================================================

    pub(super) fn note_attempt(&self) -> u32 {
        let mut state = self.state();
        state.acquire_attempts += 1;
        state.acquire_attempts
    }

    pub(super) fn rejects_sources(&self) -> bool {
        self.state().reject_sources
    }

    pub(super) fn rejects_audio(&self) -> bool {
        self.state().reject_audio
    }

    pub(super) fn register_engine(&self, options: &EngineOptions) -> usize {
        let mut state = self.state();
        let index = state.engines.len();
        state.engines.push(EngineRecord {
            snapshot: EngineSnapshot {
                index,
                options: options.clone(),
                source: None,
                muted: false,
                paused: !options.autoplay,
                position_secs: 0.0,
                rate: rate_bounds::DEFAULT,
                tracks: Vec::new(),
                transport_listeners: 0,
                disposed: false,
            },
            track_sinks: Vec::new(),
            transport: Vec::new(),
        });
        state.live_engines += 1;
        state.peak_engines = state.peak_engines.max(state.live_engines);
        state.log(LifecycleAction::EngineAcquired { engine: index });
        index
    }

    /// Runs `f` on a live engine's snapshot. Disposed engines are left alone.
    pub(super) fn with_engine<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut EngineSnapshot) -> R,
    ) -> Option<R> {
        let mut state = self.state();
        state
            .engines
            .get_mut(index)
            .filter(|e| !e.snapshot.disposed)
            .map(|e| f(&mut e.snapshot))
    }

    pub(super) fn add_track(&self, index: usize, track: TrackSnapshot, sink: EventSink) {
        let mut state = self.state();
        let Some(engine) = state.engines.get_mut(index).filter(|e| !e.snapshot.disposed) else {
            return;
        };
        let url = track.url.clone();
        engine.snapshot.tracks.push(track);
        engine.track_sinks.push(sink);
        state.log(LifecycleAction::TrackAdded { engine: index, url });
    }

    pub(super) fn remove_track(&self, index: usize, id: HandleId) {
        let mut state = self.state();
        let Some(engine) = state.engines.get_mut(index).filter(|e| !e.snapshot.disposed) else {
            return;
        };
        let Some(position) = engine.snapshot.tracks.iter().position(|t| t.id == id) else {
            return;
        };
        let track = engine.snapshot.tracks.remove(position);
        engine.track_sinks.retain(|s| s.origin() != id);
        state.log(LifecycleAction::TrackRemoved {
            engine: index,
            url: track.url,
        });
    }

    pub(super) fn subscribe(&self, index: usize, sink: EventSink) {
        let mut state = self.state();
        if let Some(engine) = state.engines.get_mut(index).filter(|e| !e.snapshot.disposed) {
            engine.transport.push(sink);
            engine.snapshot.transport_listeners = engine.transport.len();
        }
    }

    pub(super) fn unsubscribe(&self, index: usize, id: HandleId) {
        let mut state = self.state();
        if let Some(engine) = state.engines.get_mut(index) {
            engine.transport.retain(|s| s.origin() != id);
            engine.snapshot.transport_listeners = engine.transport.len();
        }
    }

    /// Tears an engine down together with its tracks and listeners.
    pub(super) fn dispose_engine(&self, index: usize) {
        let mut state = self.state();
        let Some(engine) = state.engines.get_mut(index).filter(|e| !e.snapshot.disposed) else {
            return;
        };
        engine.snapshot.disposed = true;
        engine.snapshot.paused = true;
        engine.snapshot.tracks.clear();
        engine.snapshot.transport_listeners = 0;
        engine.track_sinks.clear();
        engine.transport.clear();
        state.live_engines -= 1;
        state.log(LifecycleAction::EngineDisposed { engine: index });
    }

    pub(super) fn register_audio(&self, url: &str, sink: EventSink) -> usize {
        let mut state = self.state();
        let index = state.elements.len();
        state.elements.push(ElementRecord {
            snapshot: AudioSnapshot {
                index,
                url: url.to_string(),
                playing: false,
                position_secs: 0.0,
                rate: rate_bounds::DEFAULT,
                play_calls: 0,
                pause_calls: 0,
                seeks: Vec::new(),
                disposed: false,
            },
            sink,
        });
        state.live_audio += 1;
        state.peak_audio = state.peak_audio.max(state.live_audio);
        state.log(LifecycleAction::AudioCreated {
            element: index,
            url: url.to_string(),
        });
        index
    }

    pub(super) fn with_audio<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut AudioSnapshot) -> R,
    ) -> Option<R> {
        let mut state = self.state();
        state
            .elements
            .get_mut(index)
            .filter(|e| !e.snapshot.disposed)
            .map(|e| f(&mut e.snapshot))
    }

    pub(super) fn dispose_audio(&self, index: usize) {
        let mut state = self.state();
        let Some(element) = state.elements.get_mut(index).filter(|e| !e.snapshot.disposed) else {
            return;
        };
        element.snapshot.disposed = true;
        element.snapshot.playing = false;
        state.live_audio -= 1;
        state.log(LifecycleAction::AudioDisposed { element: index });
    }
}

impl std::fmt::Debug for HeadlessRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("HeadlessRecorder")
            .field("live_engines", &state.live_engines)
            .field("live_audio", &state.live_audio)
            .field("entries", &state.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::event_channel;

    #[test]
    fn engine_registration_tracks_peak() {
        let recorder = HeadlessRecorder::new();
        let a = recorder.register_engine(&EngineOptions::default());
        let b = recorder.register_engine(&EngineOptions::default());
        recorder.dispose_engine(a);
        recorder.dispose_engine(a);

        assert_eq!(recorder.live_engines(), 1);
        assert_eq!(recorder.peak_engines(), 2);
        assert_eq!(recorder.current_engine().map(|e| e.index), Some(b));
    }

    #[test]
    fn entries_are_sequenced() {
        let recorder = HeadlessRecorder::new();
        let engine = recorder.register_engine(&EngineOptions::default());
        recorder.dispose_engine(engine);

        let acquired = recorder
            .seq_of(&LifecycleAction::EngineAcquired { engine })
            .unwrap();
        let disposed = recorder
            .seq_of(&LifecycleAction::EngineDisposed { engine })
            .unwrap();
        assert!(acquired < disposed);
    }

    #[test]
    fn emit_transport_reaches_subscribers_and_updates_state() {
        let recorder = HeadlessRecorder::new();
        let engine = recorder.register_engine(&EngineOptions::default());
        let (tx, mut rx) = event_channel();
        recorder.subscribe(engine, EventSink::new(HandleId::new(9), tx));

        assert_eq!(recorder.seek(12.0), 1);
        assert_eq!(recorder.current_engine().map(|e| e.position_secs), Some(12.0));
        let (origin, event) = rx.try_recv().unwrap();
        assert_eq!(origin, HandleId::new(9));
        assert_eq!(
            event,
            MediaEvent::Transport(TransportEvent::Seeked {
                position_secs: 12.0
            })
        );
    }

    #[test]
    fn dispose_clears_listeners() {
        let recorder = HeadlessRecorder::new();
        let engine = recorder.register_engine(&EngineOptions::default());
        let (tx, _rx) = event_channel();
        recorder.subscribe(engine, EventSink::new(HandleId::new(1), tx));
        assert_eq!(recorder.transport_listeners(), 1);

        recorder.dispose_engine(engine);
        assert_eq!(recorder.transport_listeners(), 0);
        assert_eq!(recorder.play(), 0);
    }
}
