// SPDX-License-Identifier: MPL-2.0
//! In-process video engine and its provider.

use super::recorder::{EngineSnapshot, HeadlessRecorder, TrackSnapshot};
use crate::application::port::{
    EngineOptions, EngineProvider, EventSink, HandleId, MediaSource, RemoteTextTrack, TrackMode,
    VideoEngine,
};
use crate::domain::error::PlaybackError;
use crate::domain::video::rate_bounds;

/// When a [`HeadlessProvider`] starts handing out engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// Every attempt succeeds.
    #[default]
    Ready,
    /// The first `n` attempts (counted on the recorder) miss.
    AfterPolls(u32),
    /// No attempt ever succeeds.
    Never,
}

/// Engine provider backed by the shared recorder.
#[derive(Debug, Clone)]
pub struct HeadlessProvider {
    recorder: HeadlessRecorder,
    availability: Availability,
}

impl HeadlessProvider {
    #[must_use]
    pub fn new(recorder: HeadlessRecorder, availability: Availability) -> Self {
        Self {
            recorder,
            availability,
        }
    }
}

impl EngineProvider for HeadlessProvider {
    fn try_acquire(&self, options: &EngineOptions) -> Option<Box<dyn VideoEngine>> {
        let attempt = self.recorder.note_attempt();
        let available = match self.availability {
            Availability::Ready => true,
            Availability::AfterPolls(misses) => attempt > misses,
            Availability::Never => false,
        };
        if !available {
            return None;
        }

        let index = self.recorder.register_engine(options);
        Some(Box::new(HeadlessEngine {
            recorder: self.recorder.clone(),
            index,
            disposed: false,
        }))
    }
}

/// Video engine with a scripted timeline.
///
/// Position, rate and pause state only change through the recorder's
/// transport controls; nothing advances on its own.
#[derive(Debug)]
pub struct HeadlessEngine {
    recorder: HeadlessRecorder,
    index: usize,
    disposed: bool,
}

impl HeadlessEngine {
    fn with_snapshot<R: Default>(&self, f: impl FnOnce(&mut EngineSnapshot) -> R) -> R {
        self.recorder.with_engine(self.index, f).unwrap_or_default()
    }
}

impl VideoEngine for HeadlessEngine {
    fn set_source(&mut self, source: &MediaSource) -> Result<(), PlaybackError> {
        if self.recorder.rejects_sources() {
            return Err(PlaybackError::Engine(format!(
                "unsupported source {}",
                source.url
            )));
        }
        self.recorder
            .with_engine(self.index, |e| e.source = Some(source.clone()))
            .ok_or_else(|| PlaybackError::Engine("engine disposed".to_string()))
    }

    fn set_muted(&mut self, muted: bool) {
        self.with_snapshot(|e| e.muted = muted);
    }

    fn is_muted(&self) -> bool {
        self.with_snapshot(|e| e.muted)
    }

    fn is_paused(&self) -> bool {
        self.recorder
            .with_engine(self.index, |e| e.paused)
            .unwrap_or(true)
    }

    fn current_time(&self) -> f64 {
        self.with_snapshot(|e| e.position_secs)
    }

    fn playback_rate(&self) -> f64 {
        self.recorder
            .with_engine(self.index, |e| e.rate)
            .unwrap_or(rate_bounds::DEFAULT)
    }

    fn add_remote_text_track(
        &mut self,
        track: &RemoteTextTrack,
        sink: EventSink,
    ) -> Result<(), PlaybackError> {
        if self.disposed {
            return Err(PlaybackError::Engine("engine disposed".to_string()));
        }
        let snapshot = TrackSnapshot {
            id: sink.origin(),
            url: track.url.clone(),
            language: track.language.clone(),
            label: track.label.clone(),
            default: track.default,
            mode: TrackMode::Disabled,
        };
        self.recorder.add_track(self.index, snapshot, sink);
        Ok(())
    }

    fn remove_remote_text_track(&mut self, id: HandleId) {
        self.recorder.remove_track(self.index, id);
    }

    fn set_text_track_mode(&mut self, id: HandleId, mode: TrackMode) -> Result<(), PlaybackError> {
        let found = self.with_snapshot(|e| match e.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.mode = mode;
                true
            }
            None => false,
        });
        if found {
            Ok(())
        } else {
            Err(PlaybackError::Engine(format!("no text track {id}")))
        }
    }

    fn subscribe_transport(&mut self, sink: EventSink) {
        self.recorder.subscribe(self.index, sink);
    }

    fn unsubscribe_transport(&mut self, id: HandleId) {
        self.recorder.unsubscribe(self.index, id);
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.recorder.dispose_engine(self.index);
        }
    }
}

impl Drop for HeadlessEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
