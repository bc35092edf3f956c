// SPDX-License-Identifier: MPL-2.0
//! Headless media backend.
//!
//! Implements every engine port in-process, with no decoding or output.
//! The command-line dry run plays sessions against it, and tests use it as
//! an instrumented engine: the shared [`HeadlessRecorder`] counts live
//! handles, keeps a sequenced lifecycle record and lets the caller drive
//! the video timeline or inject element failures.
//!
//! # Example
//!
//! ```
//! use polyglot_player::infrastructure::headless::{Availability, HeadlessBackend};
//!
//! let backend = HeadlessBackend::with_availability(Availability::AfterPolls(3));
//! assert_eq!(backend.recorder().live_engines(), 0);
//! ```

mod audio;
mod engine;
mod recorder;

pub use audio::{HeadlessAudio, HeadlessAudioFactory};
pub use engine::{Availability, HeadlessEngine, HeadlessProvider};
pub use recorder::{
    AudioSnapshot, EngineSnapshot, HeadlessRecorder, LifecycleAction, LifecycleEntry,
    TrackSnapshot,
};

use crate::application::port::{AudioElementFactory, EngineProvider};
use std::sync::Arc;

/// Provider and audio factory sharing one recorder.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    recorder: HeadlessRecorder,
    provider: Arc<HeadlessProvider>,
    audio_factory: Arc<HeadlessAudioFactory>,
}

impl HeadlessBackend {
    /// Backend whose engine is available on the first poll.
    #[must_use]
    pub fn ready() -> Self {
        Self::with_availability(Availability::Ready)
    }

    #[must_use]
    pub fn with_availability(availability: Availability) -> Self {
        let recorder = HeadlessRecorder::new();
        Self {
            provider: Arc::new(HeadlessProvider::new(recorder.clone(), availability)),
            audio_factory: Arc::new(HeadlessAudioFactory::new(recorder.clone())),
            recorder,
        }
    }

    #[must_use]
    pub fn recorder(&self) -> &HeadlessRecorder {
        &self.recorder
    }

    #[must_use]
    pub fn provider(&self) -> Arc<dyn EngineProvider> {
        self.provider.clone()
    }

    #[must_use]
    pub fn audio_factory(&self) -> Arc<dyn AudioElementFactory> {
        self.audio_factory.clone()
    }
}
