// SPDX-License-Identifier: MPL-2.0
//! Owning handles for the resources of a playback session.
//!
//! Each handle has a single `dispose()` entry point that is idempotent and
//! also runs on drop, so an engine or element is released exactly once no
//! matter which exit path the session takes.

use crate::application::port::{AudioElement, HandleId, TrackMode, VideoEngine};
use crate::domain::media::LanguageCode;
use std::fmt;

/// Exclusive owner of the primary video engine instance.
pub struct VideoHandle {
    id: HandleId,
    engine: Option<Box<dyn VideoEngine>>,
}

impl VideoHandle {
    pub(crate) fn new(id: HandleId, engine: Box<dyn VideoEngine>) -> Self {
        Self {
            id,
            engine: Some(engine),
        }
    }

    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.engine.is_some()
    }

    pub(crate) fn engine(&self) -> Option<&(dyn VideoEngine + 'static)> {
        self.engine.as_deref()
    }

    pub(crate) fn engine_mut(&mut self) -> Option<&mut (dyn VideoEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    /// Releases the engine. Returns `true` only on the call that released it.
    pub fn dispose(&mut self) -> bool {
        match self.engine.take() {
            Some(mut engine) => {
                engine.dispose();
                true
            }
            None => false,
        }
    }
}

impl Drop for VideoHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for VideoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoHandle")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Exclusive owner of the dubbed audio follower element.
///
/// The transport subscription on the video engine is keyed by this handle's
/// id; the session removes it before disposing the element.
pub struct DubbedAudio {
    id: HandleId,
    language: LanguageCode,
    source_url: String,
    element: Option<Box<dyn AudioElement>>,
}

impl DubbedAudio {
    pub(crate) fn new(
        id: HandleId,
        language: LanguageCode,
        source_url: String,
        element: Box<dyn AudioElement>,
    ) -> Self {
        Self {
            id,
            language,
            source_url,
            element: Some(element),
        }
    }

    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.element.is_some()
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut (dyn AudioElement + 'static)> {
        self.element.as_deref_mut()
    }

    /// Stops and releases the element. Returns `true` only on the call that
    /// released it.
    pub fn dispose(&mut self) -> bool {
        match self.element.take() {
            Some(mut element) => {
                element.pause();
                element.dispose();
                true
            }
            None => false,
        }
    }
}

impl Drop for DubbedAudio {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for DubbedAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DubbedAudio")
            .field("id", &self.id)
            .field("language", &self.language)
            .field("source_url", &self.source_url)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Registration of a remote subtitle track on the video engine.
///
/// The track itself lives inside the engine; removing it needs the engine,
/// so release goes through the owning session.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    id: HandleId,
    language: LanguageCode,
    source_url: String,
    mode: TrackMode,
}

impl SubtitleTrack {
    pub(crate) fn new(id: HandleId, language: LanguageCode, source_url: String) -> Self {
        Self {
            id,
            language,
            source_url,
            mode: TrackMode::Disabled,
        }
    }

    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    #[must_use]
    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: TrackMode) {
        self.mode = mode;
    }
}
