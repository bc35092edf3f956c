// SPDX-License-Identifier: MPL-2.0
//! Video engine port definition.
//!
//! This module defines the [`VideoEngine`] trait the synchronizer drives and
//! the [`EngineProvider`] through which an engine instance is obtained.
//!
//! # Design Notes
//!
//! - Engine libraries typically load asynchronously and announce themselves
//!   in ambient global state. The provider hides that: `try_acquire` is a
//!   non-blocking probe the synchronizer polls with a bounded budget.
//! - Events flow back through [`EventSink`]s; the engine keeps the sink and
//!   forgets it on `unsubscribe_transport` / `remove_remote_text_track`.
//! - `dispose` must be idempotent.

use super::events::{EventSink, HandleId};
use crate::domain::error::PlaybackError;
use crate::domain::media::LanguageCode;

/// How eagerly the engine should fetch media data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preload {
    None,
    Metadata,
    #[default]
    Auto,
}

/// Construction options passed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub controls: bool,
    pub autoplay: bool,
    pub preload: Preload,
    /// Scale to the container width.
    pub fluid: bool,
    /// Rates offered in the engine's rate menu.
    pub playback_rates: Vec<f64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            controls: true,
            autoplay: false,
            preload: Preload::Auto,
            fluid: true,
            playback_rates: crate::domain::video::rate_bounds::PRESETS.to_vec(),
        }
    }
}

/// Primary video source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub url: String,
    pub mime_type: String,
}

impl MediaSource {
    #[must_use]
    pub fn mp4(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: "video/mp4".to_string(),
        }
    }
}

/// Display mode of a text track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// A subtitle resource attached to the engine at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTextTrack {
    pub url: String,
    pub language: LanguageCode,
    pub label: String,
    /// Marks the track as the default one for its kind.
    pub default: bool,
}

/// Port for one video engine instance.
///
/// # Thread Safety
///
/// Implementations must be `Send` so a freshly acquired engine can cross
/// the acquisition future's boundary. They are not required to be `Sync`.
pub trait VideoEngine: Send {
    /// Points the engine at the primary video.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Engine`] if the source is rejected.
    fn set_source(&mut self, source: &MediaSource) -> Result<(), PlaybackError>;

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    fn is_paused(&self) -> bool;

    /// Current position of the video timeline in seconds.
    fn current_time(&self) -> f64;

    fn playback_rate(&self) -> f64;

    /// Registers a remote text track keyed by `sink.origin()`.
    ///
    /// Load failures are reported later through the sink as
    /// [`MediaEvent::SubtitleFailed`](super::events::MediaEvent::SubtitleFailed).
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Engine`] if the engine refuses the track.
    fn add_remote_text_track(
        &mut self,
        track: &RemoteTextTrack,
        sink: EventSink,
    ) -> Result<(), PlaybackError>;

    /// Detaches a text track. Unknown ids are ignored.
    fn remove_remote_text_track(&mut self, id: HandleId);

    /// # Errors
    ///
    /// Returns [`PlaybackError::Engine`] if no track is registered under `id`.
    fn set_text_track_mode(&mut self, id: HandleId, mode: TrackMode) -> Result<(), PlaybackError>;

    /// Starts delivering transport events to `sink`, keyed by `sink.origin()`.
    fn subscribe_transport(&mut self, sink: EventSink);

    /// Stops delivering transport events for `id`. Unknown ids are ignored.
    fn unsubscribe_transport(&mut self, id: HandleId);

    /// Releases decoder and network resources. Idempotent.
    fn dispose(&mut self);
}

/// Port giving non-blocking access to an asynchronously loading engine.
pub trait EngineProvider: Send + Sync {
    /// Returns a new engine if the engine library is available now.
    fn try_acquire(&self, options: &EngineOptions) -> Option<Box<dyn VideoEngine>>;
}
