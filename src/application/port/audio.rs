// SPDX-License-Identifier: MPL-2.0
//! Dubbed audio element port definition.
//!
//! A dubbed track is a follower: it never drives the video timeline, it only
//! receives the commands the synchronizer mirrors from it.

use super::events::EventSink;
use crate::domain::error::PlaybackError;

/// Port for one standalone audio element.
pub trait AudioElement: Send {
    fn play(&mut self);

    fn pause(&mut self);

    /// Jumps to an absolute position in seconds.
    fn set_current_time(&mut self, position_secs: f64);

    fn current_time(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    /// Stops playback and releases the resource. Idempotent.
    fn dispose(&mut self);
}

/// Port constructing audio elements.
pub trait AudioElementFactory: Send + Sync {
    /// Creates an element streaming from `url`.
    ///
    /// Network and decode failures occurring after construction are reported
    /// through `sink` as [`MediaEvent::AudioFailed`](super::events::MediaEvent::AudioFailed).
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Engine`] if the element cannot be constructed.
    fn create(&self, url: &str, sink: EventSink) -> Result<Box<dyn AudioElement>, PlaybackError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_element_object_safe(_: &dyn AudioElement) {}
    fn _assert_factory_object_safe(_: &dyn AudioElementFactory) {}
}
