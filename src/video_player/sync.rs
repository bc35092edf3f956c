// SPDX-License-Identifier: MPL-2.0
//! Transport mirroring from the video timeline onto the dubbed audio follower.
//!
//! The video engine is the master clock. Its transport events are translated
//! into follower commands; nothing flows in the other direction.
//!
//! ```text
//! ┌─────────────┐  play/pause/seeked/rate  ┌──────────────┐
//! │ VideoEngine │─────────────────────────▶│ AudioElement │
//! └─────────────┘        (master)          └──────────────┘
//!                                              (follower)
//! ```

use crate::application::port::{AudioElement, TransportEvent, VideoEngine};
use crate::domain::video::PlaybackRate;

/// Drift between video and follower, in seconds, tolerated before a resync.
pub const SYNC_TOLERANCE_SECS: f64 = 0.05; // 50ms

/// What the follower must do in response to a transport event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowerCommand {
    Play,
    Pause,
    /// Absolute jump to the video's position.
    SeekTo(f64),
    SetRate(PlaybackRate),
}

/// Translates a video transport event into the follower command that mirrors it.
#[must_use]
pub fn mirror(event: TransportEvent) -> FollowerCommand {
    match event {
        TransportEvent::Play => FollowerCommand::Play,
        TransportEvent::Pause => FollowerCommand::Pause,
        TransportEvent::Seeked { position_secs } => {
            FollowerCommand::SeekTo(position_secs.max(0.0))
        }
        TransportEvent::RateChanged { rate } => FollowerCommand::SetRate(PlaybackRate::new(rate)),
    }
}

/// Replaces the position a seek reports with the video's current one.
///
/// The engine is the master clock; the payload may be stale by the time the
/// event is applied.
#[must_use]
pub fn at_video_position(event: TransportEvent, video: &dyn VideoEngine) -> TransportEvent {
    match event {
        TransportEvent::Seeked { .. } => TransportEvent::Seeked {
            position_secs: video.current_time(),
        },
        other => other,
    }
}

/// Applies a command to the follower element.
pub fn apply(command: FollowerCommand, follower: &mut dyn AudioElement) {
    match command {
        FollowerCommand::Play => follower.play(),
        FollowerCommand::Pause => follower.pause(),
        FollowerCommand::SeekTo(position) => follower.set_current_time(position),
        FollowerCommand::SetRate(rate) => follower.set_playback_rate(rate.value()),
    }
}

/// Brings a freshly attached follower in line with the video: same position,
/// same rate, and playing if the video is playing.
pub fn align_follower(video: &dyn VideoEngine, follower: &mut dyn AudioElement) {
    follower.set_current_time(video.current_time().max(0.0));
    follower.set_playback_rate(PlaybackRate::new(video.playback_rate()).value());
    if video.is_paused() {
        follower.pause();
    } else {
        follower.play();
    }
}

/// Returns true when the follower drifted further than [`SYNC_TOLERANCE_SECS`].
#[must_use]
pub fn drift_exceeds_tolerance(video_secs: f64, follower_secs: f64) -> bool {
    (video_secs - follower_secs).abs() > SYNC_TOLERANCE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::{EngineOptions, EngineProvider};
    use crate::infrastructure::headless::{Availability, HeadlessProvider, HeadlessRecorder};
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn play_and_pause_mirror_directly() {
        assert_eq!(mirror(TransportEvent::Play), FollowerCommand::Play);
        assert_eq!(mirror(TransportEvent::Pause), FollowerCommand::Pause);
    }

    #[test]
    fn seek_mirrors_absolute_position() {
        let command = mirror(TransportEvent::Seeked {
            position_secs: 42.5,
        });
        match command {
            FollowerCommand::SeekTo(position) => assert_abs_diff_eq!(position, 42.5),
            other => panic!("Expected SeekTo, got {other:?}"),
        }
    }

    #[test]
    fn negative_seek_is_clamped_to_start() {
        assert_eq!(
            mirror(TransportEvent::Seeked {
                position_secs: -3.0
            }),
            FollowerCommand::SeekTo(0.0)
        );
    }

    #[test]
    fn rate_change_is_clamped() {
        match mirror(TransportEvent::RateChanged { rate: 1.5 }) {
            FollowerCommand::SetRate(rate) => assert_abs_diff_eq!(rate.value(), 1.5),
            other => panic!("Expected SetRate, got {other:?}"),
        }
        match mirror(TransportEvent::RateChanged { rate: f64::NAN }) {
            FollowerCommand::SetRate(rate) => assert!(rate.is_normal()),
            other => panic!("Expected SetRate, got {other:?}"),
        }
    }

    #[test]
    fn seek_takes_position_from_the_video() {
        let recorder = HeadlessRecorder::new();
        let video = HeadlessProvider::new(recorder.clone(), Availability::Ready)
            .try_acquire(&EngineOptions::default())
            .unwrap();
        recorder.drift_video(12.5);

        let settled = at_video_position(TransportEvent::Seeked { position_secs: 0.0 }, &*video);
        match mirror(settled) {
            FollowerCommand::SeekTo(position) => assert_abs_diff_eq!(position, 12.5),
            other => panic!("Expected SeekTo, got {other:?}"),
        }
        assert_eq!(
            at_video_position(TransportEvent::Play, &*video),
            TransportEvent::Play
        );
    }

    #[test]
    fn drift_tolerance_is_50ms() {
        assert!(!drift_exceeds_tolerance(10.0, 10.04));
        assert!(!drift_exceeds_tolerance(10.04, 10.0));
        assert!(drift_exceeds_tolerance(10.0, 10.2));
        assert!(drift_exceeds_tolerance(10.2, 10.0));
    }
}
