// SPDX-License-Identifier: MPL-2.0
//! Multi-track playback synchronizer for PolyglotPlayer.
//!
//! This module keeps one video engine, at most one dubbed audio follower and
//! at most one remote subtitle track consistent while the user switches
//! videos and languages. Engine availability is awaited with a bounded,
//! cancellable Tokio poll; engine callbacks arrive over a channel and are
//! applied on the host's thread.

mod acquire;
mod handles;
mod session;
pub mod sync;
mod synchronizer;

pub use acquire::{acquire_engine, AcquirePolicy, CancelHandle};
pub use handles::{DubbedAudio, SubtitleTrack, VideoHandle};
pub use session::{Degradation, PlaybackSession};
pub use sync::{FollowerCommand, SYNC_TOLERANCE_SECS};
pub use synchronizer::{
    LoadOutcome, LoadRequest, PendingLoad, PlaybackNotice, PlaybackSynchronizer,
};
