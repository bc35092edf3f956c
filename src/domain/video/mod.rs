// SPDX-License-Identifier: MPL-2.0
//! Video playback domain types.
//!
//! This module contains playback value objects and the session state enum,
//! independent of any engine or infrastructure concerns.

pub mod newtypes;
pub mod playback;

// Re-export commonly used types
pub use newtypes::{rate_bounds, PlaybackRate};
pub use playback::{SessionId, SessionState};
