// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! This module contains the catalog snapshot of a video and the language
//! selections a playback session can be asked for.

pub mod language;
pub mod types;

// Re-export commonly used types
pub use language::{display_name, AudioSelection, LanguageCode, ORIGINAL_AUDIO};
pub use types::{MediaId, MediaItem};
