// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and media fixtures.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use crate::domain::media::{LanguageCode, MediaId, MediaItem};

/// Parses a language code known to be valid.
pub fn lang(code: &str) -> LanguageCode {
    LanguageCode::new(code).expect("fixture language code")
}

/// The catalog entry used across unit tests: id 7, subtitles in English and
/// Japanese, dubbed audio in Japanese.
pub fn airway_item() -> MediaItem {
    MediaItem::new(MediaId(7), "Airway management", "uploads/airway.mp4")
        .with_subtitle_languages(vec![lang("en"), lang("ja")])
        .with_audio_languages(vec![lang("ja")])
        .with_duration(125.0)
}
