// SPDX-License-Identifier: MPL-2.0
//! Errors reported by the playback synchronizer.

use std::fmt;

/// Which auxiliary track a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Subtitle,
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Subtitle => write!(f, "subtitle"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

/// Specific error types for playback session requests.
///
/// Selection errors are raised before any state transition; the current
/// session is left untouched. Acquisition errors end the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// No media item or no subtitle language was chosen.
    MissingSelection,

    /// The language is not in the item's snapshotted language set.
    InvalidSelection { kind: TrackKind, language: String },

    /// The string is not a usable language tag.
    InvalidLanguageCode(String),

    /// The video engine did not become available within the bounded wait.
    EngineUnavailable { attempts: u32 },

    /// The load was superseded or stopped before the engine was attached.
    Cancelled,

    /// A language switch was requested without a live session.
    NotReady,

    /// The engine or an element refused an operation.
    Engine(String),
}

impl PlaybackError {
    /// Returns true for errors that leave the current session untouched.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingSelection
                | Self::InvalidSelection { .. }
                | Self::InvalidLanguageCode(_)
                | Self::NotReady
        )
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::MissingSelection => {
                write!(f, "Please select a video and subtitle language")
            }
            PlaybackError::InvalidSelection { kind, language } => {
                write!(f, "No {} track available for language '{}'", kind, language)
            }
            PlaybackError::InvalidLanguageCode(code) => {
                write!(f, "Invalid language code: '{}'", code)
            }
            PlaybackError::EngineUnavailable { attempts } => write!(
                f,
                "Player failed to initialize (engine unavailable after {} attempts)",
                attempts
            ),
            PlaybackError::Cancelled => write!(f, "Load cancelled"),
            PlaybackError::NotReady => write!(f, "No active playback session"),
            PlaybackError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for PlaybackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_selection_names_track_and_language() {
        let err = PlaybackError::InvalidSelection {
            kind: TrackKind::Subtitle,
            language: "ko".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "No subtitle track available for language 'ko'"
        );
    }

    #[test]
    fn display_engine_unavailable_mentions_initialization() {
        let err = PlaybackError::EngineUnavailable { attempts: 50 };
        assert!(format!("{}", err).contains("failed to initialize"));
        assert!(format!("{}", err).contains("50"));
    }

    #[test]
    fn rejections_are_classified() {
        assert!(PlaybackError::MissingSelection.is_rejection());
        assert!(PlaybackError::NotReady.is_rejection());
        assert!(!PlaybackError::Cancelled.is_rejection());
        assert!(!PlaybackError::EngineUnavailable { attempts: 1 }.is_rejection());
    }
}
