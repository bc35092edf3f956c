// SPDX-License-Identifier: MPL-2.0
//! Language codes and audio selections.
//!
//! Language codes are kept in the spelling the backend uses (`zh-TW`, `ja`, ...)
//! because they are interpolated verbatim into resource URLs. They are
//! validated as BCP-47 identifiers on construction.

use crate::domain::error::PlaybackError;
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// Sentinel selecting the video's embedded audio track.
pub const ORIGINAL_AUDIO: &str = "original";

/// A validated language tag, e.g. `en` or `zh-TW`.
///
/// # Example
///
/// ```
/// use polyglot_player::domain::media::LanguageCode;
///
/// let code = LanguageCode::new("zh-TW").unwrap();
/// assert_eq!(code.as_str(), "zh-TW");
/// assert!(LanguageCode::new("not a language").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parses and validates a language tag.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidLanguageCode`] if the tag is empty or
    /// not a valid language identifier.
    pub fn new(code: &str) -> Result<Self, PlaybackError> {
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ORIGINAL_AUDIO) {
            return Err(PlaybackError::InvalidLanguageCode(code.to_string()));
        }
        trimmed
            .parse::<LanguageIdentifier>()
            .map_err(|_| PlaybackError::InvalidLanguageCode(code.to_string()))?;
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the tag as written by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parsed identifier, used for locale matching.
    #[must_use]
    pub fn identifier(&self) -> Option<LanguageIdentifier> {
        self.0.parse().ok()
    }

    /// Returns true if both codes share the same primary language subtag.
    #[must_use]
    pub fn same_language(&self, other: &LanguageIdentifier) -> bool {
        self.identifier()
            .is_some_and(|id| id.language == other.language)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Which audio the session plays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AudioSelection {
    /// The video's own embedded audio, unmuted.
    #[default]
    Original,
    /// A separately fetched dubbed track; the video is muted.
    Dubbed(LanguageCode),
}

impl AudioSelection {
    /// Returns the dubbed language, if any.
    #[must_use]
    pub fn language(&self) -> Option<&LanguageCode> {
        match self {
            Self::Original => None,
            Self::Dubbed(code) => Some(code),
        }
    }

    /// Returns true for [`AudioSelection::Original`].
    #[must_use]
    pub fn is_original(&self) -> bool {
        matches!(self, Self::Original)
    }
}

impl fmt::Display for AudioSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str(ORIGINAL_AUDIO),
            Self::Dubbed(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for AudioSelection {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ORIGINAL_AUDIO) {
            return Ok(Self::Original);
        }
        LanguageCode::new(trimmed).map(Self::Dubbed)
    }
}

/// Returns the label shown for a language, falling back to the code itself.
#[must_use]
pub fn display_name(code: &LanguageCode) -> &str {
    match code.as_str() {
        "en" => "English",
        "zh-TW" => "繁體中文",
        "zh-CN" => "简体中文",
        "es" => "Español",
        "ja" => "日本語",
        "ko" => "한국어",
        other => other,
    }
}
