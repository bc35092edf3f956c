// SPDX-License-Identifier: MPL-2.0
//! Catalog snapshot of an uploaded video.

use super::language::{AudioSelection, LanguageCode};
use std::fmt;

/// Identifier of a media item in the backend catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub u64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One uploaded video and the language variants available for it.
///
/// The language sets are a snapshot taken when the catalog was fetched;
/// selections are validated against this snapshot, never against a live set.
///
/// # Example
///
/// ```
/// use polyglot_player::domain::media::{AudioSelection, LanguageCode, MediaId, MediaItem};
///
/// let item = MediaItem::new(MediaId(7), "Airway basics", "uploads/airway.mp4")
///     .with_subtitle_languages(vec![LanguageCode::new("en").unwrap()])
///     .with_audio_languages(vec![LanguageCode::new("ja").unwrap()]);
///
/// assert_eq!(item.file_name(), "airway.mp4");
/// assert!(item.supports_audio(&AudioSelection::Original));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: MediaId,
    pub title: String,
    /// Duration in seconds, when the backend knows it.
    pub duration_secs: Option<f64>,
    /// Server-side path of the video file.
    pub source_path: String,
    /// Language spoken in the embedded audio track.
    pub original_language: Option<LanguageCode>,
    pub subtitle_languages: Vec<LanguageCode>,
    pub audio_languages: Vec<LanguageCode>,
    /// Number of subtitle segments in the original language.
    pub subtitle_count: u32,
}

impl MediaItem {
    /// Creates an item with no language variants.
    #[must_use]
    pub fn new(id: MediaId, title: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            duration_secs: None,
            source_path: source_path.into(),
            original_language: None,
            subtitle_languages: Vec::new(),
            audio_languages: Vec::new(),
            subtitle_count: 0,
        }
    }

    #[must_use]
    pub fn with_subtitle_languages(mut self, languages: Vec<LanguageCode>) -> Self {
        self.subtitle_languages = languages;
        self
    }

    #[must_use]
    pub fn with_audio_languages(mut self, languages: Vec<LanguageCode>) -> Self {
        self.audio_languages = languages;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Returns the last segment of the source path.
    ///
    /// The video stream is served by file name, not by id.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.source_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.source_path)
    }

    /// Returns true if a subtitle track exists for `language`.
    #[must_use]
    pub fn supports_subtitle(&self, language: &LanguageCode) -> bool {
        self.subtitle_languages.contains(language)
    }

    /// Returns true if `selection` can be played. The original audio always can.
    #[must_use]
    pub fn supports_audio(&self, selection: &AudioSelection) -> bool {
        match selection {
            AudioSelection::Original => true,
            AudioSelection::Dubbed(language) => self.audio_languages.contains(language),
        }
    }

    /// Picks the initial subtitle language: `preferred` when offered, else the first one.
    #[must_use]
    pub fn default_subtitle_language(
        &self,
        preferred: Option<&LanguageCode>,
    ) -> Option<LanguageCode> {
        preferred
            .filter(|code| self.supports_subtitle(code))
            .or_else(|| self.subtitle_languages.first())
            .cloned()
    }

    /// Formats the duration as `"N/A"`, `"45s"` or `"2m 5s"`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn formatted_duration(&self) -> String {
        match self.duration_secs {
            Some(secs) if secs > 0.0 && secs.is_finite() => {
                let total = secs.floor() as u64;
                let (mins, secs) = (total / 60, total % 60);
                if mins == 0 {
                    format!("{secs}s")
                } else {
                    format!("{mins}m {secs}s")
                }
            }
            _ => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    fn sample() -> MediaItem {
        MediaItem::new(MediaId(7), "Intubation", "/data/uploads/intubation.mp4")
            .with_subtitle_languages(vec![code("en"), code("ja")])
            .with_audio_languages(vec![code("ja")])
    }

    #[test]
    fn file_name_takes_last_segment() {
        assert_eq!(sample().file_name(), "intubation.mp4");
        let bare = MediaItem::new(MediaId(1), "t", "clip.mp4");
        assert_eq!(bare.file_name(), "clip.mp4");
        let windows = MediaItem::new(MediaId(1), "t", r"C:\videos\clip.mp4");
        assert_eq!(windows.file_name(), "clip.mp4");
    }

    #[test]
    fn supports_checks_snapshot() {
        let item = sample();
        assert!(item.supports_subtitle(&code("ja")));
        assert!(!item.supports_subtitle(&code("ko")));
        assert!(item.supports_audio(&AudioSelection::Original));
        assert!(item.supports_audio(&AudioSelection::Dubbed(code("ja"))));
        assert!(!item.supports_audio(&AudioSelection::Dubbed(code("en"))));
    }

    #[test]
    fn default_subtitle_prefers_offered_language() {
        let item = sample();
        assert_eq!(item.default_subtitle_language(Some(&code("ja"))), Some(code("ja")));
        assert_eq!(item.default_subtitle_language(Some(&code("ko"))), Some(code("en")));
        assert_eq!(item.default_subtitle_language(None), Some(code("en")));

        let empty = MediaItem::new(MediaId(2), "t", "a.mp4");
        assert_eq!(empty.default_subtitle_language(None), None);
    }

    #[test]
    fn formatted_duration_variants() {
        let item = sample();
        assert_eq!(item.formatted_duration(), "N/A");
        assert_eq!(item.clone().with_duration(0.0).formatted_duration(), "N/A");
        assert_eq!(item.clone().with_duration(45.9).formatted_duration(), "45s");
        assert_eq!(item.with_duration(125.0).formatted_duration(), "2m 5s");
    }
}
