// SPDX-License-Identifier: MPL-2.0
//! URL construction for every backend resource.
//!
//! The synchronizer treats these as opaque URLs parameterized by
//! `(media id, language)`; it never fetches or parses them itself.

use crate::domain::media::{LanguageCode, MediaId, MediaItem};

/// Base URLs of the media backend.
///
/// # Example
///
/// ```
/// use polyglot_player::catalog::MediaEndpoints;
/// use polyglot_player::domain::media::{LanguageCode, MediaId};
///
/// let endpoints = MediaEndpoints::new("http://localhost:8080/");
/// let ja = LanguageCode::new("ja").unwrap();
/// assert_eq!(
///     endpoints.dubbed_audio(MediaId(7), &ja),
///     "http://localhost:8080/api/audio/videos/7/audio/ja"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEndpoints {
    server: String,
}

impl MediaEndpoints {
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            server: server_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Catalog listing with subtitle metadata.
    #[must_use]
    pub fn catalog(&self) -> String {
        format!("{}/api/subtitles/videos", self.server)
    }

    /// Per-video dubbed audio language listing.
    #[must_use]
    pub fn audio_catalog(&self) -> String {
        format!("{}/api/audio/videos", self.server)
    }

    /// Raw video stream, addressed by file name.
    #[must_use]
    pub fn video(&self, item: &MediaItem) -> String {
        format!("{}/videos/{}", self.server, item.file_name())
    }

    /// WebVTT subtitle track.
    #[must_use]
    pub fn subtitles(&self, id: MediaId, language: &LanguageCode) -> String {
        format!(
            "{}/api/subtitles/videos/{}/subtitles/{}.vtt",
            self.server, id, language
        )
    }

    /// Dubbed audio stream.
    #[must_use]
    pub fn dubbed_audio(&self, id: MediaId, language: &LanguageCode) -> String {
        format!("{}/api/audio/videos/{}/audio/{}", self.server, id, language)
    }
}

impl Default for MediaEndpoints {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SERVER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[test]
    fn urls_are_built_from_server_root() {
        let endpoints = MediaEndpoints::new("http://media:8080");
        assert_eq!(endpoints.catalog(), "http://media:8080/api/subtitles/videos");
        assert_eq!(endpoints.audio_catalog(), "http://media:8080/api/audio/videos");
        assert_eq!(
            endpoints.subtitles(MediaId(7), &code("zh-TW")),
            "http://media:8080/api/subtitles/videos/7/subtitles/zh-TW.vtt"
        );
    }

    #[test]
    fn video_url_uses_file_name_only() {
        let endpoints = MediaEndpoints::default();
        let item = MediaItem::new(MediaId(3), "t", "/srv/uploads/block.mp4");
        assert_eq!(endpoints.video(&item), "http://localhost:8080/videos/block.mp4");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(MediaEndpoints::new("http://a//").server(), "http://a");
    }
}
