// SPDX-License-Identifier: MPL-2.0
//! Wire records of the catalog endpoints and their conversion to [`MediaItem`].

use crate::domain::media::{LanguageCode, MediaId, MediaItem};
use serde::Deserialize;
use std::collections::HashMap;

/// Entry of `GET /api/subtitles/videos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoRecord {
    pub id: u64,
    pub title: String,
    pub file_path: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub available_languages: Vec<String>,
    #[serde(default)]
    pub subtitle_count: u32,
}

/// Entry of `GET /api/audio/videos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioRecord {
    pub id: u64,
    #[serde(default)]
    pub available_audio_languages: Vec<String>,
}

/// Parses language codes, dropping (and logging) the ones that do not validate.
fn parse_languages(id: u64, raw: &[String]) -> Vec<LanguageCode> {
    let mut codes: Vec<LanguageCode> = Vec::with_capacity(raw.len());
    for value in raw {
        match LanguageCode::new(value) {
            Ok(code) if !codes.contains(&code) => codes.push(code),
            Ok(_) => {}
            Err(_) => tracing::warn!(video = id, code = %value, "skipping invalid language code"),
        }
    }
    codes
}

/// Merges the video listing with the dubbed-audio listing.
///
/// Catalog order is preserved. Videos missing from the audio listing offer
/// no dubbed audio.
#[must_use]
pub fn merge_catalog(videos: Vec<VideoRecord>, audio: &[AudioRecord]) -> Vec<MediaItem> {
    let audio_by_id: HashMap<u64, &AudioRecord> = audio.iter().map(|a| (a.id, a)).collect();

    videos
        .into_iter()
        .map(|video| {
            let audio_languages = audio_by_id
                .get(&video.id)
                .map(|a| parse_languages(video.id, &a.available_audio_languages))
                .unwrap_or_default();

            MediaItem {
                id: MediaId(video.id),
                subtitle_languages: parse_languages(video.id, &video.available_languages),
                audio_languages,
                original_language: video
                    .language
                    .as_deref()
                    .and_then(|code| LanguageCode::new(code).ok()),
                duration_secs: video.duration,
                subtitle_count: video.subtitle_count,
                title: video.title,
                source_path: video.file_path,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEOS_JSON: &str = r#"[
        {"id": 7, "title": "Airway", "file_path": "uploads/airway.mp4", "duration": 125.4,
         "language": "en", "available_languages": ["en", "ja", "zh-TW"], "subtitle_count": 42},
        {"id": 9, "title": "Spinal", "file_path": "uploads/spinal.mp4", "duration": null,
         "language": "en", "available_languages": ["en", "??", "en"], "subtitle_count": 3}
    ]"#;

    const AUDIO_JSON: &str = r#"[
        {"id": 7, "available_audio_languages": ["ja", "es"]},
        {"id": 11, "available_audio_languages": ["ko"]}
    ]"#;

    #[test]
    fn records_decode_from_backend_json() {
        let videos: Vec<VideoRecord> = serde_json::from_str(VIDEOS_JSON).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[1].duration, None);
        let audio: Vec<AudioRecord> = serde_json::from_str(AUDIO_JSON).unwrap();
        assert_eq!(audio[0].available_audio_languages, vec!["ja", "es"]);
    }

    #[test]
    fn merge_attaches_audio_languages_by_id() {
        let videos: Vec<VideoRecord> = serde_json::from_str(VIDEOS_JSON).unwrap();
        let audio: Vec<AudioRecord> = serde_json::from_str(AUDIO_JSON).unwrap();
        let items = merge_catalog(videos, &audio);

        assert_eq!(items[0].id, MediaId(7));
        let dubbed: Vec<&str> = items[0].audio_languages.iter().map(LanguageCode::as_str).collect();
        assert_eq!(dubbed, vec!["ja", "es"]);
        assert_eq!(items[0].subtitle_count, 42);
        assert!(items[1].audio_languages.is_empty());
    }

    #[test]
    fn merge_drops_invalid_and_duplicate_codes() {
        let videos: Vec<VideoRecord> = serde_json::from_str(VIDEOS_JSON).unwrap();
        let items = merge_catalog(videos, &[]);
        let subs: Vec<&str> = items[1].subtitle_languages.iter().map(LanguageCode::as_str).collect();
        assert_eq!(subs, vec!["en"]);
    }

    #[test]
    fn missing_optional_fields_default() {
        let video: VideoRecord =
            serde_json::from_str(r#"{"id": 1, "title": "t", "file_path": "a.mp4"}"#).unwrap();
        assert!(video.available_languages.is_empty());
        assert_eq!(video.subtitle_count, 0);
    }
}
