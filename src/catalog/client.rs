// SPDX-License-Identifier: MPL-2.0
//! HTTP client for the catalog endpoints.

use super::endpoints::MediaEndpoints;
use super::records::{merge_catalog, AudioRecord, VideoRecord};
use super::{CatalogError, CatalogResult};
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::domain::media::{MediaId, MediaItem};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Reads the media catalog from the backend.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    endpoints: MediaEndpoints,
}

impl CatalogClient {
    /// Builds a client with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the TLS backend cannot be initialized.
    pub fn new(endpoints: MediaEndpoints) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("PolyglotPlayer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(Self { http, endpoints })
    }

    #[must_use]
    pub fn endpoints(&self) -> &MediaEndpoints {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> CatalogResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Fetches the raw video listing.
    pub async fn fetch_videos(&self) -> CatalogResult<Vec<VideoRecord>> {
        self.get_json(&self.endpoints.catalog()).await
    }

    /// Fetches the raw dubbed-audio listing.
    pub async fn fetch_audio_languages(&self) -> CatalogResult<Vec<AudioRecord>> {
        self.get_json(&self.endpoints.audio_catalog()).await
    }

    /// Fetches both listings concurrently and merges them.
    ///
    /// A failing audio listing is not fatal: items then offer no dubbed audio.
    pub async fn fetch_media_items(&self) -> CatalogResult<Vec<MediaItem>> {
        let (videos, audio) =
            futures_util::future::join(self.fetch_videos(), self.fetch_audio_languages()).await;
        let videos = videos?;
        let audio = audio.unwrap_or_else(|err| {
            tracing::warn!(%err, "dubbed audio listing unavailable, continuing without it");
            Vec::new()
        });
        tracing::debug!(videos = videos.len(), audio = audio.len(), "catalog fetched");
        Ok(merge_catalog(videos, &audio))
    }

    /// Fetches the catalog and returns the item with `id`.
    pub async fn fetch_media_item(&self, id: MediaId) -> CatalogResult<MediaItem> {
        self.fetch_media_items()
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(CatalogError::NotFound(id))
    }
}
