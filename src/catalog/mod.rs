// SPDX-License-Identifier: MPL-2.0
//! Video catalog client.
//!
//! Fetches the media listing and the dubbed-audio listing from the backend
//! and merges them into [`MediaItem`](crate::domain::media::MediaItem)
//! snapshots. Also owns the URL scheme of every media resource.

mod client;
mod endpoints;
mod records;

pub use client::CatalogClient;
pub use endpoints::MediaEndpoints;
pub use records::{merge_catalog, AudioRecord, VideoRecord};

use crate::domain::media::MediaId;
use std::fmt;

/// Errors that can occur while reading the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Connection, TLS or timeout failure.
    Http(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The body was not the expected JSON.
    Decode(String),
    /// No item with this id in the catalog.
    NotFound(MediaId),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Http(msg) => write!(f, "Request failed: {}", msg),
            CatalogError::Status(code) => write!(f, "HTTP status: {}", code),
            CatalogError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            CatalogError::NotFound(id) => write!(f, "Video {} not found", id),
        }
    }
}

impl std::error::Error for CatalogError {}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
