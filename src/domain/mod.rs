// SPDX-License-Identifier: MPL-2.0
//! Domain layer - catalog records, language selections and session states.
//!
//! This module contains pure value types and business rules. Nothing here
//! talks to the network or to a media engine.
//!
//! # Modules
//!
//! - [`diagnostics`]: Session history types ([`HistoryCapacity`](diagnostics::HistoryCapacity))
//! - [`error`]: Domain error types ([`PlaybackError`](error::PlaybackError))
//! - [`media`]: Catalog types ([`MediaItem`](media::MediaItem),
//!   [`LanguageCode`](media::LanguageCode), [`AudioSelection`](media::AudioSelection))
//! - [`video`]: Playback types ([`SessionState`](video::SessionState),
//!   [`PlaybackRate`](video::PlaybackRate))

pub mod diagnostics;
pub mod error;
pub mod media;
pub mod video;
