// SPDX-License-Identifier: MPL-2.0
//! `polyglot_player` keeps a video, a dubbed audio track and a subtitle
//! track in step for multi-language educational videos.
//!
//! It provides the playback synchronizer state machine, the catalog client
//! that feeds it, engine port traits with an in-process headless backend,
//! and user preference management.

#![doc(html_root_url = "https://docs.rs/polyglot_player/0.3.0")]

pub mod application;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod video_player;

#[cfg(test)]
pub(crate) mod test_utils;
