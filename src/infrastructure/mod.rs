// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`.
//!
//! # Available Adapters
//!
//! - [`headless`]: In-process engine, provider and audio elements (implements
//!   [`VideoEngine`], [`EngineProvider`] and [`AudioElementFactory`])
//!
//! [`VideoEngine`]: crate::application::port::VideoEngine
//! [`EngineProvider`]: crate::application::port::EngineProvider
//! [`AudioElementFactory`]: crate::application::port::AudioElementFactory

pub mod headless;

// Re-export main types for convenience
pub use headless::{HeadlessBackend, HeadlessRecorder};
