// SPDX-License-Identifier: MPL-2.0
//! Application layer - ports between the synchronizer and media backends.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The synchronizer only ever sees the traits
//!
//! # Example
//!
//! ```ignore
//! use polyglot_player::application::port::{EngineProvider, VideoEngine};
//!
//! // Infrastructure implements the port trait
//! struct BrowserEngineProvider { /* ... */ }
//! impl EngineProvider for BrowserEngineProvider { /* ... */ }
//! ```

pub mod port;
