// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that media backends implement.
//! These traits use only domain types, so the synchronizer stays independent
//! of any concrete engine.
//!
//! # Available Ports
//!
//! - [`engine`]: Video engine and its asynchronous availability
//! - [`audio`]: Dubbed audio elements
//! - [`events`]: Event sinks engines and elements report through
//!
//! # Design Notes
//!
//! - All traits use domain types only
//! - Engines and elements are `Send`; providers and factories are `Send + Sync`
//! - Methods are synchronous; the only wait (engine availability) is a
//!   bounded poll owned by the synchronizer

pub mod audio;
pub mod engine;
pub mod events;

// Re-export main types for convenience
pub use audio::{AudioElement, AudioElementFactory};
pub use engine::{
    EngineOptions, EngineProvider, MediaSource, Preload, RemoteTextTrack, TrackMode, VideoEngine,
};
pub use events::{EventSink, HandleId, MediaEvent, TransportEvent};
pub(crate) use events::{event_channel, EventReceiver, EventSender};
