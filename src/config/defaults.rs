// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Backend**: Server location and request timeout
//! - **Engine Acquisition**: Bounded poll for engine availability
//! - **Session Log**: Lifecycle log capacity

// ==========================================================================
// Backend Defaults
// ==========================================================================

/// Default backend server URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// HTTP request timeout for catalog requests (in seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Subtitle language used when neither config nor OS locale picks one.
pub const FALLBACK_SUBTITLE_LANGUAGE: &str = "en";

// ==========================================================================
// Engine Acquisition Defaults
// ==========================================================================

/// Default delay between engine availability probes (in milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Minimum probe interval (in milliseconds).
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Maximum probe interval (in milliseconds).
pub const MAX_POLL_INTERVAL_MS: u64 = 5_000;

/// Default number of probes before giving up (5 seconds at the default interval).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 50;

/// Minimum number of probes.
pub const MIN_POLL_ATTEMPTS: u32 = 1;

/// Maximum number of probes.
pub const MAX_POLL_ATTEMPTS: u32 = 1_000;

// ==========================================================================
// Session Log Defaults
// ==========================================================================

/// Default number of lifecycle events kept in memory.
pub const DEFAULT_HISTORY_CAPACITY: usize = crate::domain::diagnostics::history_bounds::DEFAULT;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_POLL_INTERVAL_MS > 0);
    assert!(MAX_POLL_INTERVAL_MS >= MIN_POLL_INTERVAL_MS);
    assert!(DEFAULT_POLL_INTERVAL_MS >= MIN_POLL_INTERVAL_MS);
    assert!(DEFAULT_POLL_INTERVAL_MS <= MAX_POLL_INTERVAL_MS);

    assert!(MIN_POLL_ATTEMPTS > 0);
    assert!(MAX_POLL_ATTEMPTS >= MIN_POLL_ATTEMPTS);
    assert!(DEFAULT_MAX_POLL_ATTEMPTS >= MIN_POLL_ATTEMPTS);
    assert!(DEFAULT_MAX_POLL_ATTEMPTS <= MAX_POLL_ATTEMPTS);

    assert!(DEFAULT_REQUEST_TIMEOUT_SECS > 0);
};
