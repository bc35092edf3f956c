// SPDX-License-Identifier: MPL-2.0
//! Video playback newtypes.
//!
//! This module provides type-safe wrappers for video playback values,
//! ensuring they are always within valid ranges.

// =============================================================================
// PlaybackRate
// =============================================================================

/// Playback rate bounds.
pub mod rate_bounds {
    /// Slowest rate media elements accept.
    pub const MIN: f64 = 0.0625;
    /// Fastest rate media elements accept.
    pub const MAX: f64 = 16.0;
    /// Normal speed.
    pub const DEFAULT: f64 = 1.0;
    /// Rates offered by the engine's rate menu.
    pub const PRESETS: &[f64] = &[0.5, 1.0, 1.5, 2.0];
}

/// Playback rate, guaranteed to be within valid range (0.0625x - 16x).
///
/// Rates reported by the video engine are clamped through this type before
/// being mirrored onto the dubbed audio element, so a misbehaving engine
/// cannot push an unplayable rate to the follower.
///
/// # Example
///
/// ```
/// use polyglot_player::domain::video::PlaybackRate;
///
/// assert_eq!(PlaybackRate::new(1.5).value(), 1.5);
/// assert_eq!(PlaybackRate::new(100.0).value(), 16.0);
/// assert_eq!(PlaybackRate::new(f64::NAN).value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Creates a new rate, clamping to valid range. Non-finite input yields normal speed.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        if !rate.is_finite() {
            return Self::default();
        }
        Self(rate.clamp(rate_bounds::MIN, rate_bounds::MAX))
    }

    /// Returns the rate value as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns true if this is normal speed.
    #[must_use]
    pub fn is_normal(self) -> bool {
        (self.0 - rate_bounds::DEFAULT).abs() < 0.001
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(rate_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn new_clamps_to_valid_range() {
        assert_abs_diff_eq!(PlaybackRate::new(0.001).value(), rate_bounds::MIN);
        assert_abs_diff_eq!(PlaybackRate::new(100.0).value(), rate_bounds::MAX);
        assert_abs_diff_eq!(PlaybackRate::new(2.0).value(), 2.0);
    }

    #[test]
    fn non_finite_is_normal_speed() {
        assert!(PlaybackRate::new(f64::INFINITY).is_normal());
        assert!(PlaybackRate::new(f64::NAN).is_normal());
    }

    #[test]
    fn presets_are_within_bounds() {
        for &preset in rate_bounds::PRESETS {
            assert_abs_diff_eq!(PlaybackRate::new(preset).value(), preset);
        }
    }
}
