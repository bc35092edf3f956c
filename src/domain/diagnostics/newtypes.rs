// SPDX-License-Identifier: MPL-2.0
//! Bounded size of the session history.

/// Allowed range for the number of retained lifecycle events.
pub mod history_bounds {
    pub const MIN: usize = 16;
    pub const MAX: usize = 4096;
    /// Enough for a few dozen sessions with language switches.
    pub const DEFAULT: usize = 256;
}

/// How many lifecycle events the session log keeps before dropping the oldest.
///
/// Out-of-range values are clamped on construction.
///
/// ```
/// use polyglot_player::domain::diagnostics::HistoryCapacity;
///
/// assert_eq!(HistoryCapacity::new(512).get(), 512);
/// assert_eq!(HistoryCapacity::new(50_000).get(), 4096);
/// assert_eq!(HistoryCapacity::new(1).get(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HistoryCapacity(usize);

impl HistoryCapacity {
    #[must_use]
    pub fn new(events: usize) -> Self {
        Self(events.clamp(history_bounds::MIN, history_bounds::MAX))
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns true if `events` had to be clamped.
    #[must_use]
    pub fn would_clamp(events: usize) -> bool {
        !(history_bounds::MIN..=history_bounds::MAX).contains(&events)
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self(history_bounds::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_values_clamp_to_bounds() {
        assert_eq!(HistoryCapacity::new(0).get(), history_bounds::MIN);
        assert_eq!(HistoryCapacity::new(usize::MAX).get(), history_bounds::MAX);
        assert!(HistoryCapacity::would_clamp(0));
        assert!(!HistoryCapacity::would_clamp(history_bounds::DEFAULT));
    }

    #[test]
    fn default_sits_inside_bounds() {
        let capacity = HistoryCapacity::default();
        assert!(!HistoryCapacity::would_clamp(capacity.get()));
        assert_eq!(capacity, HistoryCapacity::new(history_bounds::DEFAULT));
    }
}
