// SPDX-License-Identifier: MPL-2.0
//! Bounded ring buffer backing the session lifecycle log.

use std::collections::VecDeque;

pub use crate::domain::diagnostics::HistoryCapacity;

/// Fixed-capacity FIFO that evicts its oldest entry when full.
///
/// # Example
///
/// ```
/// use polyglot_player::diagnostics::{CircularBuffer, HistoryCapacity};
///
/// let mut buffer: CircularBuffer<u32> = CircularBuffer::new(HistoryCapacity::default());
/// buffer.push(1);
/// buffer.push(2);
///
/// assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
/// assert_eq!(buffer.last(), Some(&2));
/// ```
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
    evicted: u64,
}

impl<T> CircularBuffer<T> {
    #[must_use]
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self::with_raw_capacity(capacity.get())
    }

    /// Creates a buffer with an unchecked capacity (at least 1). Used by tests.
    #[must_use]
    pub fn with_raw_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Appends `item`, evicting the oldest entry when at capacity.
    pub fn push(&mut self, item: T) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
            self.evicted += 1;
        }
        self.data.push_back(item);
    }

    /// Oldest-first iterator.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.data.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries dropped because the buffer was full.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_evicts_oldest_and_counts() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(3);
        for i in 1..=5 {
            buffer.push(i);
        }

        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.evicted(), 2);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut buffer: CircularBuffer<&str> = CircularBuffer::with_raw_capacity(0);
        buffer.push("a");
        buffer.push("b");
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.last(), Some(&"b"));
    }

    #[test]
    fn iter_reverses_to_newest_first() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_raw_capacity(4);
        buffer.push(10);
        buffer.push(20);
        buffer.push(30);
        assert_eq!(buffer.iter().rev().copied().collect::<Vec<_>>(), vec![30, 20, 10]);
    }

    #[test]
    fn capacity_comes_from_newtype() {
        let buffer: CircularBuffer<u8> = CircularBuffer::new(HistoryCapacity::new(32));
        assert_eq!(buffer.capacity(), 32);
        assert!(buffer.is_empty());
    }
}
