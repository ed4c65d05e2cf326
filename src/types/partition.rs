//! Partition range type
//!
//! A partition is a contiguous block of data lines handed to one worker.
//! Line indices are 1-based and refer to the data portion of the file, so the
//! header line is never part of any range.

use std::fmt;

/// Inclusive, 1-based range of data lines
///
/// An empty range is represented with `end == start - 1`; its `len()` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRange {
    /// First data line of the range
    pub start: u64,
    /// Last data line of the range (inclusive)
    pub end: u64,
}

impl PartitionRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of data lines covered by this range
    pub fn len(&self) -> u64 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of data lines preceding this range
    pub fn lines_to_skip(&self) -> u64 {
        self.start.saturating_sub(1)
    }
}

impl fmt::Display for PartitionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
