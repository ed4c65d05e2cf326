//! Line-range partitioning of the source file
//!
//! Splits the data lines of the source file into `N` contiguous ranges, one
//! per worker. Every range holds `floor(T / N)` lines except the last, which
//! absorbs the remainder:
//!
//! ```text
//! T = 10, N = 3   →   1..=3   4..=6   7..=10
//! T = 2,  N = 4   →   1..=0   1..=0   1..=0   1..=2
//! ```
//!
//! The remainder is deliberately not spread round-robin. When `N > T`, the
//! first `N - 1` ranges are empty and the last one covers the whole file.

use crate::io::line_scanner::{count_lines, read_header};
use crate::types::{LoadError, PartitionRange};
use std::path::Path;
use tracing::info;

/// Compute `partitions` ranges over `total_lines` data lines
///
/// # Returns
///
/// * `Ok(Vec<PartitionRange>)` - Exactly `partitions` ranges, disjoint and
///   contiguous, whose union is `1..=total_lines`
/// * `Err(LoadError::Configuration)` - `total_lines` or `partitions` is zero
pub fn split_lines(total_lines: u64, partitions: usize) -> Result<Vec<PartitionRange>, LoadError> {
    if partitions == 0 {
        return Err(LoadError::configuration("Partition count must be at least 1"));
    }
    if total_lines == 0 {
        return Err(LoadError::configuration("File must not be empty"));
    }

    let count = partitions as u64;
    let lines_per_partition = total_lines / count;
    let mut ranges = Vec::with_capacity(partitions);
    let mut start = 1u64;

    for index in 0..count {
        let end = if index == count - 1 {
            total_lines
        } else {
            start + lines_per_partition - 1
        };
        ranges.push(PartitionRange::new(start, end));
        start = end + 1;
    }

    Ok(ranges)
}

/// Partition a source file for `partitions` workers
///
/// Validates the header, then counts the data lines with one full blocking
/// scan of the file. This scan runs before any worker starts.
pub fn partition_file(path: &Path, partitions: usize) -> Result<Vec<PartitionRange>, LoadError> {
    read_header(path)?;
    let total_lines = count_lines(path)?.saturating_sub(1);

    let ranges = split_lines(total_lines, partitions)?;
    info!(
        total_lines,
        partitions,
        lines_per_partition = total_lines / partitions as u64,
        "Partitioned source file"
    );
    for (index, range) in ranges.iter().enumerate() {
        info!(
            partition = index,
            start = range.start,
            end = range.end,
            "Created partition"
        );
    }

    Ok(ranges)
}
