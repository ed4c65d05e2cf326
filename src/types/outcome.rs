//! Job outcome types
//!
//! Workers report a [`PartitionReport`] whether they finish cleanly or not.
//! The coordinator folds those reports into one [`JobOutcome`], which is the
//! only thing the caller sees once the job is over.

use crate::types::{LoadError, PartitionRange};
use std::fmt;

/// Terminal status of a job run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Progress counters of a single partition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartitionStats {
    /// Lines decoded from the file
    pub read: u64,
    /// Records dropped by the transformer (missing key or strict-mode failure)
    pub filtered: u64,
    /// Rows committed to the database
    pub written: u64,
    /// Records rejected by the unique constraint
    pub skipped: u64,
    /// Batches committed
    pub batches: u64,
}

impl PartitionStats {
    pub fn absorb(&mut self, other: &PartitionStats) {
        self.read += other.read;
        self.filtered += other.filtered;
        self.written += other.written;
        self.skipped += other.skipped;
        self.batches += other.batches;
    }
}

/// What one worker did with its partition
///
/// `error` is set when the worker stopped early; `stats` still holds the
/// progress made up to that point, including batches already committed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionReport {
    pub partition: usize,
    pub range: PartitionRange,
    pub stats: PartitionStats,
    pub error: Option<LoadError>,
}

impl PartitionReport {
    pub fn new(partition: usize, range: PartitionRange) -> Self {
        Self {
            partition,
            range,
            stats: PartitionStats::default(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of one job run
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    /// Timestamp-based identifier of this run
    pub run_id: String,
    pub status: JobStatus,
    /// Job-wide skip counter at the end of the run
    pub skip_count: u64,
    /// Whether the skip counter went past the limit
    pub skip_limit_exceeded: bool,
    /// Counters summed over every partition
    pub totals: PartitionStats,
    /// One report per partition, ordered by partition index
    pub partitions: Vec<PartitionReport>,
}

impl JobOutcome {
    /// Fold partition reports into a job outcome
    ///
    /// The job is `Completed` only if every partition succeeded and the skip
    /// budget held.
    pub fn from_reports(
        run_id: String,
        mut partitions: Vec<PartitionReport>,
        skip_count: u64,
        skip_limit_exceeded: bool,
    ) -> Self {
        partitions.sort_by_key(|report| report.partition);

        let mut totals = PartitionStats::default();
        for report in &partitions {
            totals.absorb(&report.stats);
        }

        let status = if skip_limit_exceeded || partitions.iter().any(|r| !r.is_success()) {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };

        Self {
            run_id,
            status,
            skip_count,
            skip_limit_exceeded,
            totals,
            partitions,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Errors of every partition that stopped early
    pub fn errors(&self) -> Vec<&LoadError> {
        self.partitions
            .iter()
            .filter_map(|report| report.error.as_ref())
            .collect()
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {} {}: read={} filtered={} written={} skipped={}",
            self.run_id,
            self.status,
            self.totals.read,
            self.totals.filtered,
            self.totals.written,
            self.skip_count
        )?;
        if let Some(error) = self.errors().first() {
            write!(f, " cause={}", error)?;
        }
        Ok(())
    }
}
