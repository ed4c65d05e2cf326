//! Partition worker
//!
//! Drives one partition through the chain
//!
//! ```text
//! PartitionReader → RecordTransformer → BatchLoader
//! ```
//!
//! batch by batch, in file order. A worker never returns an error: failures
//! end the partition and are reported in its [`PartitionReport`].

use crate::core::loader::BatchLoader;
use crate::core::transformer::RecordTransformer;
use crate::io::PartitionReader;
use crate::types::{
    LoadError, PartitionRange, PartitionReport, PartitionStats, Restaurant, Transformed,
};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Worker owning one partition of the source file
#[derive(Debug, Clone)]
pub struct PartitionWorker {
    partition: usize,
    range: PartitionRange,
    source: PathBuf,
    batch_size: usize,
    transformer: RecordTransformer,
    loader: BatchLoader,
}

impl PartitionWorker {
    /// Create a worker
    ///
    /// # Arguments
    ///
    /// * `partition` - Index of the partition, for reporting
    /// * `range` - Data lines this worker reads
    /// * `source` - Path of the source file
    /// * `batch_size` - Records per database transaction
    /// * `transformer` - Field coercion rules
    /// * `loader` - Writer sharing the job's pool and skip budget
    pub fn new(
        partition: usize,
        range: PartitionRange,
        source: PathBuf,
        batch_size: usize,
        transformer: RecordTransformer,
        loader: BatchLoader,
    ) -> Self {
        Self {
            partition,
            range,
            source,
            batch_size: batch_size.max(1),
            transformer,
            loader,
        }
    }

    pub fn partition(&self) -> usize {
        self.partition
    }

    pub fn range(&self) -> PartitionRange {
        self.range
    }

    /// Process the whole partition
    ///
    /// # Returns
    ///
    /// A report with the counters reached so far and, if the partition
    /// stopped early, the error that stopped it.
    pub async fn run(self) -> PartitionReport {
        let mut report = PartitionReport::new(self.partition, self.range);
        info!(partition = self.partition, range = %self.range, "Partition started");

        match self.process(&mut report.stats).await {
            Ok(()) => info!(
                partition = self.partition,
                read = report.stats.read,
                written = report.stats.written,
                skipped = report.stats.skipped,
                "Partition completed"
            ),
            Err(e) => {
                if e.is_skip_budget_exceeded() {
                    error!(
                        partition = self.partition,
                        error = %e,
                        "Partition stopped, skip limit reached"
                    );
                } else {
                    error!(partition = self.partition, error = %e, "Partition failed");
                }
                report.error = Some(e);
            }
        }

        report
    }

    async fn process(&self, stats: &mut PartitionStats) -> Result<(), LoadError> {
        if self.range.is_empty() {
            debug!(
                partition = self.partition,
                "Empty partition, nothing to read"
            );
            return Ok(());
        }

        let mut reader = PartitionReader::open(&self.source, self.range).await?;

        loop {
            let raw = reader.read_batch(self.batch_size).await?;
            if raw.is_empty() {
                return Ok(());
            }
            stats.read += raw.len() as u64;

            let records: Vec<Restaurant> = raw
                .iter()
                .map(|record| self.transformer.transform(record))
                .filter_map(Transformed::into_record)
                .collect();
            stats.filtered += (raw.len() - records.len()) as u64;

            let result = self.loader.write_batch(&records).await?;
            stats.written += result.written;
            stats.skipped += result.skipped;
            stats.batches += 1;

            debug!(
                partition = self.partition,
                batch = stats.batches,
                written = result.written,
                skipped = result.skipped,
                remaining = reader.remaining(),
                "Batch committed"
            );
        }
    }
}
