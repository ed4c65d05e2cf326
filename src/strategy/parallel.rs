//! Parallel load strategy
//!
//! Runs one tokio task per partition on a multi-threaded runtime whose worker
//! count equals the partition count.
//!
//! # Architecture
//!
//! ```text
//! ParallelStrategy
//!     └── tokio multi-thread runtime (worker_threads = partitions)
//!         └── Coordinator
//!             ├── PartitionWorker 0 ──┐
//!             ├── PartitionWorker 1 ──┼── SqlitePool + Arc<SkipBudget>
//!             └── PartitionWorker N ──┘
//! ```

use crate::core::{ExecutionMode, JobConfig};
use crate::strategy::{run_job, LoadStrategy};
use crate::types::{JobOutcome, LoadError};

/// Concurrent load strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelStrategy;

impl LoadStrategy for ParallelStrategy {
    fn run(&self, config: &JobConfig) -> Result<JobOutcome, LoadError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.partitions.max(1))
            .enable_all()
            .build()
            .map_err(|e| LoadError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(run_job(config, ExecutionMode::Parallel))
    }
}
