//! Sequential load strategy
//!
//! Runs the partitions one after another on a single-threaded runtime. The
//! partitioning, batching and skip rules are the same as the parallel
//! strategy; only scheduling differs, which makes runs reproducible.

use crate::core::{ExecutionMode, JobConfig};
use crate::strategy::{run_job, LoadStrategy};
use crate::types::{JobOutcome, LoadError};

/// Single-threaded load strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStrategy;

impl LoadStrategy for SequentialStrategy {
    fn run(&self, config: &JobConfig) -> Result<JobOutcome, LoadError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LoadError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(run_job(config, ExecutionMode::Sequential))
    }
}
