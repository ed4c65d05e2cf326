//! Load strategy module
//!
//! Defines the Strategy pattern for running a complete load job: database
//! setup, partitioning, workers and outcome. Implementations differ only in how
//! they schedule the partition workers, and are selected at runtime.

use crate::cli::StrategyType;
use crate::core::{Coordinator, ExecutionMode, JobConfig};
use crate::db;
use crate::types::{JobOutcome, LoadError};

pub mod parallel;
pub mod sequential;

pub use parallel::ParallelStrategy;
pub use sequential::SequentialStrategy;

/// Load strategy trait for complete load jobs
///
/// Each strategy owns its async runtime, so callers stay synchronous.
pub trait LoadStrategy: Send + Sync {
    /// Load the source file named in `config` into the database
    ///
    /// # Arguments
    ///
    /// * `config` - Source file, database and tuning settings for the job
    ///
    /// # Returns
    ///
    /// * `Ok(JobOutcome)` - The job ran; its status is `COMPLETED` or `FAILED`
    /// * `Err(LoadError)` - The job could not start (bad source file, bad
    ///   partition count, unreachable database)
    ///
    /// Per-record and per-partition failures never surface here. They are
    /// recorded in the returned outcome.
    fn run(&self, config: &JobConfig) -> Result<JobOutcome, LoadError>;
}

/// Connect, bootstrap the schema and run the coordinator
async fn run_job(config: &JobConfig, mode: ExecutionMode) -> Result<JobOutcome, LoadError> {
    if config.partitions == 0 {
        return Err(LoadError::configuration("Partition count must be at least 1"));
    }

    let pool = db::connect(&config.database_url, config.partitions as u32).await?;
    db::ensure_schema(&pool).await?;

    let outcome = Coordinator::new(config.clone(), pool.clone())
        .run(mode)
        .await;
    pool.close().await;
    outcome
}

/// Create a load strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - How partition workers are scheduled
///
/// # Returns
///
/// A boxed trait object implementing the LoadStrategy trait
pub fn create_strategy(strategy_type: StrategyType) -> Box<dyn LoadStrategy> {
    match strategy_type {
        StrategyType::Parallel => Box::new(ParallelStrategy),
        StrategyType::Sequential => Box::new(SequentialStrategy),
    }
}
