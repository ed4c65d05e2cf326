//! Job coordinator
//!
//! Runs one load job from start to finish:
//!
//! 1. Partition the source file (blocking scan, before any worker starts)
//! 2. Build one [`PartitionWorker`] per range, all sharing the pool and one
//!    [`SkipBudget`]
//! 3. Run the workers and wait for every one of them
//! 4. Fold their reports into a [`JobOutcome`]
//!
//! # Failure model
//!
//! A worker that fails ends only its own partition. Siblings are not
//! cancelled; the job is reported `FAILED` once all of them have finished.
//! Only configuration problems found before any worker starts make
//! [`Coordinator::run`] return `Err`.

use crate::core::loader::BatchLoader;
use crate::core::partitioner::partition_file;
use crate::core::skip_budget::{SkipBudget, DEFAULT_SKIP_LIMIT};
use crate::core::transformer::{NumericPolicy, RecordTransformer};
use crate::core::worker::PartitionWorker;
use crate::db::DEFAULT_DATABASE_URL;
use crate::types::{JobOutcome, LoadError, PartitionReport};
use chrono::Local;
use futures::future::join_all;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Default number of records per database transaction
pub const DEFAULT_BATCH_SIZE: usize = 2000;

/// Settings for one load job
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// EUC-KR source file
    pub source: PathBuf,
    /// SQLite database URL
    pub database_url: String,
    /// Number of partitions, and of workers
    pub partitions: usize,
    /// Records per database transaction
    pub batch_size: usize,
    /// Duplicate-key skips tolerated across the whole job
    pub skip_limit: u64,
    pub numeric_policy: NumericPolicy,
}

impl JobConfig {
    /// Create a config for `source` with default settings
    ///
    /// Partition count defaults to the number of logical CPUs.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            partitions: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            skip_limit: DEFAULT_SKIP_LIMIT,
            numeric_policy: NumericPolicy::default(),
        }
    }
}

/// How workers are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One tokio task per partition, run concurrently
    Parallel,
    /// Partitions run one after another on the calling task
    Sequential,
}

/// Timestamp-based run identifier, local time
fn new_run_id() -> String {
    Local::now().format("%Y%m%d%H%M%S%3f").to_string()
}

/// Owns the worker pool of one job
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: JobConfig,
    pool: SqlitePool,
}

impl Coordinator {
    pub fn new(config: JobConfig, pool: SqlitePool) -> Self {
        Self { config, pool }
    }

    /// Run the job
    ///
    /// # Returns
    ///
    /// * `Ok(JobOutcome)` - Every worker ran to completion or failure; the
    ///   outcome says which
    /// * `Err(LoadError::Configuration)` - The job could not start
    pub async fn run(&self, mode: ExecutionMode) -> Result<JobOutcome, LoadError> {
        let run_id = new_run_id();
        info!(
            run_id = %run_id,
            source = %self.config.source.display(),
            partitions = self.config.partitions,
            batch_size = self.config.batch_size,
            skip_limit = self.config.skip_limit,
            ?mode,
            "Job started"
        );

        let source = self.config.source.clone();
        let partitions = self.config.partitions;
        let ranges = tokio::task::spawn_blocking(move || partition_file(&source, partitions))
            .await
            .map_err(|e| LoadError::Io {
                message: format!("Partitioning task failed: {}", e),
            })??;

        let budget = Arc::new(SkipBudget::new(self.config.skip_limit));
        let loader = BatchLoader::new(self.pool.clone(), Arc::clone(&budget));
        let transformer = RecordTransformer::new(self.config.numeric_policy);

        let workers: Vec<PartitionWorker> = ranges
            .into_iter()
            .enumerate()
            .map(|(partition, range)| {
                PartitionWorker::new(
                    partition,
                    range,
                    self.config.source.clone(),
                    self.config.batch_size,
                    transformer,
                    loader.clone(),
                )
            })
            .collect();

        let reports = match mode {
            ExecutionMode::Parallel => run_parallel(workers).await,
            ExecutionMode::Sequential => run_sequential(workers).await,
        };

        let outcome =
            JobOutcome::from_reports(run_id, reports, budget.count(), budget.is_exceeded());
        if outcome.is_completed() {
            info!(outcome = %outcome, "Job finished");
        } else {
            warn!(outcome = %outcome, "Job finished");
        }

        Ok(outcome)
    }
}

async fn run_sequential(workers: Vec<PartitionWorker>) -> Vec<PartitionReport> {
    let mut reports = Vec::with_capacity(workers.len());
    for worker in workers {
        reports.push(worker.run().await);
    }
    reports
}

/// Spawn every worker, then wait for all of them
///
/// A worker that panics is reported as a failed partition.
async fn run_parallel(workers: Vec<PartitionWorker>) -> Vec<PartitionReport> {
    let mut spawned = Vec::with_capacity(workers.len());
    let mut handles = Vec::with_capacity(workers.len());
    for worker in workers {
        spawned.push((worker.partition(), worker.range()));
        handles.push(tokio::spawn(worker.run()));
    }

    join_all(handles)
        .await
        .into_iter()
        .zip(spawned)
        .map(|(joined, (partition, range))| match joined {
            Ok(report) => report,
            Err(e) => {
                error!(partition, error = %e, "Worker task did not complete");
                let mut report = PartitionReport::new(partition, range);
                report.error = Some(LoadError::WorkerPanicked {
                    partition,
                    message: e.to_string(),
                });
                report
            }
        })
        .collect()
}
