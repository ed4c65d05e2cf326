//! Core loading pipeline
//!
//! This module contains the components that turn a source file into table rows:
//! - `partitioner` - Splits the data lines into one contiguous range per worker
//! - `transformer` - Raw record validation and field coercion
//! - `loader` - Transactional batch writes with duplicate-key skipping
//! - `skip_budget` - Job-wide skip counter shared by all workers
//! - `worker` - Reader → transformer → loader chain for one partition
//! - `coordinator` - Runs the workers and aggregates the job outcome

pub mod coordinator;
pub mod loader;
pub mod partitioner;
pub mod skip_budget;
pub mod transformer;
pub mod worker;

pub use coordinator::{Coordinator, ExecutionMode, JobConfig, DEFAULT_BATCH_SIZE};
pub use loader::{BatchLoader, BatchResult};
pub use partitioner::{partition_file, split_lines};
pub use skip_budget::{SkipBudget, DEFAULT_SKIP_LIMIT};
pub use transformer::{NumericPolicy, RecordTransformer};
pub use worker::PartitionWorker;
