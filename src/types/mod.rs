//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `restaurant`: The typed domain record and the transformer result
//! - `partition`: Line ranges handed to workers
//! - `outcome`: Per-partition reports and the job outcome
//! - `error`: Error types for the loader

pub mod error;
pub mod outcome;
pub mod partition;
pub mod restaurant;

pub use error::{FieldError, LoadError};
pub use outcome::{JobOutcome, JobStatus, PartitionReport, PartitionStats};
pub use partition::PartitionRange;
pub use restaurant::{ManagementNumber, Restaurant, Transformed};
