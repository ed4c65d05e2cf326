//! Restaurant CSV Loader Library
//! # Overview
//!
//! This library loads a large EUC-KR encoded CSV export of restaurant
//! business licences into a relational `restaurant` table, splitting the file
//! into line ranges that are read, transformed and written concurrently.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Restaurant, PartitionRange, JobOutcome, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`io`] - Source file handling:
//!   - [`io::csv_format`] - Column layout, EUC-KR decoding and line parsing
//!   - [`io::partition_reader`] - Per-partition asynchronous reader
//! - [`core`] - Loading pipeline:
//!   - [`core::partitioner`] - Line-range partitioning
//!   - [`core::transformer`] - Field validation and coercion
//!   - [`core::loader`] - Transactional batch writes with duplicate skipping
//!   - [`core::coordinator`] - Worker pool and job outcome
//! - [`db`] - SQLite pool and table schema
//! - [`strategy`] - Parallel and sequential job runners
//!
//! # Record Handling
//!
//! - **Blank management number**: the record is dropped silently
//! - **Unparsable date or date-time**: the field is stored as null
//! - **Unparsable number**: null (`lenient`) or the record is dropped (`strict`)
//! - **Duplicate management number**: the record is skipped and counted
//!   against the job-wide skip limit
//! - **Malformed line**: the owning partition stops; the job ends `FAILED`

// Module declarations
pub mod cli;
pub mod core;
pub mod db;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{Coordinator, ExecutionMode, JobConfig, NumericPolicy};
pub use types::{JobOutcome, JobStatus, LoadError, PartitionRange, Restaurant};
