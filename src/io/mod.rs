//! I/O module
//!
//! Handles the source file.
//!
//! # Components
//!
//! - `csv_format` - Source layout, EUC-KR decoding and line parsing
//! - `line_scanner` - Blocking whole-file scans (line count, header)
//! - `partition_reader` - Asynchronous reader over one partition's lines

pub mod csv_format;
pub mod line_scanner;
pub mod partition_reader;

pub use csv_format::{parse_record, RawRecord, COLUMN_COUNT, COLUMN_LABELS};
pub use line_scanner::{count_lines, read_header};
pub use partition_reader::PartitionReader;
