//! Error types for the restaurant CSV loader
//!
//! This module defines every error that can surface while a load job runs.
//! Errors carry plain messages so they stay `Clone + PartialEq` and can be
//! collected into the job outcome after a worker has finished.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: unreadable source, empty file, bad partition count
//! - **Decode Errors**: structurally malformed lines (fatal to the owning worker)
//! - **Field Errors**: a single field failed coercion (never fatal on its own)
//! - **Skip Budget Errors**: too many duplicate keys across the whole job
//! - **Database / I/O Errors**: anything else raised while loading

use thiserror::Error;

/// Main error type for the loader
///
/// Every variant except [`LoadError::Configuration`] is raised from inside a
/// partition worker and ends that worker only. `Configuration` is raised before
/// any worker starts and aborts the job outright.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The job cannot start with the given configuration or source file
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// A data line could not be decoded into a raw record
    ///
    /// `line` is the 1-based data line index (header excluded).
    #[error("Decode error at data line {line}: {message}")]
    Decode {
        /// Data line index where the error occurred
        line: u64,
        /// Description of the structural problem
        message: String,
    },

    /// The job-wide skip counter went past the configured limit
    #[error("Skip limit exceeded: {skipped} records skipped, limit is {limit}")]
    SkipBudgetExceeded {
        /// Skip count observed when the limit was crossed
        skipped: u64,
        /// Configured limit
        limit: u64,
    },

    /// Non-skippable database failure
    #[error("Database error: {message}")]
    Database {
        /// Description of the database error
        message: String,
    },

    /// I/O error while reading the source file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// A worker task panicked or was aborted before reporting
    #[error("Worker for partition {partition} stopped unexpectedly: {message}")]
    WorkerPanicked {
        /// Index of the partition the worker owned
        partition: usize,
        /// Panic or join error description
        message: String,
    },
}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::Io {
            message: error.to_string(),
        }
    }
}

impl From<sqlx::Error> for LoadError {
    fn from(error: sqlx::Error) -> Self {
        LoadError::Database {
            message: error.to_string(),
        }
    }
}

impl LoadError {
    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        LoadError::Configuration {
            message: message.into(),
        }
    }

    /// Create a Decode error
    pub fn decode(line: u64, message: impl Into<String>) -> Self {
        LoadError::Decode {
            line,
            message: message.into(),
        }
    }

    /// Create a SkipBudgetExceeded error
    pub fn skip_budget_exceeded(skipped: u64, limit: u64) -> Self {
        LoadError::SkipBudgetExceeded { skipped, limit }
    }

    /// Whether this error was caused by the skip budget running out
    pub fn is_skip_budget_exceeded(&self) -> bool {
        matches!(self, LoadError::SkipBudgetExceeded { .. })
    }
}

/// A single field failed its type coercion
///
/// Never fatal by itself: the transformer either nulls the field or drops
/// the record depending on the numeric policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field '{field}' could not parse '{value}' as {expected}")]
pub struct FieldError {
    /// Name of the domain field
    pub field: &'static str,
    /// Raw value that failed to parse
    pub value: String,
    /// Expected type or pattern
    pub expected: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::configuration(
        LoadError::Configuration { message: "File must not be empty".to_string() },
        "Configuration error: File must not be empty"
    )]
    #[case::decode(
        LoadError::Decode { line: 42, message: "expected 47 columns, found 3".to_string() },
        "Decode error at data line 42: expected 47 columns, found 3"
    )]
    #[case::skip_budget(
        LoadError::SkipBudgetExceeded { skipped: 1001, limit: 1000 },
        "Skip limit exceeded: 1001 records skipped, limit is 1000"
    )]
    #[case::database(
        LoadError::Database { message: "disk I/O error".to_string() },
        "Database error: disk I/O error"
    )]
    #[case::worker_panicked(
        LoadError::WorkerPanicked { partition: 3, message: "boom".to_string() },
        "Worker for partition 3 stopped unexpectedly: boom"
    )]
    fn test_error_display(#[case] error: LoadError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::configuration(
        LoadError::configuration("bad"),
        LoadError::Configuration { message: "bad".to_string() }
    )]
    #[case::decode(
        LoadError::decode(7, "unterminated quote"),
        LoadError::Decode { line: 7, message: "unterminated quote".to_string() }
    )]
    #[case::skip_budget(
        LoadError::skip_budget_exceeded(11, 10),
        LoadError::SkipBudgetExceeded { skipped: 11, limit: 10 }
    )]
    fn test_helper_functions(#[case] result: LoadError, #[case] expected: LoadError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: LoadError = io_error.into();
        assert!(matches!(error, LoadError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: missing");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let error: LoadError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, LoadError::Database { .. }));
    }

    #[test]
    fn test_skip_budget_predicate() {
        assert!(LoadError::skip_budget_exceeded(2, 1).is_skip_budget_exceeded());
        assert!(!LoadError::configuration("x").is_skip_budget_exceeded());
    }

    #[test]
    fn test_field_error_display() {
        let error = FieldError::new("licensing_date", "이건 날짜가 아님", "yyyy-MM-dd");
        assert_eq!(
            error.to_string(),
            "Field 'licensing_date' could not parse '이건 날짜가 아님' as yyyy-MM-dd"
        );
    }
}
