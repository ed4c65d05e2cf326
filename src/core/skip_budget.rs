//! Job-wide skip counter
//!
//! One `SkipBudget` is created per job and shared by every worker behind an
//! `Arc`. Each duplicate-key skip increments it atomically; the increment that
//! pushes the count past the limit reports the budget as exceeded.

use crate::types::LoadError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Default number of skips tolerated per job
pub const DEFAULT_SKIP_LIMIT: u64 = 1000;

/// Atomic skip counter with a fixed limit
#[derive(Debug)]
pub struct SkipBudget {
    count: AtomicU64,
    limit: u64,
}

impl Default for SkipBudget {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_LIMIT)
    }
}

impl SkipBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            count: AtomicU64::new(0),
            limit,
        }
    }

    /// Record one skipped record
    ///
    /// # Arguments
    ///
    /// * `management_number` - Key of the skipped record, for the log line
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The skip count after this increment
    /// * `Err(LoadError::SkipBudgetExceeded)` - The count is now above the limit
    pub fn record_skip(&self, management_number: &str) -> Result<u64, LoadError> {
        let skipped = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(
            management_number,
            skipped,
            limit = self.limit,
            "Skipped duplicate record"
        );

        if skipped > self.limit {
            return Err(LoadError::skip_budget_exceeded(skipped, self.limit));
        }
        Ok(skipped)
    }

    /// Current skip count
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Whether the count has gone past the limit
    pub fn is_exceeded(&self) -> bool {
        self.count() > self.limit
    }
}
