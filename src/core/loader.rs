//! Batch loader
//!
//! Writes one batch of restaurants per database transaction.
//!
//! # Design
//!
//! ```text
//! write_batch
//!     ├── bulk insert (multi-row INSERT, chunked by bind limit) ── commit
//!     └── unique violation
//!             └── rollback, then re-drive item by item
//!                     ├── savepoint per item
//!                     ├── violation → rollback savepoint, SkipBudget::record_skip
//!                     └── budget exceeded → drop transaction (rollback), fail
//! ```
//!
//! A transaction dropped without `commit` is rolled back by sqlx, so every
//! early return via `?` leaves the batch unwritten.

use crate::core::skip_budget::SkipBudget;
use crate::db::{INSERT_COLUMNS, TABLE_NAME};
use crate::types::{LoadError, Restaurant};
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::debug;

/// SQLite's default maximum number of bound variables per statement
const SQLITE_MAX_VARIABLES: usize = 32766;

/// Rows per multi-row `INSERT` statement
pub const MAX_ROWS_PER_STATEMENT: usize = SQLITE_MAX_VARIABLES / INSERT_COLUMNS.len();

/// What happened to one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Rows committed
    pub written: u64,
    /// Rows dropped for a duplicate management number
    pub skipped: u64,
}

/// Transactional writer for one worker
#[derive(Debug, Clone)]
pub struct BatchLoader {
    pool: SqlitePool,
    budget: Arc<SkipBudget>,
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

/// Insert `records` on `conn`, one multi-row statement per chunk
async fn insert_rows(
    conn: &mut SqliteConnection,
    records: &[Restaurant],
) -> Result<(), sqlx::Error> {
    let prefix = format!(
        "INSERT INTO {} ({}) ",
        TABLE_NAME,
        INSERT_COLUMNS.join(", ")
    );

    for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(&prefix);
        query_builder.push_values(chunk, |mut b, r| {
            b.push_bind(&r.management_number)
                .push_bind(r.licensing_date)
                .push_bind(r.close_date)
                .push_bind(&r.location_phone_number)
                .push_bind(r.location_area)
                .push_bind(&r.location_zip_code)
                .push_bind(&r.full_address)
                .push_bind(&r.road_name_address)
                .push_bind(&r.road_name_zip_code)
                .push_bind(&r.business_name)
                .push_bind(r.last_modified_at)
                .push_bind(&r.data_update_type)
                .push_bind(r.data_updated_at)
                .push_bind(&r.industry_type)
                .push_bind(r.coordinate_x.map(|d| d.to_string()))
                .push_bind(r.coordinate_y.map(|d| d.to_string()))
                .push_bind(&r.open_auth_code)
                .push_bind(r.male_worker_count)
                .push_bind(r.female_worker_count)
                .push_bind(&r.surrounding_area_type)
                .push_bind(&r.grade_type)
                .push_bind(&r.water_facility_type)
                .push_bind(&r.building_ownership_type)
                .push_bind(r.monthly_rent)
                .push_bind(&r.multi_use_business_yn)
                .push_bind(r.total_facility_size)
                .push_bind(&r.traditional_business_number)
                .push_bind(&r.traditional_business_main_food);
        });

        query_builder.build().execute(&mut *conn).await?;
    }

    Ok(())
}

impl BatchLoader {
    /// Create a loader writing through `pool` and counting skips in `budget`
    pub fn new(pool: SqlitePool, budget: Arc<SkipBudget>) -> Self {
        Self { pool, budget }
    }

    /// Write one batch in one transaction
    ///
    /// # Arguments
    ///
    /// * `records` - The batch, in file order
    ///
    /// # Returns
    ///
    /// * `Ok(BatchResult)` - The batch is committed, minus any duplicate keys
    /// * `Err(LoadError::SkipBudgetExceeded)` - A duplicate pushed the job past
    ///   its skip limit; nothing of this batch is committed
    /// * `Err(LoadError::Database)` - Any other database failure; nothing of
    ///   this batch is committed
    pub async fn write_batch(&self, records: &[Restaurant]) -> Result<BatchResult, LoadError> {
        if records.is_empty() {
            return Ok(BatchResult::default());
        }

        let mut tx = self.pool.begin().await?;
        match insert_rows(&mut tx, records).await {
            Ok(()) => {
                tx.commit().await?;
                return Ok(BatchResult {
                    written: records.len() as u64,
                    skipped: 0,
                });
            }
            Err(error) if is_unique_violation(&error) => {
                tx.rollback().await?;
                debug!(
                    batch_size = records.len(),
                    "Duplicate key in batch, re-driving item by item"
                );
            }
            Err(error) => return Err(error.into()),
        }

        self.write_items(records).await
    }

    /// Re-drive a batch one record at a time, skipping duplicate keys
    async fn write_items(&self, records: &[Restaurant]) -> Result<BatchResult, LoadError> {
        let mut tx = self.pool.begin().await?;
        let mut result = BatchResult::default();

        for record in records {
            let mut savepoint = tx.begin().await?;
            match insert_rows(&mut savepoint, std::slice::from_ref(record)).await {
                Ok(()) => {
                    savepoint.commit().await?;
                    result.written += 1;
                }
                Err(error) if is_unique_violation(&error) => {
                    savepoint.rollback().await?;
                    result.skipped += 1;
                    self.budget.record_skip(&record.management_number)?;
                }
                Err(error) => return Err(error.into()),
            }
        }

        tx.commit().await?;
        Ok(result)
    }
}
