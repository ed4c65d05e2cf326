//! SQLite connection pool and `restaurant` table schema

use crate::types::LoadError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://restaurant.db";

/// Concurrent writers wait this long for the database lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Target table
pub const TABLE_NAME: &str = "restaurant";

/// Insert column order, matching the bind order in the loader
pub const INSERT_COLUMNS: [&str; 28] = [
    "management_number",
    "licensing_date",
    "close_date",
    "location_phone_number",
    "location_area",
    "location_zip_code",
    "full_address",
    "road_name_address",
    "road_name_zip_code",
    "business_name",
    "last_modified_at",
    "data_update_type",
    "data_updated_at",
    "industry_type",
    "coordinate_x",
    "coordinate_y",
    "open_auth_code",
    "male_worker_count",
    "female_worker_count",
    "surrounding_area_type",
    "grade_type",
    "water_facility_type",
    "building_ownership_type",
    "monthly_rent",
    "multi_use_business_yn",
    "total_facility_size",
    "traditional_business_number",
    "traditional_business_main_food",
];

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS restaurant (
    id                             INTEGER PRIMARY KEY AUTOINCREMENT,
    management_number              TEXT NOT NULL UNIQUE,
    licensing_date                 TEXT,
    close_date                     TEXT,
    location_phone_number          TEXT,
    location_area                  REAL,
    location_zip_code              TEXT,
    full_address                   TEXT,
    road_name_address              TEXT,
    road_name_zip_code             TEXT,
    business_name                  TEXT,
    last_modified_at               TEXT,
    data_update_type               TEXT,
    data_updated_at                TEXT,
    industry_type                  TEXT,
    coordinate_x                   TEXT,
    coordinate_y                   TEXT,
    open_auth_code                 TEXT,
    male_worker_count              INTEGER,
    female_worker_count            INTEGER,
    surrounding_area_type          TEXT,
    grade_type                     TEXT,
    water_facility_type            TEXT,
    building_ownership_type        TEXT,
    monthly_rent                   INTEGER,
    multi_use_business_yn          TEXT,
    total_facility_size            REAL,
    traditional_business_number    TEXT,
    traditional_business_main_food TEXT
)
"#;

/// Open a connection pool for `database_url`
///
/// The database file is created if missing. WAL journaling and a busy
/// timeout let one writer per partition share the file.
///
/// # Returns
///
/// * `Ok(SqlitePool)` - Pool with at most `max_connections` connections
/// * `Err(LoadError::Configuration)` - The URL cannot be parsed
/// * `Err(LoadError::Database)` - The database cannot be opened
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, LoadError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            LoadError::configuration(format!("Invalid database URL '{}': {}", database_url, e))
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    info!(database_url, max_connections, "Connected to database");
    Ok(pool)
}

/// Create the `restaurant` table if it does not exist yet
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), LoadError> {
    sqlx::query(CREATE_TABLE_SQL).execute(pool).await?;
    Ok(())
}

/// Number of rows currently in the `restaurant` table
pub async fn count_rows(pool: &SqlitePool) -> Result<u64, LoadError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurant")
        .fetch_one(pool)
        .await?;
    Ok(count.max(0) as u64)
}
