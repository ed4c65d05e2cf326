use crate::core::{JobConfig, NumericPolicy, DEFAULT_BATCH_SIZE, DEFAULT_SKIP_LIMIT};
use crate::db::DEFAULT_DATABASE_URL;
use crate::types::LoadError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

/// Load an EUC-KR restaurant licence CSV into a SQLite table
#[derive(Parser, Debug)]
#[command(name = "restaurant-loader")]
#[command(about = "Load an EUC-KR restaurant licence CSV into a SQLite table", long_about = None)]
pub struct CliArgs {
    /// Source CSV file path
    #[arg(
        value_name = "INPUT",
        env = "LOADER_INPUT",
        help = "Path to the EUC-KR source CSV file"
    )]
    pub input_file: PathBuf,

    /// Target database
    #[arg(
        long = "database-url",
        value_name = "URL",
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        help = "SQLite database URL"
    )]
    pub database_url: String,

    /// Number of partitions, one worker each
    #[arg(
        long = "partitions",
        value_name = "COUNT",
        env = "LOADER_PARTITIONS",
        help = "Number of partitions processed in parallel (default: CPU cores)"
    )]
    pub partitions: Option<usize>,

    /// Records per database transaction
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        env = "LOADER_BATCH_SIZE",
        help = "Number of records per transaction (default: 2000)"
    )]
    pub batch_size: Option<usize>,

    /// Duplicate-key skips tolerated across the job
    #[arg(
        long = "skip-limit",
        value_name = "COUNT",
        env = "LOADER_SKIP_LIMIT",
        help = "Maximum number of skipped duplicate records before the job fails (default: 1000)"
    )]
    pub skip_limit: Option<u64>,

    /// Worker scheduling
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "parallel",
        help = "Load strategy: 'parallel' runs partitions concurrently, 'sequential' one at a time"
    )]
    pub strategy: StrategyType,

    /// Handling of numeric fields that fail to parse
    #[arg(
        long = "numeric-policy",
        value_name = "POLICY",
        default_value = "lenient",
        help = "'lenient' stores null for bad numbers, 'strict' skips the whole record"
    )]
    pub numeric_policy: NumericPolicyType,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available load strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Parallel,
    Sequential,
}

/// Numeric parse-failure policies selectable from the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NumericPolicyType {
    Lenient,
    Strict,
}

impl From<NumericPolicyType> for NumericPolicy {
    fn from(value: NumericPolicyType) -> Self {
        match value {
            NumericPolicyType::Lenient => NumericPolicy::Lenient,
            NumericPolicyType::Strict => NumericPolicy::Strict,
        }
    }
}

impl CliArgs {
    /// Create a JobConfig from CLI arguments
    ///
    /// Unset values fall back to the defaults. A zero batch size is replaced
    /// by the default with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(JobConfig)` - The validated job settings
    /// * `Err(LoadError::Configuration)` - The partition count is zero
    pub fn to_job_config(&self) -> Result<JobConfig, LoadError> {
        let default = JobConfig::new(&self.input_file);

        let partitions = self.partitions.unwrap_or(default.partitions);
        if partitions == 0 {
            return Err(LoadError::configuration("Partition count must be at least 1"));
        }

        let batch_size = match self.batch_size {
            Some(0) => {
                warn!(
                    batch_size = 0,
                    default = DEFAULT_BATCH_SIZE,
                    "Invalid batch size, using default"
                );
                DEFAULT_BATCH_SIZE
            }
            Some(size) => size,
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(JobConfig {
            database_url: self.database_url.clone(),
            partitions,
            batch_size,
            skip_limit: self.skip_limit.unwrap_or(DEFAULT_SKIP_LIMIT),
            numeric_policy: self.numeric_policy.into(),
            ..default
        })
    }
}
