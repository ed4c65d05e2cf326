//! Restaurant CSV loader CLI
//!
//! Loads an EUC-KR restaurant licence export into a SQLite `restaurant` table.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- restaurants.csv
//! cargo run -- --partitions 8 --batch-size 2000 restaurants.csv
//! cargo run -- --strategy sequential --database-url sqlite://out.db restaurants.csv
//! RUST_LOG=restaurant_csv_loader=debug cargo run -- restaurants.csv
//! ```
//!
//! The outcome line (`run <id> COMPLETED|FAILED: ...`) is printed to stdout;
//! logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Job completed
//! - 1: Job failed, or could not start (bad arguments, unreadable file, etc.)

use restaurant_csv_loader::cli;
use restaurant_csv_loader::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = cli::parse_args();
    init_tracing(args.verbose);

    let config = match args.to_job_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            process::exit(1);
        }
    };

    let strategy = strategy::create_strategy(args.strategy);
    match strategy.run(&config) {
        Ok(outcome) => {
            println!("{}", outcome);
            if !outcome.is_completed() {
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Job could not start");
            process::exit(1);
        }
    }
}
