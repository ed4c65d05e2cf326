//! End-to-end integration tests
//!
//! These tests run complete load jobs against EUC-KR source files generated
//! on the fly and a fresh SQLite database per test. Each test:
//! 1. Writes an EUC-KR source file with a header line
//! 2. Runs a job through the selected strategy
//! 3. Checks the job outcome and the rows left in the `restaurant` table
//!
//! Covered scenarios:
//! - Happy path across several partition counts
//! - Duplicate keys within the skip limit
//! - Skip limit exceeded, in a single partition and next to a clean sibling
//! - A malformed line failing one partition
//! - Blank keys, bad dates and quoted fields
//!
//! Each test is run twice: once with the parallel strategy and once with the
//! sequential one.

#[cfg(test)]
mod tests {
    use restaurant_csv_loader::cli::StrategyType;
    use restaurant_csv_loader::io::{COLUMN_COUNT, COLUMN_LABELS};
    use restaurant_csv_loader::strategy::create_strategy;
    use restaurant_csv_loader::{JobConfig, JobOutcome, JobStatus, LoadError};
    use rstest::rstest;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Row, SqlitePool};
    use std::future::Future;
    use std::io::Write;
    use std::path::Path;
    use std::pin::Pin;
    use tempfile::{NamedTempFile, TempDir};

    /// One data line with the given column overrides
    ///
    /// `dummy` appends the trailing empty column some exports carry.
    fn line(overrides: &[(usize, String)], dummy: bool) -> String {
        let mut fields = vec![String::new(); COLUMN_COUNT];
        for (index, value) in overrides {
            fields[*index] = value.clone();
        }
        if dummy {
            fields.push(String::new());
        }
        fields.join(",")
    }

    fn restaurant_line(number: usize, key: &str) -> String {
        line(
            &[
                (0, number.to_string()),
                (1, "일반음식점".to_string()),
                (4, key.to_string()),
                (5, format!("2023-01-{:02}", number % 28 + 1)),
                (16, "33.5".to_string()),
                (18, "\"서울특별시 중구 세종대로 110, 1층\"".to_string()),
                (21, format!("식당 {}", number)),
                (22, "2023-05-06 07:08:09.5".to_string()),
                (26, "127.12345".to_string()),
                (27, "37.56789".to_string()),
                (29, "2".to_string()),
            ],
            number % 2 == 0,
        )
    }

    fn key(number: usize) -> String {
        format!("3000000-101-2023-{:05}", number)
    }

    /// Write an EUC-KR source file: header line, then the given data lines
    fn create_source(lines: &[String]) -> NamedTempFile {
        let mut content = format!("{},\r\n", COLUMN_LABELS.join(","));
        for line in lines {
            content.push_str(line);
            content.push_str("\r\n");
        }
        let (encoded, _, had_errors) = encoding_rs::EUC_KR.encode(&content);
        assert!(!had_errors, "Fixture is not representable in EUC-KR");

        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&encoded)
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn hundred_rows() -> Vec<String> {
        (1..=100).map(|n| restaurant_line(n, &key(n))).collect()
    }

    fn database_url(dir: &TempDir) -> String {
        format!("sqlite://{}", dir.path().join("restaurant.db").display())
    }

    fn config(source: &Path, dir: &TempDir, partitions: usize, batch_size: usize) -> JobConfig {
        JobConfig {
            database_url: database_url(dir),
            partitions,
            batch_size,
            ..JobConfig::new(source)
        }
    }

    fn run(strategy_type: StrategyType, config: &JobConfig) -> Result<JobOutcome, LoadError> {
        create_strategy(strategy_type).run(config)
    }

    type QueryFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

    /// Query the database outside of the job's own runtime
    fn query<T, F>(dir: &TempDir, f: F) -> T
    where
        F: for<'a> FnOnce(&'a SqlitePool) -> QueryFuture<'a, T>,
    {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
        runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&database_url(dir))
                .await
                .expect("Failed to open database");
            let result = f(&pool).await;
            pool.close().await;
            result
        })
    }

    fn stored_keys(dir: &TempDir) -> Vec<String> {
        query(dir, |pool| {
            Box::pin(async move {
                sqlx::query_scalar("SELECT management_number FROM restaurant ORDER BY 1")
                    .fetch_all(pool)
                    .await
                    .expect("Failed to query keys")
            })
        })
    }

    #[rstest]
    fn test_hundred_rows_load_completely(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
        #[values(1, 3, 4, 7)] partitions: usize,
    ) {
        let source = create_source(&hundred_rows());
        let dir = TempDir::new().unwrap();

        let outcome = run(strategy_type, &config(source.path(), &dir, partitions, 9))
            .unwrap_or_else(|e| panic!("Job could not start: {}", e));

        assert_eq!(outcome.status, JobStatus::Completed, "{}", outcome);
        assert_eq!(outcome.partitions.len(), partitions);
        assert_eq!(outcome.totals.read, 100);
        assert_eq!(outcome.totals.written, 100);
        assert_eq!(outcome.skip_count, 0);

        let keys = stored_keys(&dir);
        let expected: Vec<String> = (1..=100).map(key).collect();
        assert_eq!(keys, expected);
    }

    #[rstest]
    fn test_typed_values_are_stored(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let mut lines = hundred_rows();
        lines[9] = line(
            &[
                (4, key(10)),
                (5, "이건 날짜가 아님".to_string()),
                (21, "날짜 없는 식당".to_string()),
                (26, "127.12345".to_string()),
            ],
            false,
        );
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();

        let outcome = run(strategy_type, &config(source.path(), &dir, 2, 25)).unwrap();
        assert!(outcome.is_completed(), "{}", outcome);

        let (licensing_date, name, coordinate_x) = query(&dir, |pool| {
            Box::pin(async move {
                let row = sqlx::query(
                    "SELECT licensing_date, business_name, coordinate_x \
                     FROM restaurant WHERE management_number = ?",
                )
                .bind(key(10))
                .fetch_one(pool)
                .await
                .expect("Row not found");
                (
                    row.get::<Option<String>, _>("licensing_date"),
                    row.get::<String, _>("business_name"),
                    row.get::<String, _>("coordinate_x"),
                )
            })
        });
        assert_eq!(licensing_date, None);
        assert_eq!(name, "날짜 없는 식당");
        assert_eq!(coordinate_x, "127.12345");

        let (address, modified, area) = query(&dir, |pool| {
            Box::pin(async move {
                let row = sqlx::query(
                    "SELECT full_address, last_modified_at, location_area \
                     FROM restaurant WHERE management_number = ?",
                )
                .bind(key(1))
                .fetch_one(pool)
                .await
                .expect("Row not found");
                (
                    row.get::<String, _>("full_address"),
                    row.get::<String, _>("last_modified_at"),
                    row.get::<f64, _>("location_area"),
                )
            })
        });
        assert_eq!(address, "서울특별시 중구 세종대로 110, 1층");
        assert!(modified.starts_with("2023-05-06 07:08:09.5"));
        assert_eq!(area, 33.5);
    }

    #[rstest]
    fn test_duplicate_key_is_skipped_and_counted(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let mut lines: Vec<String> = (1..=10).map(|n| restaurant_line(n, &key(n))).collect();
        lines[7] = restaurant_line(8, &key(2));
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();

        let outcome = run(strategy_type, &config(source.path(), &dir, 2, 3)).unwrap();

        assert_eq!(outcome.status, JobStatus::Completed, "{}", outcome);
        assert_eq!(outcome.skip_count, 1);
        assert_eq!(outcome.totals.skipped, 1);
        assert_eq!(outcome.totals.written, 9);
        assert_eq!(stored_keys(&dir).len(), 9);
    }

    #[rstest]
    fn test_skip_limit_exceeded_fails_job(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let keys = ["A", "B", "C", "D", "A", "B", "C", "D", "E", "F"];
        let lines: Vec<String> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| restaurant_line(i + 1, k))
            .collect();
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();
        let config = JobConfig {
            skip_limit: 2,
            ..config(source.path(), &dir, 1, 4)
        };

        let outcome = run(strategy_type, &config).unwrap();

        assert_eq!(outcome.status, JobStatus::Failed);
        assert!(outcome.skip_limit_exceeded);
        assert_eq!(outcome.skip_count, 3);
        assert_eq!(
            outcome.partitions[0].error,
            Some(LoadError::skip_budget_exceeded(3, 2))
        );
        assert_eq!(stored_keys(&dir), vec!["A", "B", "C", "D"]);
        assert!(outcome.to_string().contains("FAILED"));
    }

    #[rstest]
    fn test_skip_limit_in_one_partition_keeps_sibling_rows(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        // partition 0 holds lines 1..=5 with unique keys, partition 1 repeats one key five times
        let mut lines: Vec<String> = (1..=5).map(|n| restaurant_line(n, &key(n))).collect();
        lines.extend((6..=10).map(|n| restaurant_line(n, &key(99))));
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();
        let config = JobConfig {
            skip_limit: 3,
            ..config(source.path(), &dir, 2, 3)
        };

        let outcome = run(strategy_type, &config).unwrap();

        assert_eq!(outcome.status, JobStatus::Failed);
        assert!(outcome.skip_limit_exceeded);
        assert_eq!(outcome.skip_count, 4);
        assert!(outcome.partitions[0].is_success());
        assert_eq!(outcome.partitions[0].stats.written, 5);
        assert_eq!(
            outcome.partitions[1].error,
            Some(LoadError::skip_budget_exceeded(4, 3))
        );
        assert_eq!(outcome.partitions[1].stats.written, 1);

        let mut expected: Vec<String> = (1..=5).map(key).collect();
        expected.push(key(99));
        assert_eq!(stored_keys(&dir), expected);
    }

    #[rstest]
    fn test_malformed_line_fails_only_its_partition(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let mut lines: Vec<String> = (1..=20).map(|n| restaurant_line(n, &key(n))).collect();
        lines[15] = "16,\"unterminated,quote".to_string();
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();

        let outcome = run(strategy_type, &config(source.path(), &dir, 2, 5)).unwrap();

        assert_eq!(outcome.status, JobStatus::Failed);
        assert!(outcome.partitions[0].is_success());
        assert!(matches!(
            outcome.partitions[1].error,
            Some(LoadError::Decode { line: 16, .. })
        ));
        // partition 0 fully committed, partition 1 kept its first batch (11..=15)
        let keys = stored_keys(&dir);
        assert_eq!(keys.len(), 15);
        assert!(keys.contains(&key(15)));
        assert!(!keys.contains(&key(17)));
    }

    #[rstest]
    fn test_blank_keys_are_filtered_not_skipped(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let lines: Vec<String> = (1..=12)
            .map(|n| {
                let k = if n % 4 == 0 {
                    "   ".to_string()
                } else {
                    key(n)
                };
                restaurant_line(n, &k)
            })
            .collect();
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();

        let outcome = run(strategy_type, &config(source.path(), &dir, 3, 2)).unwrap();

        assert!(outcome.is_completed(), "{}", outcome);
        assert_eq!(outcome.totals.filtered, 3);
        assert_eq!(outcome.skip_count, 0);
        assert_eq!(stored_keys(&dir).len(), 9);
    }

    #[rstest]
    fn test_rerun_skips_existing_rows(
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let lines: Vec<String> = (1..=10).map(|n| restaurant_line(n, &key(n))).collect();
        let source = create_source(&lines);
        let dir = TempDir::new().unwrap();
        let config = config(source.path(), &dir, 2, 4);

        assert!(run(strategy_type, &config).unwrap().is_completed());
        let second = run(strategy_type, &config).unwrap();

        assert!(second.is_completed(), "{}", second);
        assert_eq!(second.skip_count, 10);
        assert_eq!(second.totals.written, 0);
        assert_eq!(stored_keys(&dir).len(), 10);
    }

    #[rstest]
    #[case::header_only(create_source(&[]), "File must not be empty")]
    #[case::wrong_header_width(
        {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(b"a,b,c\n1,2,3\n").unwrap();
            file
        },
        "invalid header line"
    )]
    fn test_job_cannot_start(
        #[case] source: NamedTempFile,
        #[case] expected: &str,
        #[values(StrategyType::Parallel, StrategyType::Sequential)] strategy_type: StrategyType,
    ) {
        let dir = TempDir::new().unwrap();
        let error = run(strategy_type, &config(source.path(), &dir, 2, 10)).unwrap_err();

        assert!(matches!(error, LoadError::Configuration { .. }));
        assert!(error.to_string().contains(expected), "{}", error);
    }
}
