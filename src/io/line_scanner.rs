//! Synchronous whole-file scans
//!
//! Used once per job, before any worker starts: count the lines of the source
//! file and read its header. Both scans are plain blocking reads and should be
//! run off the async worker threads.

use crate::io::csv_format::{decode_line, parse_header};
use crate::types::LoadError;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const SCAN_BUFFER_SIZE: usize = 64 * 1024;

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| {
        LoadError::configuration(format!("Failed to open source file '{}': {}", path.display(), e))
    })
}

/// Count the physical lines of a file
///
/// A final line without a trailing newline counts as a line; a trailing
/// newline does not start an extra one. An empty file has zero lines.
pub fn count_lines(path: &Path) -> Result<u64, LoadError> {
    let mut file = open(path)?;
    let mut buffer = vec![0u8; SCAN_BUFFER_SIZE];
    let mut lines = 0u64;
    let mut last_byte = None;

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        lines += buffer[..read].iter().filter(|&&b| b == b'\n').count() as u64;
        last_byte = Some(buffer[read - 1]);
    }

    match last_byte {
        Some(b'\n') | None => Ok(lines),
        Some(_) => Ok(lines + 1),
    }
}

/// Read and validate the header line of a source file
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The header labels (dummy column excluded)
/// * `Err(LoadError::Configuration)` - Unreadable file, empty file or wrong column count
pub fn read_header(path: &Path) -> Result<Vec<String>, LoadError> {
    let mut reader = BufReader::with_capacity(SCAN_BUFFER_SIZE, open(path)?);
    let mut bytes = Vec::new();
    let read = reader.read_until(b'\n', &mut bytes)?;
    if read == 0 {
        return Err(LoadError::configuration(format!("Source file '{}' is empty", path.display())));
    }
    parse_header(&decode_line(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::{COLUMN_COUNT, COLUMN_LABELS};
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::empty(b"".as_slice(), 0)]
    #[case::header_only(b"h\n".as_slice(), 1)]
    #[case::trailing_newline(b"h\na\nb\n".as_slice(), 3)]
    #[case::no_trailing_newline(b"h\na\nb".as_slice(), 3)]
    #[case::crlf(b"h\r\na\r\n".as_slice(), 2)]
    #[case::blank_line_counts(b"h\n\nb\n".as_slice(), 3)]
    #[case::bare_cr_is_not_a_terminator(b"h\ra\rb\n".as_slice(), 1)]
    #[case::bare_cr_before_last_line(b"h\na\rb".as_slice(), 2)]
    fn test_count_lines(#[case] content: &[u8], #[case] expected: u64) {
        let file = create_temp_file(content);
        assert_eq!(count_lines(file.path()).unwrap(), expected);
    }

    #[test]
    fn test_count_lines_spans_buffer_boundary() {
        let content = "x\n".repeat(SCAN_BUFFER_SIZE);
        let file = create_temp_file(content.as_bytes());
        assert_eq!(count_lines(file.path()).unwrap(), SCAN_BUFFER_SIZE as u64);
    }

    #[test]
    fn test_count_lines_missing_file() {
        let error = count_lines(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(matches!(error, LoadError::Configuration { .. }));
        assert!(error.to_string().contains("Failed to open source file"));
    }

    #[test]
    fn test_read_header_decodes_euc_kr() {
        let header = format!("{},dummy\r\n", COLUMN_LABELS.join(","));
        let (encoded, _, _) = encoding_rs::EUC_KR.encode(&header);
        let file = create_temp_file(&encoded);

        let labels = read_header(file.path()).unwrap();
        assert_eq!(labels.len(), COLUMN_COUNT);
        assert_eq!(labels[4], "관리번호");
    }

    #[test]
    fn test_read_header_empty_file() {
        let file = create_temp_file(b"");
        let error = read_header(file.path()).unwrap_err();
        assert!(error.to_string().contains("is empty"));
    }
}
