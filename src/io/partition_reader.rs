//! Asynchronous partition reader
//!
//! Streams the raw records of one partition of the source file. Every worker
//! owns its own `PartitionReader`, and with it its own file handle and cursor;
//! nothing about decode state is shared between partitions.
//!
//! # Design
//!
//! ```text
//! tokio File → BufReader → line bytes → EUC-KR decode → parse_record → RawRecord
//! ```
//!
//! Lines are split on `\n` at the byte level. EUC-KR is ASCII-compatible and
//! never uses `0x0A` inside a multi-byte character, so splitting before
//! decoding is safe.
//!
//! The handle is closed when the reader is dropped, on success and on error.

use crate::io::csv_format::{decode_line, parse_record, RawRecord};
use crate::types::{LoadError, PartitionRange};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Reader over the data lines of a single partition
///
/// Yields exactly `range.len()` records, then stops, whatever follows in the
/// file. Reaching end of file before that is a decode error.
#[derive(Debug)]
pub struct PartitionReader {
    reader: BufReader<File>,
    range: PartitionRange,
    /// Byte offset of the first line of the partition
    start_offset: u64,
    /// Data line index of the next line to read
    next_line: u64,
    buffer: Vec<u8>,
}

impl PartitionReader {
    /// Open the source file and position the reader at the partition start
    ///
    /// Skips the header and every data line before `range.start`.
    ///
    /// # Returns
    ///
    /// * `Ok(PartitionReader)` if the file was opened and positioned
    /// * `Err(LoadError::Io)` if the file could not be opened
    /// * `Err(LoadError::Decode)` if the file ends before the partition starts
    pub async fn open(path: &Path, range: PartitionRange) -> Result<Self, LoadError> {
        let file = File::open(path).await.map_err(|e| LoadError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let mut reader = BufReader::new(file);
        let mut buffer = Vec::new();
        let mut start_offset = 0u64;

        // header + preceding data lines
        for line in 0..=range.lines_to_skip() {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer).await?;
            if read == 0 {
                return Err(LoadError::decode(
                    line,
                    format!("file ended before partition start line {}", range.start),
                ));
            }
            start_offset += read as u64;
        }

        Ok(Self {
            reader,
            range,
            start_offset,
            next_line: range.start,
            buffer,
        })
    }

    /// The partition this reader covers
    pub fn range(&self) -> PartitionRange {
        self.range
    }

    /// Number of lines still to be read
    pub fn remaining(&self) -> u64 {
        (self.range.end + 1).saturating_sub(self.next_line)
    }

    /// Seek back to the first line of the partition
    pub async fn restart(&mut self) -> Result<(), LoadError> {
        self.reader.seek(SeekFrom::Start(self.start_offset)).await?;
        self.next_line = self.range.start;
        Ok(())
    }

    /// Read the next record of the partition
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RawRecord))` - The next decoded record
    /// * `Ok(None)` - The partition is exhausted
    /// * `Err(LoadError)` - The line is malformed or the file ended early
    pub async fn next_record(&mut self) -> Result<Option<RawRecord>, LoadError> {
        if self.remaining() == 0 {
            return Ok(None);
        }

        let line_number = self.next_line;
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer).await?;
        if read == 0 {
            self.next_line = self.range.end + 1;
            return Err(LoadError::decode(
                line_number,
                format!("file ended before partition end line {}", self.range.end),
            ));
        }
        self.next_line += 1;

        let line = decode_line(&self.buffer);
        parse_record(&line, line_number).map(Some)
    }

    /// Read a batch of raw records
    ///
    /// Reads up to `batch_size` records. Unlike per-field problems, a
    /// malformed line is fatal for the partition and is returned as an error.
    ///
    /// # Returns
    ///
    /// A vector of decoded records. Returns an empty vector once the
    /// partition is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Result<Vec<RawRecord>, LoadError> {
        let capacity = batch_size.min(self.remaining() as usize);
        let mut batch = Vec::with_capacity(capacity);

        while batch.len() < batch_size {
            match self.next_record().await? {
                Some(record) => batch.push(record),
                None => break,
            }
        }

        Ok(batch)
    }
}
