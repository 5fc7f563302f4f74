//! Random access into line-oriented flat files
//!
//! A flat file holds one line per corpus item: the first whitespace
//! delimited field is the key, the remainder is the payload. Files can be
//! several gigabytes, so instead of loading them we scan once, remember the
//! byte offset of each key's line, and later seek straight to it.
//!
//! Offsets are trusted for the lifetime of the index. If a file is rewritten
//! after its index was built, lookups may land on the wrong line or past the
//! end of the file; the latter reads as an absent record.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

mod cache;
pub use cache::{CacheStats, IndexCache};

/// Key to byte-offset mapping for one flat file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatFileIndex {
    path: PathBuf,
    offsets: HashMap<String, u64>,
    skipped_lines: usize,
}

impl FlatFileIndex {
    /// Scan `path` once and record the offset of every keyed line
    ///
    /// When a key occurs on several lines the offset of the last occurrence
    /// wins. Empty, whitespace-only and non-UTF-8 lines add no entry but
    /// their bytes still count toward later offsets. A missing file yields
    /// an empty index.
    pub fn build(path: &Path) -> io::Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Flat file missing, using empty index");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(e),
        };

        let mut reader = BufReader::new(file);
        let mut offsets = HashMap::new();
        let mut skipped_lines = 0usize;
        let mut offset = 0u64;
        let mut raw_line = Vec::new();

        loop {
            raw_line.clear();
            let bytes_read = reader.read_until(b'\n', &mut raw_line)?;
            if bytes_read == 0 {
                break;
            }

            match line_key(&raw_line) {
                Some(key) => {
                    offsets.insert(key.to_string(), offset);
                }
                None => {
                    skipped_lines += 1;
                    tracing::trace!(path = %path.display(), offset, "Skipping unkeyed line");
                }
            }
            offset += bytes_read as u64;
        }

        tracing::info!(
            path = %path.display(),
            entries = offsets.len(),
            skipped_lines,
            bytes = offset,
            "Built flat file index"
        );

        Ok(Self {
            path: path.to_path_buf(),
            offsets,
            skipped_lines,
        })
    }

    /// Index of a file that does not exist
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    /// Offset of the line keyed by `key`; no I/O
    pub fn get(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    /// First offset found among `candidates`, tried in order
    pub fn get_any<'a, I>(&self, candidates: I) -> Option<u64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates.into_iter().find_map(|key| self.get(key))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Lines that contributed no entry during the scan
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Seek to `key`'s line and return it, without the line terminator
    ///
    /// Returns `Ok(None)` if the key is not indexed or the line cannot be
    /// read back as text.
    pub fn read_record(&self, key: &str) -> io::Result<Option<String>> {
        match self.get(key) {
            Some(offset) => read_line_at(&self.path, offset),
            None => Ok(None),
        }
    }
}

/// Read the single line starting at `offset`
///
/// The file handle is dropped before returning on every path. A missing
/// file, an offset at or past end-of-file and an undecodable line all read
/// as `None`.
pub fn read_line_at(path: &Path, offset: u64) -> io::Result<Option<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    file.seek(SeekFrom::Start(offset))?;

    let mut reader = BufReader::new(file);
    let mut raw_line = Vec::new();
    if reader.read_until(b'\n', &mut raw_line)? == 0 {
        tracing::debug!(path = %path.display(), offset, "Offset past end of file");
        return Ok(None);
    }

    match String::from_utf8(raw_line) {
        Ok(mut line) => {
            if line.ends_with('\n') {
                line.pop();
            }
            Ok(Some(line))
        }
        Err(_) => {
            tracing::debug!(path = %path.display(), offset, "Record line is not valid UTF-8");
            Ok(None)
        }
    }
}

/// Key field of a raw line, if the line is valid text and non-blank
fn line_key(raw_line: &[u8]) -> Option<&str> {
    let line = std::str::from_utf8(raw_line).ok()?;
    line.split_whitespace().next()
}
