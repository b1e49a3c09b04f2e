//! Input reading and decoding
//!
//! Filter lists are memory-mapped and split into lines at `\n`, `\r\n` or a
//! lone `\r`, so classic Mac and mixed-terminator lists read the same as
//! Unix ones. Each line is decoded
//! strictly: a byte sequence that is not valid in the configured encoding
//! fails the whole read instead of being replaced with U+FFFD.

use crate::error::{DedupError, Result};
use encoding_rs::Encoding;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Label of the default encoding for filter lists
pub const DEFAULT_ENCODING_LABEL: &str = "utf-8";

/// Resolve a WHATWG encoding label ("utf-8", "latin1", "windows-1252", ...)
///
/// Only ASCII-compatible encodings are accepted since lines are split on the
/// `\r` and `\n` bytes before decoding.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DedupError::InvalidConfig(format!("unknown encoding '{}'", label)))?;

    if !encoding.is_ascii_compatible() {
        return Err(DedupError::InvalidConfig(format!(
            "encoding '{}' is not ASCII-compatible and cannot be split into lines",
            encoding.name()
        )));
    }

    Ok(encoding)
}

/// Memory-mapped line reader
pub struct LineReader {
    mmap: Option<memmap2::Mmap>,
    path: PathBuf,
    encoding: &'static Encoding,
    position: usize,
    line_number: usize,
}

impl LineReader {
    /// Open a filter list for reading
    pub fn open(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let file = File::open(path).map_err(|e| DedupError::input(path, "open", e))?;
        let len = file
            .metadata()
            .map_err(|e| DedupError::input(path, "stat", e))?
            .len();

        // Zero-length files cannot be mapped on every platform
        let mmap = if len == 0 {
            None
        } else {
            let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| DedupError::input(path, "map", e))?;
            Some(mmap)
        };

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            encoding,
            position: 0,
            line_number: 0,
        })
    }

    /// Total size of the input in bytes
    pub fn size(&self) -> usize {
        self.bytes().len()
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    fn decode(&self, line_bytes: &[u8]) -> Result<String> {
        let decoded = if self.encoding == encoding_rs::UTF_8 {
            std::str::from_utf8(line_bytes).ok().map(str::to_string)
        } else {
            self.encoding
                .decode_without_bom_handling_and_without_replacement(line_bytes)
                .map(|s| s.into_owned())
        };

        decoded.ok_or_else(|| DedupError::InvalidEncoding {
            path: self.path.clone(),
            encoding: self.encoding.name(),
            line: self.line_number,
        })
    }
}

impl Iterator for LineReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        let bytes = self.bytes();
        if start >= bytes.len() {
            return None;
        }

        // Find end of line; "\r\n" counts as one terminator
        let remaining = &bytes[start..];
        let (end, next) = match memchr::memchr2(b'\n', b'\r', remaining) {
            Some(i) if remaining[i] == b'\r' && remaining.get(i + 1) == Some(&b'\n') => (start + i, start + i + 2),
            Some(i) => (start + i, start + i + 1),
            None => (bytes.len(), bytes.len()),
        };

        self.position = next;
        self.line_number += 1;

        Some(self.decode(&self.bytes()[start..end]))
    }
}

/// Read every line of a filter list, terminators stripped
pub fn read_lines(path: &Path, encoding: &'static Encoding) -> Result<Vec<String>> {
    LineReader::open(path, encoding)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_lines() {
        let file = write_temp(b"! header\n||a.com^\n||b.com^\n");
        let lines = read_lines(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(lines, vec!["! header", "||a.com^", "||b.com^"]);
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let file = write_temp(b"! header\r\n||a.com^\r\n\r\n||b.com^");
        let lines = read_lines(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(lines, vec!["! header", "||a.com^", "", "||b.com^"]);
    }

    #[test]
    fn test_lone_carriage_return_splits_lines() {
        let file = write_temp(b"! mac\r||a.com^\r||a.com^\n||b.com^\r\r\n! end");
        let lines = read_lines(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(lines, vec!["! mac", "||a.com^", "||a.com^", "||b.com^", "", "! end"]);
    }

    #[test]
    fn test_trailing_carriage_return_is_terminator() {
        let file = write_temp(b"||a.com^\r");
        let lines = read_lines(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(lines, vec!["||a.com^"]);
    }

    #[test]
    fn test_empty_file() {
        let file = write_temp(b"");
        let mut reader = LineReader::open(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(reader.size(), 0);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_utf8_bom_kept_as_content() {
        let file = write_temp(b"\xEF\xBB\xBF! Title\n||a.com^\n");
        let lines = read_lines(file.path(), encoding_rs::UTF_8).unwrap();

        assert_eq!(lines[0], "\u{feff}! Title");
        assert_eq!(lines[1], "||a.com^");
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let file = write_temp(b"! ok\n||a.com^\n||b\xFF.com^\n");
        let err = read_lines(file.path(), encoding_rs::UTF_8).unwrap_err();

        match err {
            DedupError::InvalidEncoding { line, encoding, .. } => {
                assert_eq!(line, 3);
                assert_eq!(encoding, "UTF-8");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_latin1_input() {
        let file = write_temp(b"! Liste f\xFCr Werbung\n||a.com^\n");
        let encoding = encoding_for_label("latin1").unwrap();
        let lines = read_lines(file.path(), encoding).unwrap();

        assert_eq!(lines[0], "! Liste für Werbung");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineReader::open(&dir.path().join("absent.txt"), encoding_rs::UTF_8).err().unwrap();

        assert!(err.is_input_error());
        assert!(matches!(err, DedupError::InputUnavailable { operation: "open", .. }));
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(encoding_for_label("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(encoding_for_label(" UTF8 ").unwrap(), encoding_rs::UTF_8);
        assert!(encoding_for_label("utf-16le").is_err());
        assert!(encoding_for_label("klingon").is_err());
    }

    #[test]
    fn test_line_numbers_count_carriage_returns() {
        let file = write_temp(b"ab\rcd\r\n\xFF\n");
        let err = read_lines(file.path(), encoding_rs::UTF_8).unwrap_err();

        assert!(matches!(err, DedupError::InvalidEncoding { line: 3, .. }));
    }
}
