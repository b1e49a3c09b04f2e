//! Output management module
//!
//! Deduplicated lists are written to a freshly created sibling temporary
//! file and renamed onto the destination only after every line has been
//! flushed and synced. The temporary file is opened with `create_new`, so an
//! existing file (the input list included) is never truncated.
//! A failed or abandoned run never leaves a half-written list at the
//! destination path.

use crate::error::{DedupError, Result};
use encoding_rs::Encoding;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default buffer size for file writing (8MB)
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Temporary names tried before giving up
const MAX_TEMP_ATTEMPTS: u32 = 64;

/// Buffered, commit-on-success output writer
pub struct OutputWriter {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    temp_path: PathBuf,
    encoding: &'static Encoding,
    lines_written: u64,
    bytes_written: u64,
    committed: bool,
}

impl OutputWriter {
    /// Create the temporary file next to `path`
    pub fn new(path: PathBuf, buffer_size: usize, encoding: &'static Encoding) -> Result<Self> {
        let (temp_path, file) = create_temp_file(&path)?;

        log::debug!("Writing to temporary file {:?}", temp_path);

        Ok(Self {
            writer: Some(BufWriter::with_capacity(buffer_size.max(1), file)),
            path,
            temp_path,
            encoding,
            lines_written: 0,
            bytes_written: 0,
            committed: false,
        })
    }

    /// Write a line followed by a single `\n`
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let encoded = if self.encoding == encoding_rs::UTF_8 {
            std::borrow::Cow::Borrowed(line.as_bytes())
        } else {
            let (bytes, _, unmappable) = self.encoding.encode(line);
            if unmappable {
                return Err(DedupError::output(
                    &self.path,
                    "encode",
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {} is not representable in {}", self.lines_written + 1, self.encoding.name()),
                    ),
                ));
            }
            bytes
        };

        let writer = self.writer_mut()?;
        writer
            .write_all(&encoded)
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| DedupError::output(&self.path, "write", e))?;

        self.lines_written += 1;
        self.bytes_written += encoded.len() as u64 + 1; // +1 for newline
        Ok(())
    }

    /// Flush, sync and move the temporary file onto the destination
    pub fn commit(mut self) -> Result<()> {
        let writer = self.writer_mut()?;
        writer.flush().map_err(|e| DedupError::output(&self.path, "flush", e))?;

        let file = self.writer.take().map(|w| w.into_inner());
        if let Some(file) = file {
            let file = file.map_err(|e| DedupError::output(&self.path, "flush", e.into_error()))?;
            file.sync_all().map_err(|e| DedupError::output(&self.path, "sync", e))?;
        }

        fs::rename(&self.temp_path, &self.path).map_err(|e| DedupError::output(&self.path, "rename", e))?;
        self.committed = true;

        log::debug!("Committed {} lines to {:?}", self.lines_written, self.path);
        Ok(())
    }

    /// Get the destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the temporary path lines are written to before commit
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Get number of lines written
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Get bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn writer_mut(&mut self) -> Result<&mut BufWriter<File>> {
        let path = &self.path;
        self.writer.as_mut().ok_or_else(|| {
            DedupError::output(path, "write", io::Error::new(io::ErrorKind::Other, "writer already closed"))
        })
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        // Close the handle before removing the file
        drop(self.writer.take());
        if let Err(e) = fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Could not remove temporary file {:?}: {}", self.temp_path, e);
            }
        }
    }
}

/// `<dir>/.<name>.<pid>-<attempt>.tmp` for an output path `<dir>/<name>`
pub(crate) fn temp_path_for(path: &Path, attempt: u32) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| DedupError::InvalidConfig(format!("output path {:?} has no file name", path)))?;

    let mut temp_name = OsString::from(".");
    temp_name.push(name);
    temp_name.push(format!(".{}-{}.tmp", std::process::id(), attempt));
    Ok(path.with_file_name(temp_name))
}

/// Create a temporary file next to `path` that did not exist before
fn create_temp_file(path: &Path) -> Result<(PathBuf, File)> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = temp_path_for(path, attempt)?;

        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("Temporary file {:?} already exists, trying another name", temp_path);
            }
            Err(e) => return Err(DedupError::output(path, "create", e)),
        }
    }

    Err(DedupError::output(
        path,
        "create",
        io::Error::new(io::ErrorKind::AlreadyExists, "no free temporary file name"),
    ))
}

/// Ensure the directory holding `path` exists
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            log::debug!("Creating output directory {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| DedupError::output(path, "create directory for", e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_writer() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("filter_deduped.txt");

        let mut writer = OutputWriter::new(path.clone(), 1024, encoding_rs::UTF_8).unwrap();
        writer.write_line("! header").unwrap();
        writer.write_line("||a.com^").unwrap();

        assert_eq!(writer.lines_written(), 2);
        assert_eq!(writer.bytes_written(), 18);
        assert!(!path.exists());

        writer.commit().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "! header\n||a.com^\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_uncommitted_writer_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");

        {
            let mut writer = OutputWriter::new(path.clone(), 1024, encoding_rs::UTF_8).unwrap();
            writer.write_line("||a.com^").unwrap();
            assert!(writer.temp_path().exists());
        }

        assert!(!path.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_commit_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        fs::write(&path, "old content\n").unwrap();

        let mut writer = OutputWriter::new(path.clone(), 16, encoding_rs::UTF_8).unwrap();
        writer.write_line("new").unwrap();

        // Existing output is untouched until commit
        assert_eq!(fs::read_to_string(&path).unwrap(), "old content\n");

        writer.commit().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_missing_directory_is_output_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.txt");

        let err = OutputWriter::new(path, 1024, encoding_rs::UTF_8).err().unwrap();
        assert!(err.is_output_error());
    }

    #[test]
    fn test_ensure_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("out.txt");

        ensure_parent_dir(&path).unwrap();
        assert!(temp_dir.path().join("a").join("b").is_dir());

        // Bare file names have no directory to create
        ensure_parent_dir(Path::new("out.txt")).unwrap();
    }

    #[test]
    fn test_latin1_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        let latin1 = Encoding::for_label(b"latin1").unwrap();

        let mut writer = OutputWriter::new(path.clone(), 1024, latin1).unwrap();
        writer.write_line("! für").unwrap();
        writer.commit().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"! f\xFCr\n");
    }

    #[test]
    fn test_temp_path_for() {
        let temp = temp_path_for(Path::new("filter_lists/filter_deduped.txt"), 3).unwrap();
        let expected = format!("filter_lists/.filter_deduped.txt.{}-3.tmp", std::process::id());
        assert_eq!(temp, PathBuf::from(expected));

        assert!(temp_path_for(Path::new("/"), 0).is_err());
    }

    #[test]
    fn test_existing_files_at_temp_names_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.txt");
        let plain_tmp = temp_dir.path().join("list.txt.tmp");
        let first_tmp = temp_path_for(&path, 0).unwrap();
        fs::write(&plain_tmp, "||keep.com^\n").unwrap();
        fs::write(&first_tmp, "||also-keep.com^\n").unwrap();

        let mut writer = OutputWriter::new(path.clone(), 1024, encoding_rs::UTF_8).unwrap();
        assert_ne!(writer.temp_path(), first_tmp.as_path());
        writer.write_line("||a.com^").unwrap();
        writer.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "||a.com^\n");
        assert_eq!(fs::read_to_string(&plain_tmp).unwrap(), "||keep.com^\n");
        assert_eq!(fs::read_to_string(&first_tmp).unwrap(), "||also-keep.com^\n");
    }

    #[test]
    fn test_abandoned_writer_keeps_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.txt");
        let first_tmp = temp_path_for(&path, 0).unwrap();
        fs::write(&first_tmp, "foreign\n").unwrap();

        drop(OutputWriter::new(path.clone(), 1024, encoding_rs::UTF_8).unwrap());

        assert_eq!(fs::read_to_string(&first_tmp).unwrap(), "foreign\n");
        assert!(!path.exists());
    }
}
