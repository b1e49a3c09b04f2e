//! Error types for filter list processing
//!
//! The deduplication pass itself cannot fail; every variant here comes from
//! the I/O collaborators around it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the caller of a deduplication run
#[derive(Debug, Error)]
pub enum DedupError {
    /// The input list could not be opened or read
    #[error("cannot {operation} input {path:?}")]
    InputUnavailable {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// The input list is not valid text in the configured encoding
    #[error("input {path:?} is not valid {encoding} (line {line})")]
    InvalidEncoding {
        path: PathBuf,
        encoding: &'static str,
        line: usize,
    },

    /// The output list could not be created, written or committed
    #[error("cannot {operation} output {path:?}")]
    OutputUnwritable {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Options that cannot describe a valid run
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DedupError {
    pub(crate) fn input(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            operation,
            source,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        Self::OutputUnwritable {
            path: path.into(),
            operation,
            source,
        }
    }

    /// True for failures on the read side of a run
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputUnavailable { .. } | Self::InvalidEncoding { .. })
    }

    /// True for failures on the write side of a run
    pub fn is_output_error(&self) -> bool {
        matches!(self, Self::OutputUnwritable { .. })
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_input_error_message() {
        let err = DedupError::input(
            "filter_lists/filter.txt",
            "open",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );

        assert!(err.is_input_error());
        assert!(!err.is_output_error());
        assert_eq!(err.to_string(), "cannot open input \"filter_lists/filter.txt\"");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_output_error_kind() {
        let err = DedupError::output(
            "out.txt",
            "create",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert!(err.is_output_error());
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_invalid_encoding_message() {
        let err = DedupError::InvalidEncoding {
            path: PathBuf::from("list.txt"),
            encoding: "UTF-8",
            line: 7,
        };

        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "input \"list.txt\" is not valid UTF-8 (line 7)");
    }
}
