//! I/O error types for the disk module.

use std::io;
use std::path::PathBuf;

use hearth_common::types::PageId;
use thiserror::Error;

/// Result type for disk operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Errors that can occur during page I/O operations.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum DiskError {
    /// Standard I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Backing file could not be opened.
    #[error("cannot open page file: {path}")]
    CannotOpen { path: PathBuf },

    /// Operation addressed the invalid page sentinel.
    #[error("invalid page id")]
    InvalidPageId,

    /// Caller-provided buffer is not exactly one page.
    #[error("invalid buffer size: expected {expected} bytes, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    /// Short read/write (less data than expected).
    #[error("short {operation}: expected {expected} bytes, got {actual}")]
    ShortIo {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl DiskError {
    /// Creates a CannotOpen error.
    pub fn cannot_open(path: impl Into<PathBuf>) -> Self {
        Self::CannotOpen { path: path.into() }
    }

    /// Creates an InvalidBufferSize error.
    pub fn invalid_buffer_size(expected: usize, actual: usize) -> Self {
        Self::InvalidBufferSize { expected, actual }
    }

    /// Creates a ShortIo error for writes.
    pub fn short_write(expected: usize, actual: usize) -> Self {
        Self::ShortIo {
            operation: "write",
            expected,
            actual,
        }
    }

    /// Returns true if this is a retryable error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io { source } => {
                source.kind() == io::ErrorKind::Interrupted
                    || source.kind() == io::ErrorKind::WouldBlock
            }
            _ => false,
        }
    }
}

/// Validates that `buf` is exactly one page of `expected` bytes.
pub(crate) fn check_buffer(buf_len: usize, expected: usize) -> DiskResult<()> {
    if buf_len != expected {
        return Err(DiskError::invalid_buffer_size(expected, buf_len));
    }
    Ok(())
}

/// Validates that `page_id` is not the invalid sentinel.
pub(crate) fn check_page_id(page_id: PageId) -> DiskResult<()> {
    if !page_id.is_valid() {
        return Err(DiskError::InvalidPageId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DiskError::invalid_buffer_size(8192, 100);
        assert!(matches!(
            err,
            DiskError::InvalidBufferSize {
                expected: 8192,
                actual: 100
            }
        ));

        let err = DiskError::short_write(8192, 4096);
        assert!(matches!(
            err,
            DiskError::ShortIo {
                operation: "write",
                ..
            }
        ));
    }

    #[test]
    fn test_retryable() {
        let err: DiskError = io::Error::new(io::ErrorKind::Interrupted, "interrupted").into();
        assert!(err.is_retryable());

        let err = DiskError::InvalidPageId;
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_checks() {
        assert!(check_buffer(8192, 8192).is_ok());
        assert!(check_buffer(100, 8192).is_err());
        assert!(check_page_id(PageId::new(0)).is_ok());
        assert!(check_page_id(PageId::INVALID).is_err());
    }
}
