//! Error types for ndcb-fs.
//!
//! "Not found" is usually a value (`Ok(false)`, `Ok(None)`); the `NotFound`
//! variants are only produced by operations that must return content.

use std::io;

use ndcb_path::{AbsolutePath, PathError, RelativePath};
use thiserror::Error;

/// Result type for ndcb-fs operations.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors from file system operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {path}")]
    NotFound { path: AbsolutePath },

    /// A pathname no layer serves: missing, outside every root, or excluded.
    #[error("pathname not found: '{pathname}'")]
    PathnameNotFound { pathname: RelativePath },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: AbsolutePath,
        #[source]
        source: io::Error,
    },

    #[error("not valid UTF-8: {path}")]
    InvalidUtf8 {
        path: AbsolutePath,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("malformed rules file {file}: {message}")]
    RulesParse { file: AbsolutePath, message: String },

    #[error("source roots overlap: {outer} contains {inner}")]
    OverlappingRoots {
        outer: AbsolutePath,
        inner: AbsolutePath,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

impl FsError {
    /// Map an OS error for `path`.
    ///
    /// Missing paths (and paths whose parent turned out not to be a directory)
    /// become [`FsError::NotFound`]; everything else keeps the `io::Error` so
    /// callers can still inspect `kind()` or `raw_os_error()`.
    pub fn from_io(path: &AbsolutePath, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound {
                path: path.clone(),
            },
            _ => Self::Io {
                path: path.clone(),
                source,
            },
        }
    }

    pub fn pathname_not_found(pathname: &RelativePath) -> Self {
        Self::PathnameNotFound {
            pathname: pathname.clone(),
        }
    }

    /// True for both not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PathnameNotFound { .. })
    }

    /// True for configuration errors raised before any query runs.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::OverlappingRoots { .. } | Self::Config { .. })
    }
}
