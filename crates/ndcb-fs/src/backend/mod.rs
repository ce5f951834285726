//! Raw entry backends.
//!
//! A [`Backend`] answers questions about absolute entries: read a file, list
//! a directory, stat a path. It knows nothing about roots, exclusion rules or
//! layering; those are built on top in [`crate::rooted`] and friends.
//!
//! - **LocalBackend**: the real filesystem through `tokio::fs`
//! - **MemoryBackend**: an in-memory tree (tests, virtual sites)
//! - **CachedBackend** (in [`crate::cache`]): change-time validated caches
//!   over any other backend

mod local;
mod memory;

pub use local::LocalBackend;
pub use memory::MemoryBackend;

use std::sync::Arc;

use async_trait::async_trait;
use ndcb_path::AbsolutePath;

use crate::entry::{Directory, Entry, EntryKind, File};
use crate::error::{FsError, Result};

/// Opaque cache-validity token for a path.
///
/// Two reads of a path returning the same `ChangeTime` are assumed to see the
/// same content. Resolution is that of the underlying clock, so two writes
/// inside one tick are indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeTime {
    stamp: i128,
    len: u64,
}

impl ChangeTime {
    pub fn new(stamp: i128, len: u64) -> Self {
        Self { stamp, len }
    }
}

/// Result of a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStatus {
    /// `None` for things that are neither files nor directories.
    pub kind: Option<EntryKind>,
    pub change_time: ChangeTime,
}

/// Reads absolute entries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the entire contents of a file.
    async fn read_file(&self, file: &File) -> Result<Vec<u8>>;

    /// Read a file and decode it as UTF-8.
    async fn read_text_file(&self, file: &File) -> Result<String> {
        let bytes = self.read_file(file).await?;
        String::from_utf8(bytes).map_err(|source| FsError::InvalidUtf8 {
            path: file.path().clone(),
            source,
        })
    }

    /// List the direct children of a directory.
    ///
    /// Only children that are unambiguously files or directories are
    /// returned; anything else is skipped without error.
    async fn read_directory(&self, directory: &Directory) -> Result<Vec<Entry>>;

    /// Stat a path, following symlinks.
    async fn status(&self, path: &AbsolutePath) -> Result<PathStatus>;

    /// The resolved location of a directory, following symlinks.
    ///
    /// Walks use this to visit each real directory once. Backends without
    /// links return the path unchanged.
    async fn canonical(&self, directory: &Directory) -> Result<AbsolutePath> {
        Ok(directory.path().clone())
    }

    async fn file_exists(&self, file: &File) -> Result<bool> {
        self.kind_exists(file.path(), EntryKind::File).await
    }

    async fn directory_exists(&self, directory: &Directory) -> Result<bool> {
        self.kind_exists(directory.path(), EntryKind::Directory).await
    }

    /// True if `path` exists and is of `kind`. Missing paths are `Ok(false)`.
    async fn kind_exists(&self, path: &AbsolutePath, kind: EntryKind) -> Result<bool> {
        match self.status(path).await {
            Ok(status) => Ok(status.kind == Some(kind)),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn read_file(&self, file: &File) -> Result<Vec<u8>> {
        (**self).read_file(file).await
    }

    async fn read_text_file(&self, file: &File) -> Result<String> {
        (**self).read_text_file(file).await
    }

    async fn read_directory(&self, directory: &Directory) -> Result<Vec<Entry>> {
        (**self).read_directory(directory).await
    }

    async fn status(&self, path: &AbsolutePath) -> Result<PathStatus> {
        (**self).status(path).await
    }

    async fn canonical(&self, directory: &Directory) -> Result<AbsolutePath> {
        (**self).canonical(directory).await
    }

    async fn file_exists(&self, file: &File) -> Result<bool> {
        (**self).file_exists(file).await
    }

    async fn directory_exists(&self, directory: &Directory) -> Result<bool> {
        (**self).directory_exists(directory).await
    }
}
