//! Local filesystem backend.

use async_trait::async_trait;
use ndcb_path::AbsolutePath;
use tokio::fs;
use tracing::warn;

use super::{Backend, ChangeTime, PathStatus};
use crate::entry::{Directory, Entry, EntryKind, File};
use crate::error::{FsError, Result};

/// Real filesystem access through `tokio::fs`.
///
/// Symlinks are followed. Directory listings drop children that resolve to
/// neither a file nor a directory (dangling links, sockets, fifos), and
/// children whose names have no exact [`AbsolutePath`] spelling: non-UTF-8
/// names and names containing `\`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }

    /// Inode change time on unix; modification time elsewhere.
    #[cfg(unix)]
    fn change_stamp(meta: &std::fs::Metadata) -> i128 {
        use std::os::unix::fs::MetadataExt;
        i128::from(meta.ctime()) * 1_000_000_000 + i128::from(meta.ctime_nsec())
    }

    #[cfg(not(unix))]
    fn change_stamp(meta: &std::fs::Metadata) -> i128 {
        meta.modified()
            .ok()
            .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_nanos() as i128)
            .unwrap_or_default()
    }

    fn kind_of(meta: &std::fs::Metadata) -> Option<EntryKind> {
        if meta.is_file() {
            Some(EntryKind::File)
        } else if meta.is_dir() {
            Some(EntryKind::Directory)
        } else {
            None
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn read_file(&self, file: &File) -> Result<Vec<u8>> {
        fs::read(file.path())
            .await
            .map_err(|err| FsError::from_io(file.path(), err))
    }

    async fn read_directory(&self, directory: &Directory) -> Result<Vec<Entry>> {
        let path = directory.path();
        let mut dir = fs::read_dir(path)
            .await
            .map_err(|err| FsError::from_io(path, err))?;

        let mut entries = Vec::new();
        while let Some(child) = dir
            .next_entry()
            .await
            .map_err(|err| FsError::from_io(path, err))?
        {
            let raw = child.file_name();
            let Some(name) = raw.to_str().filter(|name| !name.contains('\\')) else {
                warn!(directory = %path, name = ?raw, "skipping unrepresentable file name");
                continue;
            };
            // metadata() follows symlinks; a dangling link fails here and is skipped
            let kind = match fs::metadata(child.path()).await {
                Ok(meta) => Self::kind_of(&meta),
                Err(_) => None,
            };
            if let Some(kind) = kind {
                entries.push(Entry::with_kind(kind, path.child(name)));
            }
        }

        entries.sort();
        Ok(entries)
    }

    async fn status(&self, path: &AbsolutePath) -> Result<PathStatus> {
        let meta = fs::metadata(path)
            .await
            .map_err(|err| FsError::from_io(path, err))?;
        Ok(PathStatus {
            kind: Self::kind_of(&meta),
            change_time: ChangeTime::new(Self::change_stamp(&meta), meta.len()),
        })
    }

    async fn canonical(&self, directory: &Directory) -> Result<AbsolutePath> {
        let path = directory.path();
        let resolved = fs::canonicalize(path)
            .await
            .map_err(|err| FsError::from_io(path, err))?;
        Ok(AbsolutePath::new(resolved)?)
    }
}
