//! The pathname-addressed file system interface.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use ndcb_path::RelativePath;

use crate::entry::{Entry, File};
use crate::error::Result;

/// A lazy sequence of file batches, one per directory read.
///
/// A failed directory read yields an `Err` item and the walk continues with
/// the remaining directories.
pub type FileBatches = BoxStream<'static, Result<Vec<File>>>;

/// A file system addressed by root-relative pathnames.
///
/// Pathnames are relative to the file system's root (or roots, for a
/// composite). Missing pathnames are a value: `Ok(false)` from the
/// existence checks and `Ok(None)` from [`FileSystem::file`]. Only reads
/// fail with a not-found error.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// The pathname of an absolute entry, `None` if it lies outside.
    fn pathname(&self, entry: &Entry) -> Option<RelativePath>;

    /// Resolve a pathname to an existing file.
    async fn file(&self, pathname: &RelativePath) -> Result<Option<File>>;

    /// Every file, batched per directory.
    fn files(&self) -> FileBatches;

    async fn file_exists(&self, pathname: &RelativePath) -> Result<bool>;

    async fn directory_exists(&self, pathname: &RelativePath) -> Result<bool>;

    async fn read_file(&self, pathname: &RelativePath) -> Result<Vec<u8>>;

    async fn read_text_file(&self, pathname: &RelativePath) -> Result<String>;

    /// Direct children of a directory.
    async fn read_directory(&self, pathname: &RelativePath) -> Result<Vec<Entry>>;

    /// Drain [`FileSystem::files`], failing on the first error.
    async fn collect_files(&self) -> Result<Vec<File>> {
        let mut batches = self.files();
        let mut files = Vec::new();
        while let Some(batch) = batches.next().await {
            files.extend(batch?);
        }
        Ok(files)
    }
}

#[async_trait]
impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    fn pathname(&self, entry: &Entry) -> Option<RelativePath> {
        (**self).pathname(entry)
    }

    async fn file(&self, pathname: &RelativePath) -> Result<Option<File>> {
        (**self).file(pathname).await
    }

    fn files(&self) -> FileBatches {
        (**self).files()
    }

    async fn file_exists(&self, pathname: &RelativePath) -> Result<bool> {
        (**self).file_exists(pathname).await
    }

    async fn directory_exists(&self, pathname: &RelativePath) -> Result<bool> {
        (**self).directory_exists(pathname).await
    }

    async fn read_file(&self, pathname: &RelativePath) -> Result<Vec<u8>> {
        (**self).read_file(pathname).await
    }

    async fn read_text_file(&self, pathname: &RelativePath) -> Result<String> {
        (**self).read_text_file(pathname).await
    }

    async fn read_directory(&self, pathname: &RelativePath) -> Result<Vec<Entry>> {
        (**self).read_directory(pathname).await
    }
}
