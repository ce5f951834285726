//! A backend viewed through a single root directory.

use std::sync::Arc;

use async_trait::async_trait;
use ndcb_path::{AbsolutePath, RelativePath};
use tracing::{Instrument, Span};

use crate::backend::Backend;
use crate::entry::{Directory, Entry, File};
use crate::error::{FsError, Result};
use crate::filesystem::{FileBatches, FileSystem};
use crate::walk::walk;

/// Serves pathnames relative to `root`.
///
/// Pathnames that normalize to somewhere outside the root (`../x`) do not
/// exist here; reading them fails with [`FsError::PathnameNotFound`].
#[derive(Clone)]
pub struct RootedFileSystem {
    root: Directory,
    backend: Arc<dyn Backend>,
    span: Span,
}

impl RootedFileSystem {
    pub fn new(root: Directory, backend: Arc<dyn Backend>) -> Self {
        let span = tracing::debug_span!("source_root", root = %root.path());
        Self {
            root,
            backend,
            span,
        }
    }

    /// Record this root's operations under `span` instead of the default.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The absolute path for `pathname`, `None` if it escapes the root.
    pub fn resolve(&self, pathname: &RelativePath) -> Option<AbsolutePath> {
        let path = self.root.path().join(pathname);
        path.is_within(self.root.path()).then_some(path)
    }

    pub(crate) fn resolve_file(&self, pathname: &RelativePath) -> Result<File> {
        self.resolve(pathname)
            .map(File::new)
            .ok_or_else(|| FsError::pathname_not_found(pathname))
    }

    pub(crate) fn resolve_directory(&self, pathname: &RelativePath) -> Result<Directory> {
        self.resolve(pathname)
            .map(Directory::new)
            .ok_or_else(|| FsError::pathname_not_found(pathname))
    }

    /// Map a backend not-found error onto the requested pathname.
    fn not_found_as_pathname(pathname: &RelativePath, err: FsError) -> FsError {
        if matches!(err, FsError::NotFound { .. }) {
            FsError::pathname_not_found(pathname)
        } else {
            err
        }
    }
}

#[async_trait]
impl FileSystem for RootedFileSystem {
    fn pathname(&self, entry: &Entry) -> Option<RelativePath> {
        entry.path().relative_to(self.root.path())
    }

    async fn file(&self, pathname: &RelativePath) -> Result<Option<File>> {
        let Some(path) = self.resolve(pathname) else {
            return Ok(None);
        };
        let file = File::new(path);
        let exists = self
            .backend
            .file_exists(&file)
            .instrument(self.span.clone())
            .await?;
        Ok(exists.then_some(file))
    }

    fn files(&self) -> FileBatches {
        walk(self.backend.clone(), self.root.clone(), None, self.span.clone())
    }

    async fn file_exists(&self, pathname: &RelativePath) -> Result<bool> {
        Ok(self.file(pathname).await?.is_some())
    }

    async fn directory_exists(&self, pathname: &RelativePath) -> Result<bool> {
        let Some(path) = self.resolve(pathname) else {
            return Ok(false);
        };
        self.backend
            .directory_exists(&Directory::new(path))
            .instrument(self.span.clone())
            .await
    }

    async fn read_file(&self, pathname: &RelativePath) -> Result<Vec<u8>> {
        let file = self.resolve_file(pathname)?;
        self.backend
            .read_file(&file)
            .instrument(self.span.clone())
            .await
            .map_err(|err| Self::not_found_as_pathname(pathname, err))
    }

    async fn read_text_file(&self, pathname: &RelativePath) -> Result<String> {
        let file = self.resolve_file(pathname)?;
        self.backend
            .read_text_file(&file)
            .instrument(self.span.clone())
            .await
            .map_err(|err| Self::not_found_as_pathname(pathname, err))
    }

    async fn read_directory(&self, pathname: &RelativePath) -> Result<Vec<Entry>> {
        let directory = self.resolve_directory(pathname)?;
        self.backend
            .read_directory(&directory)
            .instrument(self.span.clone())
            .await
            .map_err(|err| Self::not_found_as_pathname(pathname, err))
    }
}
