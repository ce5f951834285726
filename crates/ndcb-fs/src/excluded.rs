//! A rooted file system with exclusion rules applied.

use std::sync::Arc;

use async_trait::async_trait;
use ndcb_path::RelativePath;
use tracing::{Instrument, trace};

use crate::entry::{Directory, Entry, File};
use crate::error::{FsError, Result};
use crate::exclusion::{DirectoryRuleReader, children_rule, is_excluded};
use crate::filesystem::{FileBatches, FileSystem};
use crate::rooted::RootedFileSystem;
use crate::walk::walk;

/// Hides every entry that is excluded, directly or through an ancestor.
///
/// Excluded entries behave exactly like missing ones: existence checks say
/// `false`, reads fail with [`FsError::PathnameNotFound`], listings and walks
/// leave them out.
#[derive(Clone)]
pub struct ExcludedFileSystem {
    inner: RootedFileSystem,
    rules: Arc<dyn DirectoryRuleReader>,
}

impl ExcludedFileSystem {
    pub fn new(inner: RootedFileSystem, rules: Arc<dyn DirectoryRuleReader>) -> Self {
        Self { inner, rules }
    }

    pub fn inner(&self) -> &RootedFileSystem {
        &self.inner
    }

    async fn excluded(&self, entry: &Entry) -> Result<bool> {
        let excluded = is_excluded(self.rules.as_ref(), entry)
            .instrument(self.inner.span().clone())
            .await?;
        if excluded {
            trace!(parent: self.inner.span(), entry = %entry, "excluded");
        }
        Ok(excluded)
    }

    async fn visible_file(&self, pathname: &RelativePath) -> Result<File> {
        let file = self.inner.resolve_file(pathname)?;
        if self.excluded(&Entry::File(file.clone())).await? {
            return Err(FsError::pathname_not_found(pathname));
        }
        Ok(file)
    }
}

#[async_trait]
impl FileSystem for ExcludedFileSystem {
    fn pathname(&self, entry: &Entry) -> Option<RelativePath> {
        self.inner.pathname(entry)
    }

    async fn file(&self, pathname: &RelativePath) -> Result<Option<File>> {
        let Some(file) = self.inner.file(pathname).await? else {
            return Ok(None);
        };
        if self.excluded(&Entry::File(file.clone())).await? {
            return Ok(None);
        }
        Ok(Some(file))
    }

    fn files(&self) -> FileBatches {
        walk(
            self.inner.backend().clone(),
            self.inner.root().clone(),
            Some(self.rules.clone()),
            self.inner.span().clone(),
        )
    }

    async fn file_exists(&self, pathname: &RelativePath) -> Result<bool> {
        Ok(self.file(pathname).await?.is_some())
    }

    async fn directory_exists(&self, pathname: &RelativePath) -> Result<bool> {
        if !self.inner.directory_exists(pathname).await? {
            return Ok(false);
        }
        let directory = self.inner.resolve_directory(pathname)?;
        Ok(!self.excluded(&Entry::Directory(directory)).await?)
    }

    async fn read_file(&self, pathname: &RelativePath) -> Result<Vec<u8>> {
        self.visible_file(pathname).await?;
        self.inner.read_file(pathname).await
    }

    async fn read_text_file(&self, pathname: &RelativePath) -> Result<String> {
        self.visible_file(pathname).await?;
        self.inner.read_text_file(pathname).await
    }

    async fn read_directory(&self, pathname: &RelativePath) -> Result<Vec<Entry>> {
        let directory: Directory = self.inner.resolve_directory(pathname)?;
        let Some(rule) = children_rule(self.rules.as_ref(), &directory)
            .instrument(self.inner.span().clone())
            .await?
        else {
            return Err(FsError::pathname_not_found(pathname));
        };
        let entries = self.inner.read_directory(pathname).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| !rule.excludes(entry))
            .collect())
    }
}
