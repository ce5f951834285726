//! Ordered union of several file systems.
//!
//! Layers are consulted in order. Existence is the OR over all layers;
//! content comes from the first layer that has the pathname, so an earlier
//! root shadows the same pathname in a later one. Directory listings merge
//! every layer that has the directory, first layer winning on name clashes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use ndcb_path::{AbsolutePath, RelativePath};
use tracing::debug;

use crate::backend::Backend;
use crate::entry::{Directory, Entry, EntryKind, File};
use crate::error::{FsError, Result};
use crate::excluded::ExcludedFileSystem;
use crate::exclusion::DirectoryRuleReader;
use crate::filesystem::{FileBatches, FileSystem};
use crate::rooted::RootedFileSystem;

/// Several file systems presented as one.
#[derive(Clone, Default)]
pub struct CompositeFileSystem {
    layers: Vec<Arc<dyn FileSystem>>,
}

impl CompositeFileSystem {
    pub fn new(layers: Vec<Arc<dyn FileSystem>>) -> Self {
        Self { layers }
    }

    /// One excluded, rooted layer per root, all reading from `backend`.
    ///
    /// Fails if any root contains another.
    pub fn from_roots(
        roots: &[AbsolutePath],
        backend: Arc<dyn Backend>,
        rules: Arc<dyn DirectoryRuleReader>,
    ) -> Result<Self> {
        validate_roots(roots)?;
        let layers = roots
            .iter()
            .map(|root| {
                let rooted = RootedFileSystem::new(Directory::new(root.clone()), backend.clone());
                Arc::new(ExcludedFileSystem::new(rooted, rules.clone())) as Arc<dyn FileSystem>
            })
            .collect();
        Ok(Self::new(layers))
    }

    pub fn layers(&self) -> &[Arc<dyn FileSystem>] {
        &self.layers
    }

    /// Ask every layer concurrently whether it has `pathname` as `kind`.
    async fn claims(&self, pathname: &RelativePath, kind: EntryKind) -> Vec<Result<bool>> {
        join_all(self.layers.iter().map(|layer| match kind {
            EntryKind::File => layer.file_exists(pathname),
            EntryKind::Directory => layer.directory_exists(pathname),
        }))
        .await
    }

    async fn exists(&self, pathname: &RelativePath, kind: EntryKind) -> Result<bool> {
        let mut first_error = None;
        for claim in self.claims(pathname, kind).await {
            match claim {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(false), Err)
    }

    /// The first layer, in order, that has `pathname` as a file.
    ///
    /// An error from a layer ahead of the first claimant is returned, since
    /// that layer might have shadowed the claimant.
    async fn owner(&self, pathname: &RelativePath) -> Result<&Arc<dyn FileSystem>> {
        for (index, claim) in self.claims(pathname, EntryKind::File).await.into_iter().enumerate() {
            if claim? {
                debug!(%pathname, layer = index, "serving file");
                return Ok(&self.layers[index]);
            }
        }
        Err(FsError::pathname_not_found(pathname))
    }
}

/// Fail if any root contains another (or two roots are equal).
pub fn validate_roots(roots: &[AbsolutePath]) -> Result<()> {
    for (index, a) in roots.iter().enumerate() {
        for b in &roots[index + 1..] {
            if b.is_within(a) {
                return Err(FsError::OverlappingRoots {
                    outer: a.clone(),
                    inner: b.clone(),
                });
            }
            if a.is_within(b) {
                return Err(FsError::OverlappingRoots {
                    outer: b.clone(),
                    inner: a.clone(),
                });
            }
        }
    }
    Ok(())
}

#[async_trait]
impl FileSystem for CompositeFileSystem {
    fn pathname(&self, entry: &Entry) -> Option<RelativePath> {
        self.layers.iter().find_map(|layer| layer.pathname(entry))
    }

    async fn file(&self, pathname: &RelativePath) -> Result<Option<File>> {
        for layer in &self.layers {
            if let Some(file) = layer.file(pathname).await? {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }

    fn files(&self) -> FileBatches {
        let batches: Vec<FileBatches> = self.layers.iter().map(|layer| layer.files()).collect();
        stream::iter(batches).flatten().boxed()
    }

    async fn file_exists(&self, pathname: &RelativePath) -> Result<bool> {
        self.exists(pathname, EntryKind::File).await
    }

    async fn directory_exists(&self, pathname: &RelativePath) -> Result<bool> {
        self.exists(pathname, EntryKind::Directory).await
    }

    async fn read_file(&self, pathname: &RelativePath) -> Result<Vec<u8>> {
        self.owner(pathname).await?.read_file(pathname).await
    }

    async fn read_text_file(&self, pathname: &RelativePath) -> Result<String> {
        self.owner(pathname).await?.read_text_file(pathname).await
    }

    async fn read_directory(&self, pathname: &RelativePath) -> Result<Vec<Entry>> {
        let claims = self.claims(pathname, EntryKind::Directory).await;
        let mut claimants = Vec::new();
        for (layer, claim) in self.layers.iter().zip(claims) {
            if claim? {
                claimants.push(layer);
            }
        }
        if claimants.is_empty() {
            return Err(FsError::pathname_not_found(pathname));
        }

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for layer in claimants {
            for entry in layer.read_directory(pathname).await? {
                if seen.insert(entry.name().to_string()) {
                    merged.push(entry);
                }
            }
        }
        Ok(merged)
    }
}
