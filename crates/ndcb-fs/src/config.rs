//! Source tree configuration.
//!
//! ```toml
//! roots = ["content", "static"]
//! rules_files = [".gitignore", ".ndcbignore"]
//! exclude_extensions = [".bak"]
//! exclude_segment_prefixes = ["_"]
//!
//! [cache]
//! file_capacity = 52428800
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use ndcb_path::{AbsolutePath, Extension};
use serde::Deserialize;
use tracing::info;

use crate::backend::Backend;
use crate::cache::{CacheConfig, CachedBackend};
use crate::composite::{CompositeFileSystem, validate_roots};
use crate::entry::Directory;
use crate::error::{FsError, Result};
use crate::excluded::ExcludedFileSystem;
use crate::exclusion::{DirectoryRuleReader, ExclusionRule, RuleReaders, RulesFileReader, StaticRuleReader};
use crate::filesystem::FileSystem;
use crate::rooted::RootedFileSystem;

/// Rules files read from every directory unless configured otherwise.
pub const DEFAULT_RULES_FILES: [&str; 2] = [".gitignore", ".ndcbignore"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsConfig {
    /// Source roots in precedence order. Relative roots are resolved against
    /// the directory passed to [`FsConfig::build`].
    pub roots: Vec<PathBuf>,
    /// Names of `.gitignore`-syntax files read from each directory.
    pub rules_files: Vec<String>,
    /// Files with these extensions are excluded everywhere.
    pub exclude_extensions: Vec<Extension>,
    /// Entries with a segment (below a root) starting with any of these are
    /// excluded.
    pub exclude_segment_prefixes: Vec<String>,
    pub cache: CacheConfig,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            rules_files: DEFAULT_RULES_FILES.iter().map(|name| name.to_string()).collect(),
            exclude_extensions: Vec::new(),
            exclude_segment_prefixes: Vec::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl FsConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| FsError::Config {
            message: err.to_string(),
        })
    }

    /// Roots as absolute paths, relative ones resolved against `base`.
    pub fn resolved_roots(&self, base: &AbsolutePath) -> Vec<AbsolutePath> {
        self.roots
            .iter()
            .map(|root| AbsolutePath::resolve(base, root))
            .collect()
    }

    /// Assemble the layered file system over `backend`.
    ///
    /// The backend is wrapped in a [`CachedBackend`] when caching is enabled.
    /// Fails before touching the backend if no roots are configured or two
    /// roots overlap.
    pub fn build(&self, base: &AbsolutePath, backend: Arc<dyn Backend>) -> Result<CompositeFileSystem> {
        let roots = self.resolved_roots(base);
        if roots.is_empty() {
            return Err(FsError::Config {
                message: "no source roots configured".to_string(),
            });
        }
        validate_roots(&roots)?;

        let backend: Arc<dyn Backend> = if self.cache.enabled {
            Arc::new(CachedBackend::new(backend, &self.cache))
        } else {
            backend
        };
        let rules_files: Arc<dyn DirectoryRuleReader> = Arc::new(
            RulesFileReader::new(backend.clone(), self.rules_files.iter().cloned())
                .with_capacity(if self.cache.enabled { self.cache.rules_capacity } else { 0 }),
        );
        let extensions: HashSet<Extension> = self.exclude_extensions.iter().cloned().collect();

        let layers = roots
            .into_iter()
            .map(|root| {
                let span = tracing::info_span!("source_root", root = %root);
                let static_rule = ExclusionRule::compose([
                    ExclusionRule::segment_prefixes(root.clone(), self.exclude_segment_prefixes.clone()),
                    ExclusionRule::extensions(extensions.clone()),
                ]);
                let directory = Directory::new(root);

                let mut readers = RuleReaders::new(vec![rules_files.clone()]);
                if !static_rule.is_never() {
                    readers.push(Arc::new(StaticRuleReader::new(directory.clone(), static_rule)));
                }

                let rooted = RootedFileSystem::new(directory, backend.clone()).with_span(span);
                Arc::new(ExcludedFileSystem::new(rooted, Arc::new(readers))) as Arc<dyn FileSystem>
            })
            .collect::<Vec<_>>();

        info!(layers = layers.len(), cache = self.cache.enabled, "source file system ready");
        Ok(CompositeFileSystem::new(layers))
    }
}
