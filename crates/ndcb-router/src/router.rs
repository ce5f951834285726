//! Source pathname resolution: candidates, probing, 404 fallback.

use std::sync::Arc;

use ndcb_fs::{FileSystem, Result};
use ndcb_path::{Extension, RelativePath};
use tracing::{debug, trace};

use crate::extensions::ExtensionMap;

const INDEX: &str = "index.html";
const NOT_FOUND: &str = "404.html";

/// Resolves request pathnames against a file system.
///
/// Probing is sequential and stops at the first candidate that exists:
/// candidate order is precedence, so an extensionless match beats a
/// directory index.
pub struct Router<F: ?Sized> {
    fs: Arc<F>,
    extensions: ExtensionMap,
}

impl<F: FileSystem + ?Sized> Router<F> {
    pub fn new(fs: Arc<F>, extensions: ExtensionMap) -> Self {
        Self { fs, extensions }
    }

    pub fn file_system(&self) -> &Arc<F> {
        &self.fs
    }

    pub fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    /// Source pathnames that could serve `query`, highest precedence first.
    ///
    /// For each of `query`, `query.html` (only when `query` is non-empty and
    /// has no extension) and `query/index.html`, the candidate itself is
    /// followed by the same pathname with each source extension that maps
    /// to its extension.
    pub fn possible_source_pathnames(&self, query: &RelativePath) -> Vec<RelativePath> {
        let html = Extension::html();
        let mut bases = vec![query.clone()];
        if !query.is_empty() && query.extension().is_none() {
            bases.push(query.with_extension(&html));
        }
        bases.push(query.join(INDEX));

        let mut candidates: Vec<RelativePath> = Vec::new();
        for base in bases {
            let sources: Vec<RelativePath> = match base.extension() {
                Some(extension) => self
                    .extensions
                    .sources_for(&extension)
                    .map(|source| base.with_extension(source))
                    .collect(),
                None => Vec::new(),
            };
            for candidate in std::iter::once(base).chain(sources) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// The first existing candidate for `query`.
    pub async fn source_pathname(&self, query: &RelativePath) -> Result<Option<RelativePath>> {
        for candidate in self.possible_source_pathnames(query) {
            if self.fs.file_exists(&candidate).await? {
                debug!(%query, source = %candidate, "routed");
                return Ok(Some(candidate));
            }
            trace!(%query, %candidate, "no source");
        }
        Ok(None)
    }

    /// The nearest `404` page at or above `query`.
    ///
    /// Checks `query/404.html`, then each ancestor's, ending at the root's.
    pub async fn source_pathname_404(&self, query: &RelativePath) -> Result<Option<RelativePath>> {
        for ancestor in query.upward() {
            if let Some(source) = self.source_pathname(&ancestor.join(NOT_FOUND)).await? {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }

    /// The output pathname for a source pathname.
    pub fn destination_pathname(&self, source: &RelativePath) -> RelativePath {
        self.extensions.destination_pathname(source)
    }
}

/// The pathname a request URL path addresses.
///
/// Query strings and fragments are dropped; leading and trailing slashes and
/// dot segments are normalized away, so `/fr-CA/` becomes `fr-CA`.
pub fn query_pathname(url_path: &str) -> RelativePath {
    let path = url_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    RelativePath::new(path)
}
