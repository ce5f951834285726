//! Source to destination extension mapping.

use ndcb_path::{Extension, ExtensionChange, RelativePath};
use serde::Deserialize;

/// One `source → destination` pair, e.g. `.md → .html`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionMapping {
    pub source: Extension,
    pub destination: Extension,
}

/// Router settings, the `[router]` table of a site config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Candidate order follows this order.
    pub extensions: Vec<ExtensionMapping>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            extensions: vec![ExtensionMapping {
                source: Extension::markdown(),
                destination: Extension::html(),
            }],
        }
    }
}

/// Ordered `source → destination` extension pairs.
///
/// A source extension maps to the destination of its first pair; several
/// sources may share one destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMap {
    pairs: Vec<(Extension, Extension)>,
}

impl ExtensionMap {
    pub fn new(pairs: impl IntoIterator<Item = (Extension, Extension)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// The destination extension for `source`, if mapped.
    pub fn destination_for(&self, source: &Extension) -> Option<&Extension> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == source)
            .map(|(_, destination)| destination)
    }

    /// Every source extension that maps to `destination`, in order.
    pub fn sources_for<'a>(&'a self, destination: &'a Extension) -> impl Iterator<Item = &'a Extension> + 'a {
        self.pairs
            .iter()
            .filter(move |(source, mapped)| {
                mapped == destination && self.destination_for(source) == Some(mapped)
            })
            .map(|(source, _)| source)
    }

    /// Rewrite a source pathname's extension to its destination.
    pub fn destination_pathname(&self, source: &RelativePath) -> RelativePath {
        let change = source
            .extension()
            .and_then(|extension| self.destination_for(&extension).cloned())
            .map_or(ExtensionChange::Preserve, ExtensionChange::Replace);
        source.map_extension(&change)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<&RouterConfig> for ExtensionMap {
    fn from(config: &RouterConfig) -> Self {
        Self::new(
            config
                .extensions
                .iter()
                .map(|mapping| (mapping.source.clone(), mapping.destination.clone())),
        )
    }
}
