//! `ndcb.toml` site configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndcb_fs::FsConfig;
use ndcb_router::RouterConfig;
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "ndcb.toml";

/// Root used when no config file exists.
pub const DEFAULT_ROOT: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub source: FsConfig,
    pub router: RouterConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: FsConfig {
                roots: vec![PathBuf::from(DEFAULT_ROOT)],
                ..FsConfig::default()
            },
            router: RouterConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid site configuration")
    }

    /// Read `path`. A missing default config file yields the defaults; a
    /// missing explicit one is an error.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("failed to load {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}
