//! ndcb-cli: the `ndcb` command.
//!
//! A thin adapter that loads `ndcb.toml`, assembles the source file system
//! and router, and prints what they answer.

pub mod cli;
pub mod config;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use ndcb_fs::{Backend, CompositeFileSystem, Entry, FileSystem, LocalBackend};
use ndcb_path::{AbsolutePath, RelativePath};
use ndcb_router::{ExtensionMap, Router, query_pathname};
use serde::Serialize;
use tracing::warn;

use cli::{Cli, Command};
use config::{CONFIG_FILE, SiteConfig};

/// A loaded site: its source file system and router.
pub struct Site {
    fs: Arc<CompositeFileSystem>,
    router: Router<CompositeFileSystem>,
}

impl Site {
    /// Build a site over `backend`, resolving relative roots against `base`.
    pub fn new(config: &SiteConfig, base: &AbsolutePath, backend: Arc<dyn Backend>) -> Result<Self> {
        let fs = Arc::new(
            config
                .source
                .build(base, backend)
                .context("failed to assemble source roots")?,
        );
        let router = Router::new(fs.clone(), ExtensionMap::from(&config.router));
        Ok(Self { fs, router })
    }

    /// Load the config at `path` (or `./ndcb.toml`) and open the site on disk.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read working directory")?;
        let explicit = path.is_some();
        let path: PathBuf = cwd.join(path.unwrap_or(Path::new(CONFIG_FILE)));
        let config = SiteConfig::load(&path, explicit)?;

        let base = path.parent().unwrap_or(cwd.as_path());
        let base = AbsolutePath::new(base)
            .with_context(|| format!("not an absolute path: {}", base.display()))?;
        Self::new(&config, &base, Arc::new(LocalBackend::new()))
    }

    pub fn file_system(&self) -> &Arc<CompositeFileSystem> {
        &self.fs
    }

    pub fn router(&self) -> &Router<CompositeFileSystem> {
        &self.router
    }
}

#[derive(Serialize)]
struct FileRecord {
    pathname: String,
    path: String,
}

/// Run `cli` against the site its config describes.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let site = Site::open(cli.config.as_deref())?;
    execute(&site, cli.command, out).await
}

/// Run one command against an open site.
pub async fn execute(site: &Site, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Files { json } => files(site, json, out).await,
        Command::Resolve { url } => resolve(site, &url, out).await,
        Command::NotFound { url } => not_found(site, &url, out).await,
        Command::Ls { pathname } => list(site, &RelativePath::new(&pathname), out).await,
        Command::Cat { pathname } => {
            let text = site
                .fs
                .read_text_file(&RelativePath::new(&pathname))
                .await
                .with_context(|| format!("failed to read {pathname}"))?;
            out.write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

async fn files(site: &Site, json: bool, out: &mut dyn Write) -> Result<()> {
    let mut records = Vec::new();
    let mut failures = 0usize;
    let mut batches = site.fs.files();
    while let Some(batch) = batches.next().await {
        match batch {
            Ok(files) => {
                for file in files {
                    let pathname = site
                        .fs
                        .pathname(&Entry::File(file.clone()))
                        .map(String::from)
                        .unwrap_or_default();
                    records.push(FileRecord {
                        pathname,
                        path: file.path().to_string(),
                    });
                }
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory");
                failures += 1;
            }
        }
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
    } else {
        for record in &records {
            writeln!(out, "{}", record.pathname)?;
        }
    }

    if failures > 0 {
        bail!("{failures} directories could not be read");
    }
    Ok(())
}

async fn resolve(site: &Site, url: &str, out: &mut dyn Write) -> Result<()> {
    let query = query_pathname(url);
    let Some(source) = site.router.source_pathname(&query).await? else {
        bail!("no source serves {url}");
    };
    let destination = site.router.destination_pathname(&source);
    writeln!(out, "{source} -> {destination}")?;
    Ok(())
}

async fn not_found(site: &Site, url: &str, out: &mut dyn Write) -> Result<()> {
    let query = query_pathname(url);
    let Some(source) = site.router.source_pathname_404(&query).await? else {
        bail!("no 404 page at or above {url}");
    };
    writeln!(out, "{source}")?;
    Ok(())
}

async fn list(site: &Site, pathname: &RelativePath, out: &mut dyn Write) -> Result<()> {
    let entries = site
        .fs
        .read_directory(pathname)
        .await
        .with_context(|| format!("failed to list '{pathname}'"))?;
    for entry in entries {
        match entry {
            Entry::File(_) => writeln!(out, "{}", entry.name())?,
            Entry::Directory(_) => writeln!(out, "{}/", entry.name())?,
        }
    }
    Ok(())
}
