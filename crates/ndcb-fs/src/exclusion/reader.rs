//! Per-directory rule sources.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{ExclusionRule, parse_gitignore};
use crate::backend::Backend;
use crate::cache::{ChangeTimeCache, DEFAULT_RULES_CAPACITY};
use crate::entry::{Directory, EntryKind, File};
use crate::error::Result;

/// Produces the rule local to one directory.
///
/// The rule applies to entries strictly inside `directory`. Readers never
/// look at ancestors; accumulation happens in [`super::children_rule`].
#[async_trait]
pub trait DirectoryRuleReader: Send + Sync {
    async fn read_rule(&self, directory: &Directory) -> Result<ExclusionRule>;
}

#[async_trait]
impl<R: DirectoryRuleReader + ?Sized> DirectoryRuleReader for Arc<R> {
    async fn read_rule(&self, directory: &Directory) -> Result<ExclusionRule> {
        (**self).read_rule(directory).await
    }
}

/// Reads named rules files out of each directory.
///
/// Every name is parsed with `.gitignore` syntax. Missing files contribute
/// nothing. Parsed rules are kept per file and reused while the file's
/// change time is unchanged.
pub struct RulesFileReader<B> {
    backend: B,
    file_names: Vec<String>,
    parsed: ChangeTimeCache<ExclusionRule>,
}

impl<B: Backend> RulesFileReader<B> {
    pub fn new<S: Into<String>>(backend: B, file_names: impl IntoIterator<Item = S>) -> Self {
        Self {
            backend,
            file_names: file_names.into_iter().map(Into::into).collect(),
            parsed: ChangeTimeCache::new(DEFAULT_RULES_CAPACITY, |_| 1),
        }
    }

    /// Keep at most `capacity` parsed rules files. Zero disables reuse.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.parsed = ChangeTimeCache::new(capacity, |_| 1);
        self
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    async fn read_one(&self, file: &File) -> Result<ExclusionRule> {
        let status = match self.backend.status(file.path()).await {
            Ok(status) => status,
            Err(err) if err.is_not_found() => return Ok(ExclusionRule::never()),
            Err(err) => return Err(err),
        };
        if status.kind != Some(EntryKind::File) {
            return Ok(ExclusionRule::never());
        }
        if let Some(rule) = self.parsed.get(file.path(), status.change_time) {
            return Ok(rule);
        }

        let contents = match self.backend.read_text_file(file).await {
            Ok(contents) => contents,
            // removed between the stat and the read
            Err(err) if err.is_not_found() => return Ok(ExclusionRule::never()),
            Err(err) => return Err(err),
        };
        let rule = parse_gitignore(file, &contents)?;
        debug!(file = %file.path(), "parsed rules file");
        self.parsed
            .insert(file.path().clone(), status.change_time, rule.clone());
        Ok(rule)
    }
}

#[async_trait]
impl<B: Backend> DirectoryRuleReader for RulesFileReader<B> {
    async fn read_rule(&self, directory: &Directory) -> Result<ExclusionRule> {
        let mut rules = Vec::with_capacity(self.file_names.len());
        for name in &self.file_names {
            rules.push(self.read_one(&directory.file(name)).await?);
        }
        Ok(ExclusionRule::compose(rules))
    }
}

/// A fixed rule attached to a single directory.
///
/// Used for configured exclusions (segment prefixes, extensions) which are
/// anchored at a source root.
#[derive(Debug, Clone)]
pub struct StaticRuleReader {
    directory: Directory,
    rule: ExclusionRule,
}

impl StaticRuleReader {
    pub fn new(directory: Directory, rule: ExclusionRule) -> Self {
        Self { directory, rule }
    }
}

#[async_trait]
impl DirectoryRuleReader for StaticRuleReader {
    async fn read_rule(&self, directory: &Directory) -> Result<ExclusionRule> {
        if *directory == self.directory {
            Ok(self.rule.clone())
        } else {
            Ok(ExclusionRule::never())
        }
    }
}

/// Several readers whose rules are OR-ed together.
#[derive(Clone, Default)]
pub struct RuleReaders {
    readers: Vec<Arc<dyn DirectoryRuleReader>>,
}

impl RuleReaders {
    pub fn new(readers: Vec<Arc<dyn DirectoryRuleReader>>) -> Self {
        Self { readers }
    }

    pub fn push(&mut self, reader: Arc<dyn DirectoryRuleReader>) {
        self.readers.push(reader);
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

#[async_trait]
impl DirectoryRuleReader for RuleReaders {
    async fn read_rule(&self, directory: &Directory) -> Result<ExclusionRule> {
        let mut rules = Vec::with_capacity(self.readers.len());
        for reader in &self.readers {
            rules.push(reader.read_rule(directory).await?);
        }
        Ok(ExclusionRule::compose(rules))
    }
}
