//! Depth-first directory walks as a stream of file batches.
//!
//! Each poll reads one directory and yields its files. Subdirectories go on
//! an explicit stack. With a rule reader attached, excluded entries are
//! dropped before they are yielded or descended into, and each subdirectory
//! carries the rules accumulated on the way down.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use ndcb_path::AbsolutePath;
use tracing::{Span, trace, warn};

use crate::backend::Backend;
use crate::entry::{Directory, Entry, File};
use crate::error::{FsError, Result};
use crate::exclusion::{DirectoryRuleReader, ExclusionRule, children_rule};
use crate::filesystem::FileBatches;

enum Frame {
    Directory {
        directory: Directory,
        rule: ExclusionRule,
    },
    /// Rules for a subtree could not be read; reported when popped.
    Failed(FsError),
}

enum Walk {
    Pending,
    Running(Vec<Frame>),
}

struct Walker {
    backend: Arc<dyn Backend>,
    rules: Option<Arc<dyn DirectoryRuleReader>>,
    root: Directory,
    visited: HashSet<AbsolutePath>,
    span: Span,
}

/// Walk everything below `root`.
///
/// A failed directory read yields `Err` and the walk goes on. A root that is
/// itself excluded yields nothing.
pub(crate) fn walk(
    backend: Arc<dyn Backend>,
    root: Directory,
    rules: Option<Arc<dyn DirectoryRuleReader>>,
    span: Span,
) -> FileBatches {
    let walker = Walker {
        backend,
        rules,
        root,
        visited: HashSet::new(),
        span,
    };
    stream::unfold((walker, Walk::Pending), |(mut walker, state)| async move {
        let mut stack = match state {
            Walk::Pending => match walker.start().await {
                Ok(Some(frame)) => vec![frame],
                Ok(None) => return None,
                Err(err) => return Some((Err(err), (walker, Walk::Running(Vec::new())))),
            },
            Walk::Running(stack) => stack,
        };
        let frame = stack.pop()?;
        let batch = walker.step(frame, &mut stack).await;
        Some((batch, (walker, Walk::Running(stack))))
    })
    .boxed()
}

impl Walker {
    async fn start(&mut self) -> Result<Option<Frame>> {
        let rule = match &self.rules {
            Some(rules) => match children_rule(rules.as_ref(), &self.root).await? {
                Some(rule) => rule,
                None => {
                    trace!(parent: &self.span, root = %self.root, "root is excluded");
                    return Ok(None);
                }
            },
            None => ExclusionRule::never(),
        };
        Ok(Some(Frame::Directory {
            directory: self.root.clone(),
            rule,
        }))
    }

    async fn step(&mut self, frame: Frame, stack: &mut Vec<Frame>) -> Result<Vec<File>> {
        let (directory, rule) = match frame {
            Frame::Directory { directory, rule } => (directory, rule),
            Frame::Failed(err) => return Err(err),
        };

        let canonical = match self.backend.canonical(&directory).await {
            Ok(canonical) => canonical,
            Err(err) => return Err(self.failed(&directory, err)),
        };
        if !self.visited.insert(canonical) {
            trace!(parent: &self.span, directory = %directory, "already visited");
            return Ok(Vec::new());
        }

        let entries = match self.backend.read_directory(&directory).await {
            Ok(entries) => entries,
            Err(err) => return Err(self.failed(&directory, err)),
        };

        let mut files = Vec::new();
        let mut subdirectories = Vec::new();
        for entry in entries {
            if rule.excludes(&entry) {
                continue;
            }
            match entry {
                Entry::File(file) => files.push(file),
                Entry::Directory(child) => subdirectories.push(child),
            }
        }

        // reversed so the stack pops children in listing order
        for child in subdirectories.into_iter().rev() {
            let frame = match &self.rules {
                Some(rules) => match rules.read_rule(&child).await {
                    Ok(local) => Frame::Directory {
                        directory: child,
                        rule: rule.clone().or(local),
                    },
                    Err(err) => Frame::Failed(err),
                },
                None => Frame::Directory {
                    directory: child,
                    rule: rule.clone(),
                },
            };
            stack.push(frame);
        }

        trace!(parent: &self.span, directory = %directory, files = files.len(), "walked");
        Ok(files)
    }

    fn failed(&self, directory: &Directory, err: FsError) -> FsError {
        warn!(parent: &self.span, directory = %directory, error = %err, "directory read failed");
        err
    }
}
