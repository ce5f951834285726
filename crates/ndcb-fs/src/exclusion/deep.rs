//! Rules accumulated along an entry's lineage.

use super::{DirectoryRuleReader, ExclusionRule};
use crate::entry::{Directory, Entry};
use crate::error::Result;

/// The OR of every directory rule from the filesystem root down to the
/// entry's parent.
///
/// This is the flat view: it does not by itself hide entries below an
/// excluded directory. Use [`is_excluded`] for the transitive answer.
pub async fn deep_exclusion_rule<R>(reader: &R, entry: &Entry) -> Result<ExclusionRule>
where
    R: DirectoryRuleReader + ?Sized,
{
    let Some(parent) = entry.parent() else {
        return Ok(ExclusionRule::never());
    };
    let mut rules = Vec::new();
    for directory in parent.lineage() {
        rules.push(reader.read_rule(&directory).await?);
    }
    Ok(ExclusionRule::compose(rules))
}

/// The rule to apply to the children of `directory`, or `None` when
/// `directory` is itself excluded by an ancestor.
///
/// Walks down from the filesystem root, checking each directory against the
/// rules gathered so far before adding its own. Rules files inside an
/// excluded directory are never read.
pub async fn children_rule<R>(reader: &R, directory: &Directory) -> Result<Option<ExclusionRule>>
where
    R: DirectoryRuleReader + ?Sized,
{
    let mut accumulated = ExclusionRule::never();
    for ancestor in directory.lineage() {
        if accumulated.excludes(&Entry::Directory(ancestor.clone())) {
            return Ok(None);
        }
        accumulated = accumulated.or(reader.read_rule(&ancestor).await?);
    }
    Ok(Some(accumulated))
}

/// True if `entry` or any of its ancestors is excluded.
pub async fn is_excluded<R>(reader: &R, entry: &Entry) -> Result<bool>
where
    R: DirectoryRuleReader + ?Sized,
{
    let Some(parent) = entry.parent() else {
        return Ok(false);
    };
    Ok(match children_rule(reader, &parent).await? {
        Some(rule) => rule.excludes(entry),
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::entry::File;
    use crate::exclusion::RulesFileReader;
    use ndcb_path::AbsolutePath;

    fn abs(s: &str) -> AbsolutePath {
        AbsolutePath::new(s).unwrap()
    }

    fn file(s: &str) -> Entry {
        Entry::File(File::new(abs(s)))
    }

    async fn reader() -> (Arc<MemoryBackend>, RulesFileReader<Arc<MemoryBackend>>) {
        let backend = Arc::new(MemoryBackend::new());
        backend.write(&abs("/site/.gitignore"), "drafts/\n").await.unwrap();
        // re-includes everything below drafts, but drafts itself is gone
        backend.write(&abs("/site/drafts/.gitignore"), "!*\n").await.unwrap();
        backend.write(&abs("/site/drafts/a.md"), "").await.unwrap();
        backend.write(&abs("/site/posts/.gitignore"), "*.tmp\n").await.unwrap();
        backend.write(&abs("/site/posts/a.md"), "").await.unwrap();
        let reader = RulesFileReader::new(backend.clone(), [".gitignore"]);
        (backend, reader)
    }

    #[tokio::test]
    async fn deep_rule_gathers_every_ancestor() {
        let (_, reader) = reader().await;

        let rule = deep_exclusion_rule(&reader, &file("/site/posts/x.tmp")).await.unwrap();
        assert!(rule.excludes(&file("/site/posts/x.tmp")));
        assert!(rule.excludes(&Entry::Directory(Directory::new(abs("/site/posts/drafts")))));
    }

    #[tokio::test]
    async fn exclusion_is_transitive() {
        let (_, reader) = reader().await;

        assert!(is_excluded(&reader, &file("/site/drafts/a.md")).await.unwrap());
        assert!(is_excluded(&reader, &file("/site/posts/b.tmp")).await.unwrap());
        assert!(!is_excluded(&reader, &file("/site/posts/a.md")).await.unwrap());
    }

    #[tokio::test]
    async fn rules_inside_excluded_directories_are_not_read() {
        let (backend, reader) = reader().await;

        let rule = children_rule(&reader, &Directory::new(abs("/site/drafts"))).await.unwrap();
        assert!(rule.is_none());
        assert_eq!(backend.read_count(&abs("/site/drafts/.gitignore")), 0);
    }

    #[tokio::test]
    async fn filesystem_root_is_never_excluded() {
        let (_, reader) = reader().await;
        let root = Entry::Directory(Directory::new(AbsolutePath::root()));
        assert!(!is_excluded(&reader, &root).await.unwrap());
    }
}
