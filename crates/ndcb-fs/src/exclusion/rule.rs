//! In-memory exclusion predicates.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ndcb_path::{AbsolutePath, Extension};

use crate::entry::Entry;

type Predicate = dyn Fn(&Entry) -> bool + Send + Sync;

/// A predicate deciding whether an entry is hidden.
///
/// Cheap to clone. The never-excluding rule carries no predicate at all so
/// composing it away costs nothing.
#[derive(Clone, Default)]
pub struct ExclusionRule {
    predicate: Option<Arc<Predicate>>,
}

impl ExclusionRule {
    /// A rule that excludes nothing.
    pub fn never() -> Self {
        Self { predicate: None }
    }

    pub fn new(predicate: impl Fn(&Entry) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn excludes(&self, entry: &Entry) -> bool {
        self.predicate.as_ref().is_some_and(|predicate| predicate(entry))
    }

    pub fn is_never(&self) -> bool {
        self.predicate.is_none()
    }

    /// Exclude an entry iff at least one of `rules` does. Empty ⇒ never.
    pub fn compose(rules: impl IntoIterator<Item = ExclusionRule>) -> Self {
        let mut rules: Vec<ExclusionRule> = rules.into_iter().filter(|rule| !rule.is_never()).collect();
        match rules.len() {
            0 => Self::never(),
            1 => rules.pop().unwrap_or_default(),
            _ => Self::new(move |entry| rules.iter().any(|rule| rule.excludes(entry))),
        }
    }

    pub fn or(self, other: ExclusionRule) -> Self {
        Self::compose([self, other])
    }

    /// Exclude entries with a segment below `base` matching `predicate`.
    ///
    /// Segments of `base` itself are not inspected, so a site living under a
    /// hidden directory is not excluded wholesale.
    pub fn segments(
        base: AbsolutePath,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |entry| {
            entry
                .path()
                .relative_to(&base)
                .is_some_and(|pathname| pathname.segments().any(&predicate))
        })
    }

    /// Exclude entries with a segment below `base` starting with any of `prefixes`.
    pub fn segment_prefixes(base: AbsolutePath, prefixes: Vec<String>) -> Self {
        if prefixes.is_empty() {
            return Self::never();
        }
        Self::segments(base, move |segment| {
            prefixes.iter().any(|prefix| segment.starts_with(prefix.as_str()))
        })
    }

    /// Exclude files whose extension is in `extensions`. Directories are kept.
    pub fn extensions(extensions: HashSet<Extension>) -> Self {
        if extensions.is_empty() {
            return Self::never();
        }
        Self::new(move |entry| {
            entry.is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|extension| extensions.contains(&extension))
        })
    }

    /// Exclude exactly the given paths.
    pub fn paths(paths: HashSet<AbsolutePath>) -> Self {
        if paths.is_empty() {
            return Self::never();
        }
        Self::new(move |entry| paths.contains(entry.path()))
    }
}

impl fmt::Debug for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            f.write_str("ExclusionRule(never)")
        } else {
            f.write_str("ExclusionRule(..)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Directory, File};

    fn abs(s: &str) -> AbsolutePath {
        AbsolutePath::new(s).unwrap()
    }

    fn file(s: &str) -> Entry {
        Entry::File(File::new(abs(s)))
    }

    fn dir(s: &str) -> Entry {
        Entry::Directory(Directory::new(abs(s)))
    }

    #[test]
    fn empty_composition_never_excludes() {
        let rule = ExclusionRule::compose([]);
        assert!(rule.is_never());
        assert!(!rule.excludes(&file("/a")));
    }

    #[test]
    fn composition_is_or() {
        let a = ExclusionRule::paths(HashSet::from([abs("/a")]));
        let b = ExclusionRule::paths(HashSet::from([abs("/b")]));
        let rule = ExclusionRule::compose([a, ExclusionRule::never(), b]);

        assert!(rule.excludes(&file("/a")));
        assert!(rule.excludes(&file("/b")));
        assert!(!rule.excludes(&file("/c")));
    }

    #[test]
    fn segment_prefixes_below_base_only() {
        let rule = ExclusionRule::segment_prefixes(abs("/home/.sites/blog"), vec![".".into(), "_".into()]);

        assert!(rule.excludes(&dir("/home/.sites/blog/.git")));
        assert!(rule.excludes(&file("/home/.sites/blog/_drafts/a.md")));
        assert!(!rule.excludes(&file("/home/.sites/blog/posts/a.md")));
        assert!(!rule.excludes(&dir("/home/.sites/blog")));
    }

    #[test]
    fn extensions_apply_to_files_only() {
        let rule = ExclusionRule::extensions(HashSet::from([Extension::new(".bak").unwrap()]));

        assert!(rule.excludes(&file("/site/a.bak")));
        assert!(!rule.excludes(&dir("/site/old.bak")));
        assert!(!rule.excludes(&file("/site/a.md")));
    }
}
