//! Pathnames relative to an implicit root.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Extension, ExtensionChange, extension_start, normalize_segments};

/// A normalized pathname relative to some root.
///
/// The empty pathname denotes the root itself. Pathnames are routing keys
/// as much as file locations: `fr-CA/index.md` is both.
///
/// Leading `..` segments survive normalization (`../x` stays `../x`), so a
/// pathname that would escape its root can be detected with
/// [`RelativePath::escapes`] instead of silently resolving elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// Normalize `path`. A leading `/` is ignored.
    pub fn new(path: &str) -> Self {
        Self {
            inner: normalize_segments(path, false).join("/"),
        }
    }

    /// The empty pathname.
    pub fn root() -> Self {
        Self::default()
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// True for the empty pathname.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True if resolving this pathname climbs above its root.
    pub fn escapes(&self) -> bool {
        self.segments().next() == Some("..")
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// `self/other`, normalized.
    pub fn join(&self, other: &str) -> RelativePath {
        if self.inner.is_empty() {
            Self::new(other)
        } else {
            Self::new(&format!("{}/{}", self.inner, other))
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The containing pathname, `None` for the root.
    pub fn parent(&self) -> Option<RelativePath> {
        if self.inner.is_empty() {
            return None;
        }
        Some(match self.inner.rfind('/') {
            Some(idx) => Self {
                inner: self.inner[..idx].to_string(),
            },
            None => Self::root(),
        })
    }

    /// Successive `dirname` truncations: `a/b/c`, `a/b`, `a`, ``.
    pub fn upward(&self) -> Upward {
        Upward {
            next: Some(self.clone()),
        }
    }

    pub fn extension(&self) -> Option<Extension> {
        let name = self.file_name()?;
        let idx = extension_start(name)?;
        Extension::new(&name[idx..]).ok()
    }

    /// Rewrite the extension of the last segment.
    ///
    /// The root pathname has no last segment and is returned unchanged.
    pub fn map_extension(&self, change: &ExtensionChange) -> RelativePath {
        let Some(name) = self.file_name() else {
            return self.clone();
        };
        let stem_end = self.inner.len() - name.len() + extension_start(name).unwrap_or(name.len());
        let inner = match change {
            ExtensionChange::Preserve => return self.clone(),
            ExtensionChange::Append(ext) => format!("{}{}", self.inner, ext),
            ExtensionChange::Replace(ext) => format!("{}{}", &self.inner[..stem_end], ext),
            ExtensionChange::Strip => self.inner[..stem_end].to_string(),
        };
        Self { inner }
    }

    /// Shorthand for [`ExtensionChange::Replace`].
    pub fn with_extension(&self, extension: &Extension) -> RelativePath {
        self.map_extension(&ExtensionChange::Replace(extension.clone()))
    }
}

/// Iterator returned by [`RelativePath::upward`].
#[derive(Debug, Clone)]
pub struct Upward {
    next: Option<RelativePath>,
}

impl Iterator for Upward {
    type Item = RelativePath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for RelativePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RelativePath {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<RelativePath> for String {
    fn from(value: RelativePath) -> Self {
        value.inner
    }
}
