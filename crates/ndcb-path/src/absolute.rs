//! Normalized absolute paths.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Extension, PathError, RelativePath, extension_start, normalize_segments};

/// A normalized absolute path.
///
/// Created at system boundaries (CLI arguments, config files, directory
/// listings). Equality and hashing are those of the normalized string, so two
/// spellings of the same location (`/a/./b`, `/a/c/../b`) compare equal.
///
/// Separators are always `/`. A leading Windows drive prefix (`C:`) is kept
/// verbatim in front of the root separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AbsolutePath {
    inner: String,
    /// Byte length of the prefix plus root separator.
    root: usize,
}

impl AbsolutePath {
    /// Normalize `path`, failing if it is not absolute.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, PathError> {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let (prefix, rest) = split_drive(&raw);
        if !rest.starts_with('/') {
            return Err(PathError::NotAbsolute { path: raw });
        }
        let segments = normalize_segments(rest, true);
        Ok(Self::from_parts(prefix, segments.iter().map(String::as_str)))
    }

    /// Resolve `path` against `base` when it is relative.
    ///
    /// Used for config-relative paths: `content` in `/site/ndcb.toml`
    /// resolves to `/site/content`.
    pub fn resolve(base: &AbsolutePath, path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        match Self::new(&raw) {
            Ok(absolute) => absolute,
            Err(_) => base.join(&RelativePath::new(&raw)),
        }
    }

    /// The filesystem root, `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
            root: 1,
        }
    }

    fn from_parts<'a>(prefix: &str, segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut inner = format!("{prefix}/");
        let root = inner.len();
        let mut first = true;
        for segment in segments {
            if !first {
                inner.push('/');
            }
            inner.push_str(segment);
            first = false;
        }
        Self { inner, root }
    }

    fn prefix(&self) -> &str {
        &self.inner[..self.root - 1]
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Borrow as a platform path for I/O.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.inner)
    }

    /// True for the filesystem root.
    pub fn is_root(&self) -> bool {
        self.inner.len() == self.root
    }

    /// Path segments below the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner[self.root..].split('/').filter(|s| !s.is_empty())
    }

    /// The last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The extension of the last segment.
    pub fn extension(&self) -> Option<Extension> {
        let name = self.file_name()?;
        let idx = extension_start(name)?;
        Extension::new(&name[idx..]).ok()
    }

    /// The containing directory, `None` for the root.
    pub fn parent(&self) -> Option<AbsolutePath> {
        if self.is_root() {
            return None;
        }
        let cut = self.inner.rfind('/').unwrap_or(self.root - 1);
        if cut < self.root {
            Some(Self {
                inner: self.inner[..self.root].to_string(),
                root: self.root,
            })
        } else {
            Some(Self {
                inner: self.inner[..cut].to_string(),
                root: self.root,
            })
        }
    }

    /// Append a relative pathname, resolving its `..` segments.
    ///
    /// `..` never climbs above the filesystem root; callers that must stay
    /// inside a subtree check the result with [`AbsolutePath::is_within`].
    pub fn join(&self, pathname: &RelativePath) -> AbsolutePath {
        let mut segments: Vec<&str> = self.segments().collect();
        for segment in pathname.segments() {
            if segment == ".." {
                segments.pop();
            } else {
                segments.push(segment);
            }
        }
        Self::from_parts(self.prefix(), segments)
    }

    /// Child path `self/name`.
    pub fn child(&self, name: &str) -> AbsolutePath {
        self.join(&RelativePath::new(name))
    }

    /// True if `self` equals `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &AbsolutePath) -> bool {
        self.relative_to(ancestor).is_some()
    }

    /// The pathname of `self` below `ancestor`.
    ///
    /// `Some("")` when both are equal, `None` when `self` lies outside.
    pub fn relative_to(&self, ancestor: &AbsolutePath) -> Option<RelativePath> {
        if self.inner == ancestor.inner {
            return Some(RelativePath::root());
        }
        let rest = if ancestor.is_root() {
            self.inner.strip_prefix(ancestor.inner.as_str())?
        } else {
            self.inner
                .strip_prefix(ancestor.inner.as_str())?
                .strip_prefix('/')?
        };
        Some(RelativePath::new(rest))
    }

    /// Every ancestor from the filesystem root down to `self`, inclusive.
    pub fn lineage(&self) -> Vec<AbsolutePath> {
        let mut lineage = Vec::new();
        let mut current = Some(self.clone());
        while let Some(path) = current {
            current = path.parent();
            lineage.push(path);
        }
        lineage.reverse();
        lineage
    }
}

/// Split a leading `C:` drive designator off `raw`.
fn split_drive(raw: &str) -> (&str, &str) {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        raw.split_at(2)
    } else {
        ("", raw)
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl FromStr for AbsolutePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AbsolutePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AbsolutePath> for String {
    fn from(value: AbsolutePath) -> Self {
        value.inner
    }
}
