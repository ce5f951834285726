//! File extensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PathError;

/// A file extension including its leading dot, e.g. `.md`.
///
/// Accepts `md` or `.md` on construction; always stores the dotted form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Extension(String);

impl Extension {
    pub fn new(extension: &str) -> Result<Self, PathError> {
        let bare = extension.strip_prefix('.').unwrap_or(extension);
        if bare.is_empty() || bare.contains(['/', '\\']) || bare.starts_with('.') {
            return Err(PathError::InvalidExtension {
                extension: extension.to_string(),
            });
        }
        Ok(Self(format!(".{bare}")))
    }

    /// `.html`
    pub fn html() -> Self {
        Self(".html".to_string())
    }

    /// `.md`
    pub fn markdown() -> Self {
        Self(".md".to_string())
    }

    /// The dotted form, e.g. `.md`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Extension {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Extension {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Extension> for String {
    fn from(value: Extension) -> Self {
        value.0
    }
}

/// How to rewrite a pathname's extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionChange {
    /// Leave the pathname as is.
    Preserve,
    /// Add an extension after any existing one (`a.md` → `a.md.html`).
    Append(Extension),
    /// Swap the existing extension, or add one if missing (`a.md` → `a.html`).
    Replace(Extension),
    /// Drop the existing extension (`a.md` → `a`).
    Strip,
}
