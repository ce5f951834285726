//! ndcb-path: path value types shared by every ndcb layer.
//!
//! Provides:
//! - **AbsolutePath**: normalized absolute path, compared and hashed as a string
//! - **RelativePath**: normalized pathname relative to an implicit root
//! - **Extension**: a leading-dot file extension (`.md`), usable as a map key
//! - **ExtensionChange**: how a pathname's extension should be rewritten
//!
//! All types are immutable values. Normalization is purely lexical: `.` is
//! dropped, `..` pops the previous segment, and separators are always `/`.
//! Nothing in this crate touches the filesystem.

mod absolute;
mod extension;
mod relative;

pub use absolute::AbsolutePath;
pub use extension::{Extension, ExtensionChange};
pub use relative::{RelativePath, Upward};

use thiserror::Error;

/// Errors from constructing path values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is not absolute: {path}")]
    NotAbsolute { path: String },
    #[error("invalid extension: {extension:?}")]
    InvalidExtension { extension: String },
}

/// Split `path` into normalized segments.
///
/// `..` pops a preceding normal segment. When there is nothing to pop it is
/// dropped for rooted paths and kept for relative ones, so that a relative
/// pathname escaping its root stays detectable.
pub(crate) fn normalize_segments(path: &str, rooted: bool) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push("..".to_string()),
            },
            normal => segments.push(normal.to_string()),
        }
    }
    segments
}

/// Index of the extension dot in `name`, if it has one.
///
/// Dotfiles (`.gitignore`) and names ending in a dot have no extension.
pub(crate) fn extension_start(name: &str) -> Option<usize> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == name.len() => None,
        Some(idx) => Some(idx),
    }
}
