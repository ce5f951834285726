//! ndcb-fs: the source file system of a static site.
//!
//! A site's sources live under one or more root directories. This crate
//! presents them as a single read-only tree addressed by root-relative
//! pathnames, with three concerns stacked on top of a raw [`Backend`]:
//!
//! - **Caching** ([`CachedBackend`]): file contents, decoded text and
//!   directory listings are kept until the path's change time moves.
//! - **Exclusion** ([`ExcludedFileSystem`]): `.gitignore`-style rules files
//!   and configured rules hide entries; a hidden directory hides its subtree.
//! - **Layering** ([`CompositeFileSystem`]): several roots, consulted in
//!   order, with earlier roots shadowing later ones.
//!
//! ```text
//! CompositeFileSystem
//!   └── ExcludedFileSystem (per root)
//!         └── RootedFileSystem
//!               └── CachedBackend ── LocalBackend | MemoryBackend
//! ```
//!
//! [`FsConfig::build`] assembles the whole stack from configuration.

pub mod backend;
pub mod cache;
pub mod composite;
pub mod config;
pub mod entry;
pub mod error;
pub mod excluded;
pub mod exclusion;
pub mod filesystem;
pub mod rooted;
mod walk;

pub use backend::{Backend, ChangeTime, LocalBackend, MemoryBackend, PathStatus};
pub use cache::{CacheConfig, CacheStats, CachedBackend, ChangeTimeCache};
pub use composite::{CompositeFileSystem, validate_roots};
pub use config::FsConfig;
pub use entry::{Directory, Entry, EntryKind, File};
pub use error::{FsError, Result};
pub use excluded::ExcludedFileSystem;
pub use exclusion::{
    DirectoryRuleReader, ExclusionRule, RuleReaders, RulesFileReader, StaticRuleReader,
    deep_exclusion_rule, is_excluded,
};
pub use filesystem::{FileBatches, FileSystem};
pub use rooted::RootedFileSystem;
