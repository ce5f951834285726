//! File and directory entries.

use std::fmt;

use ndcb_path::AbsolutePath;

/// A file, identified by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(AbsolutePath);

/// A directory, identified by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Directory(AbsolutePath);

/// Kind of entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// A file or a directory.
///
/// Both variants are plain path holders; the tag decides how existence is
/// checked and how the entry is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entry {
    File(File),
    Directory(Directory),
}

impl File {
    pub fn new(path: AbsolutePath) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &AbsolutePath {
        &self.0
    }

    pub fn into_path(self) -> AbsolutePath {
        self.0
    }

    /// The directory containing this file.
    pub fn directory(&self) -> Directory {
        Directory(self.0.parent().unwrap_or_else(AbsolutePath::root))
    }

    pub fn name(&self) -> &str {
        self.0.file_name().unwrap_or_default()
    }
}

impl Directory {
    pub fn new(path: AbsolutePath) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &AbsolutePath {
        &self.0
    }

    pub fn into_path(self) -> AbsolutePath {
        self.0
    }

    /// The child file `name`.
    pub fn file(&self, name: &str) -> File {
        File(self.0.child(name))
    }

    /// The child directory `name`.
    pub fn directory(&self, name: &str) -> Directory {
        Directory(self.0.child(name))
    }

    /// The containing directory, `None` for the filesystem root.
    pub fn parent(&self) -> Option<Directory> {
        self.0.parent().map(Directory)
    }

    /// Every directory from the filesystem root down to `self`, inclusive.
    pub fn lineage(&self) -> Vec<Directory> {
        self.0.lineage().into_iter().map(Directory).collect()
    }
}

impl Entry {
    pub fn path(&self) -> &AbsolutePath {
        match self {
            Entry::File(file) => file.path(),
            Entry::Directory(directory) => directory.path(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File(_) => EntryKind::File,
            Entry::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    /// The containing directory, `None` for the filesystem root.
    pub fn parent(&self) -> Option<Directory> {
        self.path().parent().map(Directory)
    }

    pub fn name(&self) -> &str {
        self.path().file_name().unwrap_or_default()
    }

    /// Build an entry of `kind` at `path`.
    pub fn with_kind(kind: EntryKind, path: AbsolutePath) -> Self {
        match kind {
            EntryKind::File => Entry::File(File(path)),
            EntryKind::Directory => Entry::Directory(Directory(path)),
        }
    }
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        Entry::File(file)
    }
}

impl From<Directory> for Entry {
    fn from(directory: Directory) -> Self {
        Entry::Directory(directory)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.0.as_str().trim_end_matches('/'))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::File(file) => file.fmt(f),
            Entry::Directory(directory) => directory.fmt(f),
        }
    }
}
