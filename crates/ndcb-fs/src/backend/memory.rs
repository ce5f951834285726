//! In-memory backend.
//!
//! Used for tests and for sites assembled without touching disk. Every
//! mutation bumps a generation counter which doubles as the change-time
//! marker, so cache invalidation can be exercised deterministically.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ndcb_path::AbsolutePath;
use tokio::sync::RwLock;

use super::{Backend, ChangeTime, PathStatus};
use crate::entry::{Directory, Entry, EntryKind, File};
use crate::error::{FsError, Result};

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8>, generation: u64 },
    Directory { generation: u64 },
}

impl Node {
    fn status(&self) -> PathStatus {
        match self {
            Node::File { data, generation } => PathStatus {
                kind: Some(EntryKind::File),
                change_time: ChangeTime::new(i128::from(*generation), data.len() as u64),
            },
            Node::Directory { generation } => PathStatus {
                kind: Some(EntryKind::Directory),
                change_time: ChangeTime::new(i128::from(*generation), 0),
            },
        }
    }
}

/// In-memory tree of absolute paths.
///
/// Thread-safe via internal `RwLock`. The filesystem root always exists.
#[derive(Debug)]
pub struct MemoryBackend {
    nodes: RwLock<HashMap<AbsolutePath, Node>>,
    generation: AtomicU64,
    /// Raw `read_file` / `read_directory` calls per path.
    reads: Mutex<HashMap<AbsolutePath, usize>>,
    /// Paths whose every operation fails with the given error kind.
    faults: Mutex<HashMap<AbsolutePath, io::ErrorKind>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(AbsolutePath::root(), Node::Directory { generation: 0 });
        Self {
            nodes: RwLock::new(nodes),
            generation: AtomicU64::new(1),
            reads: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Insert missing ancestors of `path` and bump the parent's generation.
    fn ensure_parents(&self, nodes: &mut HashMap<AbsolutePath, Node>, path: &AbsolutePath) -> io::Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        for ancestor in parent.lineage() {
            match nodes.get(&ancestor) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {ancestor}"),
                    ));
                }
                None => {
                    if let Some(grandparent) = ancestor.parent() {
                        self.touch_node(nodes, &grandparent);
                    }
                    nodes.insert(
                        ancestor,
                        Node::Directory {
                            generation: self.next_generation(),
                        },
                    );
                }
            }
        }
        self.touch_node(nodes, &parent);
        Ok(())
    }

    fn touch_node(&self, nodes: &mut HashMap<AbsolutePath, Node>, path: &AbsolutePath) -> bool {
        let generation = self.next_generation();
        match nodes.get_mut(path) {
            Some(Node::File { generation: g, .. }) | Some(Node::Directory { generation: g }) => {
                *g = generation;
                true
            }
            None => false,
        }
    }

    /// Write a file, creating parent directories.
    pub async fn write(&self, path: &AbsolutePath, data: impl Into<Vec<u8>>) -> io::Result<()> {
        let mut nodes = self.nodes.write().await;
        if let Some(Node::Directory { .. }) = nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {path}"),
            ));
        }
        self.ensure_parents(&mut nodes, path)?;
        nodes.insert(
            path.clone(),
            Node::File {
                data: data.into(),
                generation: self.next_generation(),
            },
        );
        Ok(())
    }

    /// Create a directory and its parents.
    pub async fn mkdir(&self, path: &AbsolutePath) -> io::Result<()> {
        let mut nodes = self.nodes.write().await;
        match nodes.get(path) {
            Some(Node::Directory { .. }) => return Ok(()),
            Some(Node::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("file exists: {path}"),
                ));
            }
            None => {}
        }
        self.ensure_parents(&mut nodes, path)?;
        nodes.insert(
            path.clone(),
            Node::Directory {
                generation: self.next_generation(),
            },
        );
        Ok(())
    }

    /// Remove a file, or a directory with everything below it.
    pub async fn remove(&self, path: &AbsolutePath) -> io::Result<()> {
        if path.is_root() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove root directory",
            ));
        }
        let mut nodes = self.nodes.write().await;
        if nodes.remove(path).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {path}"),
            ));
        }
        nodes.retain(|candidate, _| !candidate.is_within(path));
        if let Some(parent) = path.parent() {
            self.touch_node(&mut nodes, &parent);
        }
        Ok(())
    }

    /// Bump the change-time marker of `path` without changing its content.
    pub async fn touch(&self, path: &AbsolutePath) -> io::Result<()> {
        let mut nodes = self.nodes.write().await;
        if self.touch_node(&mut nodes, path) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {path}"),
            ))
        }
    }

    /// Number of raw reads (file contents or directory listings) of `path`.
    pub fn read_count(&self, path: &AbsolutePath) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Make every operation on `path` fail with `kind` until cleared.
    pub fn inject_fault(&self, path: &AbsolutePath, kind: io::ErrorKind) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(path.clone(), kind);
        }
    }

    pub fn clear_fault(&self, path: &AbsolutePath) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.remove(path);
        }
    }

    fn check_fault(&self, path: &AbsolutePath) -> Result<()> {
        let fault = self
            .faults
            .lock()
            .ok()
            .and_then(|faults| faults.get(path).copied());
        match fault {
            Some(kind) => Err(FsError::from_io(path, io::Error::from(kind))),
            None => Ok(()),
        }
    }

    fn record_read(&self, path: &AbsolutePath) {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(path.clone()).or_insert(0) += 1;
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read_file(&self, file: &File) -> Result<Vec<u8>> {
        let path = file.path();
        self.check_fault(path)?;
        self.record_read(path);
        let nodes = self.nodes.read().await;
        match nodes.get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(FsError::from_io(
                path,
                io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
            )),
            None => Err(FsError::NotFound { path: path.clone() }),
        }
    }

    async fn read_directory(&self, directory: &Directory) -> Result<Vec<Entry>> {
        let path = directory.path();
        self.check_fault(path)?;
        self.record_read(path);
        let nodes = self.nodes.read().await;
        match nodes.get(path) {
            Some(Node::Directory { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(FsError::from_io(
                    path,
                    io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
                ));
            }
            None => return Err(FsError::NotFound { path: path.clone() }),
        }

        let mut entries: Vec<Entry> = nodes
            .iter()
            .filter(|(candidate, _)| candidate.parent().as_ref() == Some(path))
            .map(|(candidate, node)| match node {
                Node::File { .. } => Entry::File(File::new(candidate.clone())),
                Node::Directory { .. } => Entry::Directory(Directory::new(candidate.clone())),
            })
            .collect();
        entries.sort();
        Ok(entries)
    }

    async fn status(&self, path: &AbsolutePath) -> Result<PathStatus> {
        self.check_fault(path)?;
        let nodes = self.nodes.read().await;
        nodes
            .get(path)
            .map(Node::status)
            .ok_or_else(|| FsError::NotFound { path: path.clone() })
    }
}
