//! Change-time validated read caches.
//!
//! Every lookup stats the path first and only trusts a cached value whose
//! recorded [`ChangeTime`] equals the fresh one. The cache therefore saves
//! the read (and any parsing), never the stat.
//!
//! A single generic [`ChangeTimeCache`] backs every payload: file bytes and
//! decoded text are weighed by length, directory listings by entry count,
//! parsed rules files by one unit each. Eviction is least-recently-used by
//! total weight.
//!
//! Concurrent misses on the same path both read and both insert; the last
//! insert wins. Reads are idempotent so this only costs duplicate work.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use lru::LruCache;
use ndcb_path::AbsolutePath;
use serde::Deserialize;

use crate::backend::{Backend, ChangeTime, PathStatus};
use crate::entry::{Directory, Entry, File};
use crate::error::Result;

/// Default byte capacity of the file and text caches (50 MiB).
pub const DEFAULT_CONTENT_CAPACITY: usize = 50 * 1024 * 1024;

/// Default capacity of the directory cache, in listed entries.
pub const DEFAULT_DIRECTORY_CAPACITY: usize = 10_000;

/// Default capacity of the parsed rules-file cache, in rules files.
pub const DEFAULT_RULES_CAPACITY: usize = 1_024;

/// Cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// When false, reads go straight to the backend.
    pub enabled: bool,
    /// Bytes of file contents kept.
    pub file_capacity: usize,
    /// Bytes of decoded text kept.
    pub text_capacity: usize,
    /// Directory entries kept, summed over all cached listings.
    pub directory_capacity: usize,
    /// Parsed rules files kept.
    pub rules_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_capacity: DEFAULT_CONTENT_CAPACITY,
            text_capacity: DEFAULT_CONTENT_CAPACITY,
            directory_capacity: DEFAULT_DIRECTORY_CAPACITY,
            rules_capacity: DEFAULT_RULES_CAPACITY,
        }
    }
}

/// Lifetime counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Slot<V> {
    change_time: ChangeTime,
    value: V,
    weight: usize,
}

struct CacheInner<V> {
    slots: LruCache<AbsolutePath, Slot<V>>,
    weight: usize,
    stats: CacheStats,
}

/// LRU keyed by absolute path, validated by change time, bounded by weight.
pub struct ChangeTimeCache<V> {
    inner: Mutex<CacheInner<V>>,
    weigher: fn(&V) -> usize,
    capacity: usize,
}

impl<V: Clone> ChangeTimeCache<V> {
    /// Create a cache holding at most `capacity` units as measured by `weigher`.
    pub fn new(capacity: usize, weigher: fn(&V) -> usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                slots: LruCache::unbounded(),
                weight: 0,
                stats: CacheStats::default(),
            }),
            weigher,
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value for `path` if it was stored under `change_time`.
    ///
    /// A slot recorded under any other change time is dropped.
    pub fn get(&self, path: &AbsolutePath, change_time: ChangeTime) -> Option<V> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let lookup = inner
            .slots
            .get(path)
            .map(|slot| (slot.change_time == change_time).then(|| slot.value.clone()));
        match lookup {
            Some(Some(value)) => {
                inner.stats.hits += 1;
                Some(value)
            }
            Some(None) => {
                inner.stats.misses += 1;
                if let Some(stale) = inner.slots.pop(path) {
                    inner.weight -= stale.weight;
                }
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store `value` for `path`, evicting least-recently-used slots as needed.
    ///
    /// A value heavier than the whole capacity is not stored.
    pub fn insert(&self, path: AbsolutePath, change_time: ChangeTime, value: V) {
        let weight = (self.weigher)(&value);
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(previous) = inner.slots.pop(&path) {
            inner.weight -= previous.weight;
        }
        if weight > self.capacity {
            return;
        }
        inner.slots.put(
            path,
            Slot {
                change_time,
                value,
                weight,
            },
        );
        inner.weight += weight;
        while inner.weight > self.capacity {
            match inner.slots.pop_lru() {
                Some((_, evicted)) => {
                    inner.weight -= evicted.weight;
                    inner.stats.evictions += 1;
                }
                None => break,
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Total weight currently held.
    pub fn weight(&self) -> usize {
        self.lock().weight
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A [`Backend`] with change-time validated caches in front of the reads.
///
/// Existence checks and stats pass straight through.
pub struct CachedBackend<B> {
    inner: B,
    files: ChangeTimeCache<Vec<u8>>,
    texts: ChangeTimeCache<String>,
    directories: ChangeTimeCache<Vec<Entry>>,
}

impl<B: Backend> CachedBackend<B> {
    pub fn new(inner: B, config: &CacheConfig) -> Self {
        Self {
            inner,
            files: ChangeTimeCache::new(config.file_capacity, Vec::len),
            texts: ChangeTimeCache::new(config.text_capacity, String::len),
            directories: ChangeTimeCache::new(config.directory_capacity, Vec::len),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn file_stats(&self) -> CacheStats {
        self.files.stats()
    }

    pub fn text_stats(&self) -> CacheStats {
        self.texts.stats()
    }

    pub fn directory_stats(&self) -> CacheStats {
        self.directories.stats()
    }
}

/// Stat `path`, serve from `cache` when current, otherwise `read` and store.
async fn read_through<B, V, F>(
    backend: &B,
    cache: &ChangeTimeCache<V>,
    path: &AbsolutePath,
    read: F,
) -> Result<V>
where
    B: Backend + ?Sized,
    V: Clone,
    F: std::future::Future<Output = Result<V>>,
{
    let change_time = backend.status(path).await?.change_time;
    if let Some(hit) = cache.get(path, change_time) {
        tracing::trace!(%path, "cache hit");
        return Ok(hit);
    }
    tracing::trace!(%path, "cache miss");
    let value = read.await?;
    cache.insert(path.clone(), change_time, value.clone());
    Ok(value)
}

#[async_trait]
impl<B: Backend> Backend for CachedBackend<B> {
    async fn read_file(&self, file: &File) -> Result<Vec<u8>> {
        read_through(&self.inner, &self.files, file.path(), self.inner.read_file(file)).await
    }

    async fn read_text_file(&self, file: &File) -> Result<String> {
        read_through(
            &self.inner,
            &self.texts,
            file.path(),
            self.inner.read_text_file(file),
        )
        .await
    }

    async fn read_directory(&self, directory: &Directory) -> Result<Vec<Entry>> {
        read_through(
            &self.inner,
            &self.directories,
            directory.path(),
            self.inner.read_directory(directory),
        )
        .await
    }

    async fn status(&self, path: &AbsolutePath) -> Result<PathStatus> {
        self.inner.status(path).await
    }

    async fn canonical(&self, directory: &Directory) -> Result<AbsolutePath> {
        self.inner.canonical(directory).await
    }

    async fn file_exists(&self, file: &File) -> Result<bool> {
        self.inner.file_exists(file).await
    }

    async fn directory_exists(&self, directory: &Directory) -> Result<bool> {
        self.inner.directory_exists(directory).await
    }
}
