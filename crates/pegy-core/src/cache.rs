//! Pluggable key/value cache
//!
//! Batch results and AI summaries are memoized through the [`Cache`] trait so
//! callers decide where the data lives: [`MemoryCache`] keeps entries for a
//! time-to-live, [`FileCache`] keeps one JSON document per key on disk.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Key/value capability injected into calculations
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a value; unreadable entries count as missing
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value, replacing any previous one
    async fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Remove one entry, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove every entry, returning how many were dropped
    async fn clear(&self) -> Result<usize>;
}

/// In-memory cache with a fixed time-to-live
pub struct MemoryCache {
    entries: Arc<RwLock<TimedCache<String, Value>>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Number of entries, including ones that expired but were not evicted yet
    pub async fn len(&self) -> usize {
        self.entries.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for MemoryCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write().await;
        let hit = entries.cache_get(key).cloned();
        debug!("Memory cache {} for {}", if hit.is_some() { "hit" } else { "miss" }, key);
        hit
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        let _ = entries.cache_set(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.cache_remove(key).is_some())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let count = entries.cache_size();
        entries.cache_clear();
        Ok(count)
    }
}

/// Directory of `<KEY>.json` documents
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`; characters outside `[0-9A-Za-z_.-]` become `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let text = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => {
                debug!("File cache hit for {}", key);
                Some(value)
            }
            Err(e) => {
                debug!("Ignoring corrupt cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string_pretty(&value)?;
        tokio::fs::write(self.path_for(key), text).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && tokio::fs::remove_file(&path).await.is_ok()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
