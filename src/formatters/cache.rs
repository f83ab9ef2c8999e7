//! Formatter Cache (C4) — content-addressed TTL cache with oldest-eviction
//! at capacity and a background sweeper.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio::time::interval;
use tracing::debug;

use super::types::{FormatRequest, FormatResult};
use crate::types::FormatterCacheConfig;

/// SHA-256 over `(content, language, file_path)`. Deliberately excludes
/// `config`/`line_length`/`indent`/`check_only` — see Design Notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn compute(req: &FormatRequest) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(req.content.as_bytes());
        hasher.update(b"\0");
        hasher.update(req.language.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        hasher.update(req.file_path.as_deref().unwrap_or("").as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FormatterCacheEntry {
    pub result: FormatResult,
    pub inserted_at: Instant,
}

struct Inner {
    entries: RwLock<HashMap<CacheKey, FormatterCacheEntry>>,
    config: FormatterCacheConfig,
    sweeper_stop: Notify,
}

/// Cloning an `FormatterCache` shares the same underlying store and sweeper.
#[derive(Clone)]
pub struct FormatterCache {
    inner: Arc<Inner>,
}

impl fmt::Debug for FormatterCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterCache").field("size", &self.inner.entries.read().len()).finish()
    }
}

impl FormatterCache {
    pub fn new(config: FormatterCacheConfig) -> Self {
        let inner = Arc::new(Inner { entries: RwLock::new(HashMap::new()), config, sweeper_stop: Notify::new() });
        let cache = Self { inner };
        cache.spawn_sweeper();
        cache
    }

    fn spawn_sweeper(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut ticker = interval(inner.config.cleanup_freq);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let ttl = inner.config.ttl;
                        let before = inner.entries.read().len();
                        inner.entries.write().retain(|_, entry| entry.inserted_at.elapsed() < ttl);
                        let removed = before - inner.entries.read().len();
                        if removed > 0 {
                            debug!(removed, "formatter cache sweep removed expired entries");
                        }
                    }
                    _ = inner.sweeper_stop.notified() => break,
                }
            }
        });
    }

    pub fn get(&self, req: &FormatRequest) -> Option<FormatResult> {
        let key = CacheKey::compute(req);
        let entries = self.inner.entries.read();
        let entry = entries.get(&key)?;
        if entry.inserted_at.elapsed() >= self.inner.config.ttl {
            return None;
        }
        Some(entry.result.clone())
    }

    pub fn set(&self, req: &FormatRequest, result: FormatResult) {
        let key = CacheKey::compute(req);
        let mut entries = self.inner.entries.write();
        if entries.len() >= self.inner.config.max_size && !entries.contains_key(&key) {
            if let Some(oldest_key) =
                entries.iter().min_by_key(|(_, entry)| entry.inserted_at).map(|(k, _)| *k)
            {
                entries.remove(&oldest_key);
            }
        }
        entries.insert(key, FormatterCacheEntry { result, inserted_at: Instant::now() });
    }

    pub fn clear(&self) {
        self.inner.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stop(&self) {
        self.inner.sweeper_stop.notify_one();
    }
}
