//! Bounded in-memory cache of platform public keys.
//!
//! Keys are looked up by key id. A hit is served from memory without any
//! network traffic; a miss goes through the [`KeyFetcher`] (token request +
//! key request) and the result is inserted, evicting the least recently used
//! entry when the cache is full. Entries never expire.
//!
//! Concurrent misses for the same key id are not coalesced: every caller
//! performs its own fetch and the last insert wins.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::EnvironmentCredentials;
use crate::error::{NotifyError, NotifyResult};
use crate::types::PublicKeyRecord;

/// Default number of cached keys.
pub const DEFAULT_KEY_CACHE_CAPACITY: usize = 100;

/// Source of public keys on cache miss.
#[async_trait]
pub trait KeyFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch_public_key(
        &self,
        key_id: &str,
        creds: &EnvironmentCredentials,
    ) -> NotifyResult<PublicKeyRecord>;
}

/// LRU cache of public keys keyed by key id.
#[derive(Debug, Clone)]
pub struct KeyCache {
    entries: Arc<Mutex<LruCache<String, Arc<PublicKeyRecord>>>>,
    fetcher: Arc<dyn KeyFetcher>,
}

impl KeyCache {
    /// Create a cache holding at most `capacity` keys (minimum 1).
    pub fn new(fetcher: Arc<dyn KeyFetcher>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            fetcher,
        }
    }

    pub fn with_default_capacity(fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self::new(fetcher, DEFAULT_KEY_CACHE_CAPACITY)
    }

    /// Resolve `key_id`, fetching it on miss.
    pub async fn resolve(
        &self,
        key_id: &str,
        creds: &EnvironmentCredentials,
    ) -> NotifyResult<Arc<PublicKeyRecord>> {
        // The lock is released before any network call.
        if let Some(record) = self.entries.lock().await.get(key_id) {
            debug!(key_id = %key_id, "public key cache hit");
            return Ok(Arc::clone(record));
        }

        debug!(key_id = %key_id, environment = %creds.environment, "public key cache miss");

        let mut record = self
            .fetcher
            .fetch_public_key(key_id, creds)
            .await
            .map_err(|e| {
                warn!(key_id = %key_id, error = %e, "failed to fetch public key");
                NotifyError::KeyFetch {
                    key_id: key_id.to_string(),
                    source: Box::new(e),
                }
            })?;
        record.key_id = key_id.to_string();

        Ok(self.insert(record).await)
    }

    /// Insert a record, replacing any entry with the same key id.
    pub async fn insert(&self, record: PublicKeyRecord) -> Arc<PublicKeyRecord> {
        let record = Arc::new(record);
        let evicted = self
            .entries
            .lock()
            .await
            .push(record.key_id.clone(), Arc::clone(&record));

        if let Some((evicted_id, _)) = evicted {
            if evicted_id != record.key_id {
                debug!(key_id = %evicted_id, "evicted public key");
            }
        }

        record
    }

    /// Whether `key_id` is cached. Does not update recency.
    pub async fn contains(&self, key_id: &str) -> bool {
        self.entries.lock().await.contains(key_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }
}
