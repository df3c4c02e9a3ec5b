//! TTL-bounded response store.

use crate::{Fingerprint, ResponseCacheConfig};
use seedance_core::GenerationResponse;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Cached response with its insertion time.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct CachedEntry<V> {
    /// Key the entry is stored under
    fingerprint: Fingerprint,
    /// When the entry was inserted
    inserted_at: Instant,
    /// Stored response
    response: V,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, config: &ResponseCacheConfig, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= *config.ttl()
    }
}

/// In-memory cache keyed by request fingerprint.
///
/// Not synchronised; wrap it in a mutex to share between tasks.
#[derive(Debug, Clone)]
pub struct ResponseCache<V = GenerationResponse> {
    config: ResponseCacheConfig,
    entries: HashMap<Fingerprint, CachedEntry<V>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Creates an empty cache.
    pub fn new(config: ResponseCacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &ResponseCacheConfig {
        &self.config
    }

    /// Looks up a live entry, removing it if it has expired.
    pub fn get(&mut self, key: &Fingerprint) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Like [`get`](Self::get), evaluated at `now`.
    #[instrument(skip(self), fields(key = %key))]
    pub fn get_at(&mut self, key: &Fingerprint, now: Instant) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(&self.config, now);
        if expired {
            debug!("Cache entry expired");
            self.entries.remove(key);
            return None;
        }
        trace!("Cache hit");
        self.entries.get(key).map(|entry| entry.response.clone())
    }

    /// Stores a response.
    pub fn put(&mut self, key: Fingerprint, response: V) {
        self.put_at(key, response, Instant::now());
    }

    /// Like [`put`](Self::put), with `now` as the insertion time.
    ///
    /// Replacing an existing key never evicts. Inserting a new key into a full
    /// cache evicts the entry with the oldest insertion time first.
    #[instrument(skip(self, response), fields(key = %key))]
    pub fn put_at(&mut self, key: Fingerprint, response: V, now: Instant) {
        if *self.config.max_size() == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= *self.config.max_size() {
            let oldest = self
                .entries
                .values()
                .min_by_key(|entry| entry.inserted_at)
                .map(|entry| entry.fingerprint.clone());
            if let Some(oldest) = oldest {
                debug!(evicted = %oldest, "Cache full, evicting oldest entry");
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key.clone(),
            CachedEntry {
                fingerprint: key,
                inserted_at: now,
                response,
            },
        );
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Like [`purge_expired`](Self::purge_expired), evaluated at `now`.
    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let config = &self.config;
        self.entries.retain(|_, entry| !entry.is_expired(config, now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry stored under `key`, without checking expiry.
    pub fn entry(&self, key: &Fingerprint) -> Option<&CachedEntry<V>> {
        self.entries.get(key)
    }
}
