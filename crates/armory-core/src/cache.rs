//! Session object cache.
//!
//! Maps an [`EntityKey`] to the single shared [`LazyRecord`] for that
//! identity. Entries live as long as the cache; there is no eviction.

#![allow(clippy::cast_precision_loss)]

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::Result;
use crate::identity::EntityKey;
use crate::record::LazyRecord;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that skipped the cache on request
    pub bypasses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct ObjectCache {
    entries: DashMap<EntityKey, Arc<LazyRecord>>,
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record cached for `key`, or build one with `factory`,
    /// cache it and return it.
    ///
    /// Insertion is atomic per key: concurrent misses for one identity run
    /// the factory once and share its result. A failing factory caches
    /// nothing. The factory runs while the key's shard is locked and must
    /// not call back into the cache.
    pub fn get_or_create<F>(&self, key: EntityKey, factory: F) -> Result<Arc<LazyRecord>>
    where
        F: FnOnce(EntityKey) -> Result<LazyRecord>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %entry.key(), "object cache hit");
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                let record = Arc::new(factory(entry.key().clone())?);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %entry.key(), "object cache miss");
                entry.insert(Arc::clone(&record));
                Ok(record)
            }
        }
    }

    /// Build a record without reading or writing the cache.
    ///
    /// Used for embedded data that must not displace a richer cached entry.
    pub fn bypass<F>(&self, key: EntityKey, factory: F) -> Result<Arc<LazyRecord>>
    where
        F: FnOnce(EntityKey) -> Result<LazyRecord>,
    {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "object cache bypassed");
        factory(key).map(Arc::new)
    }

    /// [`get_or_create`](Self::get_or_create) or [`bypass`](Self::bypass)
    /// depending on `use_cache`.
    pub fn resolve<F>(&self, key: EntityKey, use_cache: bool, factory: F) -> Result<Arc<LazyRecord>>
    where
        F: FnOnce(EntityKey) -> Result<LazyRecord>,
    {
        if use_cache {
            self.get_or_create(key, factory)
        } else {
            self.bypass(key, factory)
        }
    }

    pub fn get(&self, key: &EntityKey) -> Option<Arc<LazyRecord>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
