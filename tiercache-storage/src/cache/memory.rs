//! Process-local memory tier.

use std::collections::HashMap;
use std::sync::RwLock;

use tiercache_core::{is_expired_at, CacheEntry, CacheError, CacheResult};

/// Map from key to [`CacheEntry`], guarded by a lock.
///
/// Entries are never evicted. A stale entry stays in place, reads as a miss,
/// and is overwritten by the next write-through for its key. The lock is
/// only held for the duration of a map operation.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store `entry` under `key`, replacing whatever was there.
    pub fn insert(&self, key: &str, entry: CacheEntry<T>) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> CacheResult<usize> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns true if an entry exists for `key`, fresh or not.
    pub fn contains_key(&self, key: &str) -> CacheResult<bool> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.contains_key(key))
    }
}

impl<T: Clone> MemoryStore<T> {
    /// Value stored under `key` if it has not expired as of `now`.
    pub fn get_fresh(&self, key: &str, now: i64) -> CacheResult<Option<T>> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries
            .get(key)
            .filter(|entry| !is_expired_at(Some(&entry.metadata), now))
            .map(|entry| entry.data.clone()))
    }

    /// The raw entry stored under `key`, regardless of expiry.
    pub fn peek(&self, key: &str) -> CacheResult<Option<CacheEntry<T>>> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
