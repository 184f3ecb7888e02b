//! Adapter capability and the bridge that guards it.
//!
//! An adapter is the optional persistent tier behind the cache. The cache
//! holds at most one, bound at construction; without one the service runs
//! memory-only. The on-wire or on-disk format is entirely the adapter's
//! business.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tiercache_core::{BoxError, CacheEntry, CacheError, CacheResult};

/// External key/value store consulted after the loader.
///
/// Implementations store whole [`CacheEntry`] records, metadata included, so
/// that freshness can be judged when the record is read back. Synchronous
/// stores simply return without awaiting.
#[async_trait]
pub trait CacheAdapter<T>: Send + Sync {
    /// Read the record stored under `key`, if any.
    async fn get_value(&self, key: &str) -> Result<Option<CacheEntry<T>>, BoxError>;

    /// Persist `entry` under `key`, replacing any previous record.
    async fn set_value(&self, key: &str, entry: &CacheEntry<T>) -> Result<(), BoxError>;
}

/// Pass-through to the optional adapter.
///
/// Reads yield `None` and writes are no-ops when no adapter is configured.
/// Adapter failures are wrapped with the key but never suppressed or retried.
pub struct AdapterBridge<T> {
    adapter: Option<Arc<dyn CacheAdapter<T>>>,
}

impl<T> AdapterBridge<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(adapter: Option<Arc<dyn CacheAdapter<T>>>) -> Self {
        Self { adapter }
    }

    /// Returns true if an adapter is configured.
    pub fn is_configured(&self) -> bool {
        self.adapter.is_some()
    }

    /// Read from the adapter.
    pub async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry<T>>> {
        let Some(adapter) = &self.adapter else {
            return Ok(None);
        };

        adapter.get_value(key).await.map_err(|source| CacheError::Adapter {
            key: key.to_string(),
            source,
        })
    }

    /// Write to the adapter.
    pub async fn save(&self, key: &str, entry: &CacheEntry<T>) -> CacheResult<()> {
        let Some(adapter) = &self.adapter else {
            return Ok(());
        };

        adapter
            .set_value(key, entry)
            .await
            .map_err(|source| CacheError::Adapter {
                key: key.to_string(),
                source,
            })
    }
}

impl<T> Clone for AdapterBridge<T> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

impl<T> fmt::Debug for AdapterBridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterBridge")
            .field("configured", &self.adapter.is_some())
            .finish()
    }
}

/// Adapter backed by a shared in-process map.
///
/// Clones share the same map, so several cache instances can sit in front of
/// one "persisted" tier.
#[derive(Debug)]
pub struct InMemoryAdapter<T> {
    records: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
}

impl<T> InMemoryAdapter<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> CacheResult<usize> {
        let records = self.records.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Clone> InMemoryAdapter<T> {
    /// Store a record directly, bypassing the cache.
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry<T>) -> CacheResult<()> {
        self.records
            .write()
            .map_err(|_| CacheError::LockPoisoned)?
            .insert(key.into(), entry);
        Ok(())
    }

    /// Snapshot of the record stored under `key`.
    pub fn record(&self, key: &str) -> CacheResult<Option<CacheEntry<T>>> {
        let records = self.records.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(records.get(key).cloned())
    }
}

impl<T> Default for InMemoryAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InMemoryAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl<T> CacheAdapter<T> for InMemoryAdapter<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get_value(&self, key: &str) -> Result<Option<CacheEntry<T>>, BoxError> {
        let records = self
            .records
            .read()
            .map_err(|_| BoxError::from("in-memory adapter lock poisoned"))?;
        Ok(records.get(key).cloned())
    }

    async fn set_value(&self, key: &str, entry: &CacheEntry<T>) -> Result<(), BoxError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| BoxError::from("in-memory adapter lock poisoned"))?;
        records.insert(key.to_string(), entry.clone());
        Ok(())
    }
}
