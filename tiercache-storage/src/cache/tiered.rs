//! Tiered cache service.
//!
//! Resolves a key from the freshest available source, in order:
//!
//! 1. the memory tier, if it holds an unexpired entry;
//! 2. the loader, whose value is written through to the adapter and memory;
//! 3. the adapter, whose unexpired entry is copied into memory unchanged.
//!
//! The first tier that produces a value wins and later tiers are not
//! consulted. Adapter and loader failures abort the lookup.

use std::fmt;
use std::sync::Arc;

use tiercache_core::{
    create_cache_entry, is_expired, now_ms, CacheError, CacheOptions, CacheOptionsOverride,
    CacheResult,
};
use tracing::{debug, trace};

use super::adapter::{AdapterBridge, CacheAdapter};
use super::loader::Loader;
use super::memory::MemoryStore;
use super::single_flight::FlightRegistry;
use super::stats::{Tier, TierCounters, TierStats};

/// Cache in front of a loader and an optional persistent adapter.
///
/// # Concurrency
///
/// The memory tier is lock-guarded and safe to share across tasks. By
/// default concurrent misses for one key are not coalesced: each caller runs
/// its own loader and writes through, and the last write wins. Enable
/// [`with_single_flight`](Self::with_single_flight) to serialize misses per
/// key instead.
///
/// # Example
///
/// ```ignore
/// let cache = TieredCache::with_adapter(adapter, CacheOptions::default());
///
/// let user = cache
///     .get_or_load("user:42", Loader::producer(|| fetch_user(42)))
///     .await?;
/// ```
pub struct TieredCache<T> {
    memory: MemoryStore<T>,
    adapter: AdapterBridge<T>,
    options: CacheOptions,
    flights: Option<FlightRegistry>,
    counters: TierCounters,
}

impl<T> TieredCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a memory-only cache.
    pub fn new(options: CacheOptions) -> Self {
        Self::from_parts(None, options)
    }

    /// Create a cache backed by `adapter`.
    pub fn with_adapter(adapter: Arc<dyn CacheAdapter<T>>, options: CacheOptions) -> Self {
        Self::from_parts(Some(adapter), options)
    }

    /// Create a cache with an optional adapter.
    pub fn from_parts(adapter: Option<Arc<dyn CacheAdapter<T>>>, options: CacheOptions) -> Self {
        Self {
            memory: MemoryStore::new(),
            adapter: AdapterBridge::new(adapter),
            options,
            flights: None,
            counters: TierCounters::default(),
        }
    }

    /// Enable or disable per-key coalescing of concurrent misses.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(FlightRegistry::new);
        self
    }

    /// Instance defaults used for new entries.
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Returns true if an adapter is configured.
    pub fn has_adapter(&self) -> bool {
        self.adapter.is_configured()
    }

    /// Returns true if concurrent misses are coalesced.
    pub fn single_flight_enabled(&self) -> bool {
        self.flights.is_some()
    }

    /// The memory tier.
    pub fn memory(&self) -> &MemoryStore<T> {
        &self.memory
    }

    /// Snapshot of per-tier resolution counts.
    pub fn stats(&self) -> TierStats {
        self.counters.snapshot()
    }

    /// Look up `key`, consulting memory, then `loader`, then the adapter.
    ///
    /// `overrides` replace the instance defaults for entries written by the
    /// loader path only. Entries read from the adapter keep their own
    /// metadata and are not written back to it.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no tier produced a value. Loader and adapter failures
    /// are returned as [`CacheError::Loader`] and [`CacheError::Adapter`].
    pub async fn get(
        &self,
        key: &str,
        loader: Option<Loader<'_, T>>,
        overrides: Option<&CacheOptionsOverride>,
    ) -> CacheResult<Option<T>> {
        let options = match overrides {
            Some(overrides) => self.options.merge(overrides),
            None => self.options,
        };

        if let Some(value) = self.try_get_from_memory(key)? {
            return Ok(Some(value));
        }

        let _flight = match &self.flights {
            Some(flights) => {
                let guard = flights.acquire(key).await?;
                // Another caller may have resolved the key while we waited.
                if let Some(value) = self.try_get_from_memory(key)? {
                    return Ok(Some(value));
                }
                Some(guard)
            }
            None => None,
        };

        if let Some(value) = self.try_get_from_loader(key, loader).await? {
            let value = self.cache_value(key, value, &options).await?;
            debug!(key, ttl_ms = options.ttl_ms, "resolved from loader");
            self.counters.record(Some(Tier::Loader));
            return Ok(Some(value));
        }

        if let Some(value) = self.try_get_from_adapter(key).await? {
            debug!(key, "resolved from adapter");
            self.counters.record(Some(Tier::Adapter));
            return Ok(Some(value));
        }

        debug!(key, "cache miss on every tier");
        self.counters.record(None);
        Ok(None)
    }

    /// Look up `key` without a loader or per-call overrides.
    pub async fn get_cached(&self, key: &str) -> CacheResult<Option<T>> {
        self.get(key, None, None).await
    }

    /// Look up `key`, falling back to `loader` on a memory miss.
    pub async fn get_or_load(&self, key: &str, loader: Loader<'_, T>) -> CacheResult<Option<T>> {
        self.get(key, Some(loader), None).await
    }

    fn try_get_from_memory(&self, key: &str) -> CacheResult<Option<T>> {
        let value = self.memory.get_fresh(key, now_ms())?;
        if value.is_some() {
            trace!(key, "memory tier hit");
            self.counters.record(Some(Tier::Memory));
        }
        Ok(value)
    }

    async fn try_get_from_loader(
        &self,
        key: &str,
        loader: Option<Loader<'_, T>>,
    ) -> CacheResult<Option<T>> {
        let Some(loader) = loader else {
            return Ok(None);
        };

        loader.resolve().await.map_err(|source| CacheError::Loader {
            key: key.to_string(),
            source,
        })
    }

    async fn try_get_from_adapter(&self, key: &str) -> CacheResult<Option<T>> {
        let Some(entry) = self.adapter.get(key).await? else {
            return Ok(None);
        };

        if is_expired(Some(&entry.metadata)) {
            debug!(key, expires_at = ?entry.metadata.expires_at, "adapter entry expired");
            return Ok(None);
        }

        let value = entry.data.clone();
        self.memory.insert(key, entry)?;
        Ok(Some(value))
    }

    /// Write a fresh value through to the adapter, then memory.
    async fn cache_value(&self, key: &str, value: T, options: &CacheOptions) -> CacheResult<T> {
        let entry = create_cache_entry(value, options);
        self.adapter.save(key, &entry).await?;

        let value = entry.data.clone();
        self.memory.insert(key, entry)?;
        Ok(value)
    }
}

impl<T> Default for TieredCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<T> fmt::Debug for TieredCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("options", &self.options)
            .field("adapter", &self.adapter)
            .field("single_flight", &self.flights.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::adapter::InMemoryAdapter;
    use tiercache_core::{BoxError, CacheEntry, CacheMetadata};

    fn stale_metadata() -> CacheMetadata {
        let now = now_ms();
        CacheMetadata::new(now - 2_000, 1_000, 0)
    }

    #[tokio::test]
    async fn test_memory_only_total_miss() {
        let cache: TieredCache<String> = TieredCache::default();
        assert!(!cache.has_adapter());
        assert_eq!(cache.get_cached("k").await.unwrap(), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_expired_memory_entry_falls_through_to_miss() {
        let cache: TieredCache<String> = TieredCache::new(CacheOptions::new(1_000, 0));
        cache
            .memory()
            .insert("k", CacheEntry::new("old".to_string(), stale_metadata()))
            .unwrap();

        assert_eq!(cache.get_cached("k").await.unwrap(), None);
        // stale entry is left in place
        assert!(cache.memory().contains_key("k").unwrap());
    }

    #[tokio::test]
    async fn test_loader_value_is_written_to_memory() {
        let cache: TieredCache<u32> = TieredCache::new(CacheOptions::new(10_000, 2_000));

        let value = cache.get_or_load("k", Loader::value(7)).await.unwrap();
        assert_eq!(value, Some(7));

        let entry = cache.memory().peek("k").unwrap().unwrap();
        let created = entry.metadata.created_at.unwrap();
        assert_eq!(entry.metadata.expires_at, Some(created + 8_000));

        // served from memory now, the loader is not needed
        assert_eq!(cache.get_cached("k").await.unwrap(), Some(7));
        let stats = cache.stats();
        assert_eq!(stats.loader_hits, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[tokio::test]
    async fn test_per_call_overrides_apply_to_new_entries() {
        let cache: TieredCache<u32> = TieredCache::default();
        let overrides = CacheOptionsOverride::new().ttl_ms(-1);

        cache
            .get("k", Some(Loader::value(1)), Some(&overrides))
            .await
            .unwrap();

        let entry = cache.memory().peek("k").unwrap().unwrap();
        assert!(entry.metadata.never_expires());
        assert_eq!(cache.options().ttl_ms, 3_600_000);
    }

    #[tokio::test]
    async fn test_adapter_entry_copied_into_memory_unchanged() {
        let adapter = InMemoryAdapter::new();
        let metadata = CacheMetadata::new(now_ms(), 60_000, 0);
        adapter
            .insert("k", CacheEntry::new("persisted".to_string(), metadata))
            .unwrap();

        let cache: TieredCache<String> =
            TieredCache::with_adapter(Arc::new(adapter), CacheOptions::new(5, 0));
        assert_eq!(cache.get_cached("k").await.unwrap(), Some("persisted".to_string()));

        let copied = cache.memory().peek("k").unwrap().unwrap();
        assert_eq!(copied.metadata, metadata);
        assert_eq!(cache.stats().adapter_hits, 1);
    }

    #[tokio::test]
    async fn test_expired_adapter_entry_is_ignored() {
        let adapter = InMemoryAdapter::new();
        adapter
            .insert("k", CacheEntry::new("old".to_string(), stale_metadata()))
            .unwrap();

        let cache: TieredCache<String> =
            TieredCache::with_adapter(Arc::new(adapter), CacheOptions::default());
        assert_eq!(cache.get_cached("k").await.unwrap(), None);
        assert!(cache.memory().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_loader_failure_aborts_lookup() {
        let cache: TieredCache<u32> = TieredCache::default();
        let loader = Loader::future(async { Err::<Option<u32>, BoxError>("unavailable".into()) });

        let err = cache.get_or_load("k", loader).await.unwrap_err();
        assert!(err.is_loader());
        assert!(cache.memory().is_empty().unwrap());
    }

    #[test]
    fn test_single_flight_toggle() {
        let cache: TieredCache<u8> = TieredCache::default();
        assert!(!cache.single_flight_enabled());
        let cache = cache.with_single_flight(true);
        assert!(cache.single_flight_enabled());
        assert!(format!("{:?}", cache).contains("single_flight: true"));
    }
}
