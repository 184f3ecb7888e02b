//! tiercache Test Utilities
//!
//! Shared test infrastructure for the tiercache workspace:
//! - Entry and metadata fixtures
//! - A recording mock adapter that counts calls and can be told to fail
//! - Counting loaders
//! - Proptest generators for options and metadata

pub use tiercache_core::{
    create_cache_entry, is_expired, now_ms, BoxError, CacheEntry, CacheError, CacheMetadata,
    CacheOptions, CacheOptionsOverride, CacheResult, NEVER_EXPIRES,
};
pub use tiercache_storage::{CacheAdapter, InMemoryAdapter, Loader, TieredCache};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

// ============================================================================
// FIXTURES
// ============================================================================

/// Metadata for an entry created `age_ms` ago with the given TTL.
pub fn metadata_created_ago(age_ms: i64, ttl_ms: i64, expiration_threshold_ms: i64) -> CacheMetadata {
    CacheMetadata::new(now_ms() - age_ms, ttl_ms, expiration_threshold_ms)
}

/// An entry that expires an hour from now.
pub fn fresh_entry<T>(data: T) -> CacheEntry<T> {
    CacheEntry::new(data, metadata_created_ago(0, 60 * 60 * 1000, 0))
}

/// An entry that expired a second ago.
pub fn expired_entry<T>(data: T) -> CacheEntry<T> {
    CacheEntry::new(data, metadata_created_ago(2_000, 1_000, 0))
}

/// An entry that never expires.
pub fn eternal_entry<T>(data: T) -> CacheEntry<T> {
    CacheEntry::new(data, metadata_created_ago(0, -1, 0))
}

/// Metadata as written by a foreign adapter that omits `expiresAt`.
pub fn foreign_metadata(created_at: Option<i64>, ttl_ms: Option<i64>) -> CacheMetadata {
    CacheMetadata {
        created_at,
        ttl_ms,
        expiration_threshold_ms: 0,
        expires_at: None,
    }
}

// ============================================================================
// MOCK ADAPTER
// ============================================================================

/// Failure injected by [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("injected adapter failure during {operation}")]
pub struct AdapterFailure {
    pub operation: &'static str,
}

/// Adapter that records every call and can be scripted to fail.
#[derive(Debug)]
pub struct RecordingAdapter<T> {
    records: RwLock<HashMap<String, CacheEntry<T>>>,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
}

impl<T: Clone> RecordingAdapter<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            get_calls: AtomicUsize::new(0),
            set_calls: AtomicUsize::new(0),
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
        }
    }

    /// Adapter pre-populated with one record.
    pub fn with_record(key: impl Into<String>, entry: CacheEntry<T>) -> Self {
        let adapter = Self::new();
        adapter.seed(key, entry);
        adapter
    }

    /// Store a record without counting it as a `set_value` call.
    pub fn seed(&self, key: impl Into<String>, entry: CacheEntry<T>) {
        self.records.write().unwrap().insert(key.into(), entry);
    }

    /// The record currently stored under `key`.
    pub fn stored(&self, key: &str) -> Option<CacheEntry<T>> {
        self.records.read().unwrap().get(key).cloned()
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }
}

impl<T: Clone> Default for RecordingAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> CacheAdapter<T> for RecordingAdapter<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get_value(&self, key: &str) -> Result<Option<CacheEntry<T>>, BoxError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Box::new(AdapterFailure { operation: "get_value" }));
        }
        Ok(self.stored(key))
    }

    async fn set_value(&self, key: &str, entry: &CacheEntry<T>) -> Result<(), BoxError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(Box::new(AdapterFailure { operation: "set_value" }));
        }
        self.seed(key, entry.clone());
        Ok(())
    }
}

/// Build a cache over a fresh [`RecordingAdapter`], returning both.
pub fn cache_with_recording_adapter<T>(
    options: CacheOptions,
) -> (TieredCache<T>, Arc<RecordingAdapter<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    let adapter = Arc::new(RecordingAdapter::new());
    let cache = TieredCache::with_adapter(adapter.clone(), options);
    (cache, adapter)
}

// ============================================================================
// LOADERS
// ============================================================================

/// Producer loader that bumps `calls` each time it runs and yields `value`.
pub fn counting_loader<T>(calls: &Arc<AtomicUsize>, value: Option<T>) -> Loader<'static, T>
where
    T: Send + 'static,
{
    let calls = Arc::clone(calls);
    Loader::producer(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, BoxError>(value) }
    })
}

/// Loader that always fails with `message`.
pub fn failing_loader<T>(message: &'static str) -> Loader<'static, T>
where
    T: Send + 'static,
{
    Loader::future(async move { Err::<Option<T>, BoxError>(message.into()) })
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Options with any TTL sign and a non-negative threshold.
    pub fn arb_cache_options() -> impl Strategy<Value = CacheOptions> {
        (-10_000_000i64..100_000_000, 0i64..10_000_000)
            .prop_map(|(ttl_ms, threshold)| CacheOptions::new(ttl_ms, threshold))
    }

    /// Partial overrides, each field independently present or absent.
    pub fn arb_override() -> impl Strategy<Value = CacheOptionsOverride> {
        (
            proptest::option::of(-10_000_000i64..100_000_000),
            proptest::option::of(0i64..10_000_000),
        )
            .prop_map(|(ttl_ms, expiration_threshold_ms)| CacheOptionsOverride {
                ttl_ms,
                expiration_threshold_ms,
            })
    }

    /// Metadata as a foreign adapter might write it, any field possibly missing.
    pub fn arb_foreign_metadata() -> impl Strategy<Value = CacheMetadata> {
        (
            proptest::option::of(0i64..4_000_000_000_000),
            proptest::option::of(-1_000i64..100_000_000),
            0i64..1_000_000,
            proptest::option::of(-1i64..4_000_000_000_000),
        )
            .prop_map(|(created_at, ttl_ms, expiration_threshold_ms, expires_at)| CacheMetadata {
                created_at,
                ttl_ms,
                expiration_threshold_ms,
                expires_at,
            })
    }
}
