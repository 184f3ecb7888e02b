//! tiercache storage - the tiered cache service
//!
//! Defines the adapter abstraction, the memory tier and the service that
//! resolves keys across them. Entry and policy types live in tiercache-core
//! and are re-exported here.

pub mod cache;

pub use cache::{
    AdapterBridge, CacheAdapter, InMemoryAdapter, LoadFuture, Loader, MemoryStore, Tier,
    TierStats, TieredCache,
};

pub use tiercache_core::{
    BoxError, CacheEntry, CacheError, CacheMetadata, CacheOptions, CacheOptionsOverride,
    CacheResult, ConfigError,
};
