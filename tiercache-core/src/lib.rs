//! tiercache core - entries, options and the expiration policy
//!
//! Pure data and policy shared by every tier. Nothing in this crate performs
//! a lookup; see `tiercache-storage` for the tiered service.

pub mod config;
pub mod entry;
pub mod error;
pub mod expiration;
pub mod options;

pub use entry::{CacheEntry, CacheMetadata, NEVER_EXPIRES};
pub use error::{BoxError, CacheError, CacheResult, ConfigError};
pub use expiration::{
    create_cache_entry, create_cache_entry_at, is_expired, is_expired_at, now_ms, Expiry,
};
pub use options::{
    CacheOptions, CacheOptionsOverride, DEFAULT_EXPIRATION_THRESHOLD_MS, DEFAULT_TTL_MS,
};
