//! Tiered cache: memory, loader and adapter behind one lookup.
//!
//! # Tiers
//!
//! - [`MemoryStore`]: process-local map, always consulted first.
//! - [`Loader`]: on-demand recomputation supplied per call.
//! - [`CacheAdapter`]: optional persistent store, reached through the
//!   [`AdapterBridge`].
//!
//! Every tier stores the same [`CacheEntry`](tiercache_core::CacheEntry) and
//! freshness is always judged by the entry's own metadata.

pub mod adapter;
pub mod loader;
pub mod memory;
mod single_flight;
pub mod stats;
pub mod tiered;

pub use adapter::{AdapterBridge, CacheAdapter, InMemoryAdapter};
pub use loader::{LoadFuture, Loader};
pub use memory::MemoryStore;
pub use stats::{Tier, TierStats};
pub use tiered::TieredCache;
