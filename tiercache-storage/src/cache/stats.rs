//! Per-tier resolution statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// The tier that satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Memory,
    Loader,
    Adapter,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Memory => "memory",
            Tier::Loader => "loader",
            Tier::Adapter => "adapter",
        };
        f.write_str(name)
    }
}

/// Snapshot of how lookups were resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierStats {
    /// Lookups answered from the memory tier.
    pub memory_hits: u64,
    /// Lookups answered by a loader.
    pub loader_hits: u64,
    /// Lookups answered from the adapter.
    pub adapter_hits: u64,
    /// Lookups no tier could answer.
    pub misses: u64,
}

impl TierStats {
    /// Total lookups answered by any tier.
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.loader_hits + self.adapter_hits
    }

    /// Total completed lookups.
    pub fn lookups(&self) -> u64 {
        self.hits() + self.misses
    }

    /// Calculate the memory hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.memory_hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TierCounters {
    memory_hits: AtomicU64,
    loader_hits: AtomicU64,
    adapter_hits: AtomicU64,
    misses: AtomicU64,
}

impl TierCounters {
    pub(crate) fn record(&self, tier: Option<Tier>) {
        let counter = match tier {
            Some(Tier::Memory) => &self.memory_hits,
            Some(Tier::Loader) => &self.loader_hits,
            Some(Tier::Adapter) => &self.adapter_hits,
            None => &self.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TierStats {
        TierStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            loader_hits: self.loader_hits.load(Ordering::Relaxed),
            adapter_hits: self.adapter_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
