//! Per-key gate that coalesces concurrent misses.
//!
//! Off by default. When enabled, misses for the same key are serialized so
//! that a caller waiting on the gate finds the first caller's write-through
//! in the memory tier instead of recomputing the value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tiercache_core::{CacheError, CacheResult};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Gate = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
struct Slot {
    gate: Gate,
    /// Callers holding or waiting on `gate`.
    users: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FlightRegistry {
    gates: Mutex<HashMap<String, Slot>>,
}

impl FlightRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `key`.
    ///
    /// The caller is registered before waiting, so a future dropped at any
    /// point still releases its claim on the gate.
    pub(crate) async fn acquire(&self, key: &str) -> CacheResult<FlightGuard<'_>> {
        let lease = self.lease(key)?;
        let permit = Arc::clone(&lease.gate).lock_owned().await;

        Ok(FlightGuard {
            _permit: permit,
            _lease: lease,
        })
    }

    fn lease(&self, key: &str) -> CacheResult<Lease<'_>> {
        let mut gates = self.gates.lock().map_err(|_| CacheError::LockPoisoned)?;
        let slot = gates.entry(key.to_string()).or_default();
        slot.users += 1;

        Ok(Lease {
            registry: self,
            key: key.to_string(),
            gate: Arc::clone(&slot.gate),
        })
    }

    /// Number of keys with a live gate.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.gates.lock().map(|g| g.len()).unwrap_or(0)
    }
}

/// One caller's claim on a key, from the start of `acquire` until release.
#[derive(Debug)]
struct Lease<'a> {
    registry: &'a FlightRegistry,
    key: String,
    gate: Gate,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let Ok(mut gates) = self.registry.gates.lock() else {
            return;
        };
        let Some(slot) = gates.get_mut(&self.key) else {
            return;
        };
        slot.users = slot.users.saturating_sub(1);
        if slot.users == 0 {
            gates.remove(&self.key);
        }
    }
}

/// Ownership of one key's gate; released on drop.
#[derive(Debug)]
pub(crate) struct FlightGuard<'a> {
    // permit is released before the lease
    _permit: OwnedMutexGuard<()>,
    _lease: Lease<'a>,
}
