//! Expiration policy.
//!
//! Pure functions that stamp new entries and decide whether stored metadata
//! is still usable. Expiry is boundary-inclusive: at the exact expiry instant
//! an entry is already expired.

use chrono::Utc;

use crate::entry::{CacheEntry, CacheMetadata, NEVER_EXPIRES};
use crate::options::CacheOptions;

/// Resolved expiry of a piece of metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry never expires.
    Never,
    /// The entry expires at this absolute timestamp (ms).
    At(i64),
    /// The expiry cannot be determined; treated as expired.
    Unknown,
}

impl CacheMetadata {
    /// Resolve when this metadata expires.
    ///
    /// A negative `ttl_ms` never expires. Otherwise `expires_at` wins when
    /// present, even when the threshold pushed it below zero. Without a
    /// `ttl_ms`, only the exact [`NEVER_EXPIRES`] sentinel means never.
    /// Metadata from foreign adapters that lacks `expires_at` falls back to
    /// `created_at + ttl_ms`, and to [`Expiry::Unknown`] when that cannot be
    /// computed either.
    pub fn effective_expiry(&self) -> Expiry {
        match (self.expires_at, self.created_at, self.ttl_ms) {
            (Some(_), _, Some(ttl)) if ttl < 0 => Expiry::Never,
            (Some(NEVER_EXPIRES), _, None) => Expiry::Never,
            (Some(at), _, _) => Expiry::At(at),
            (None, Some(_), Some(ttl)) if ttl < 0 => Expiry::Never,
            (None, Some(created), Some(ttl)) => Expiry::At(created.saturating_add(ttl)),
            _ => Expiry::Unknown,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Create a new entry stamped with the current time.
pub fn create_cache_entry<T>(value: T, options: &CacheOptions) -> CacheEntry<T> {
    create_cache_entry_at(value, options, now_ms())
}

/// Create a new entry as if it were created at `now`.
pub fn create_cache_entry_at<T>(value: T, options: &CacheOptions, now: i64) -> CacheEntry<T> {
    CacheEntry::new(
        value,
        CacheMetadata::new(now, options.ttl_ms, options.expiration_threshold_ms),
    )
}

/// Check expiry against the wall clock. Absent metadata is expired.
pub fn is_expired(metadata: Option<&CacheMetadata>) -> bool {
    is_expired_at(metadata, now_ms())
}

/// Check expiry against an explicit `now`.
pub fn is_expired_at(metadata: Option<&CacheMetadata>, now: i64) -> bool {
    let Some(metadata) = metadata else {
        return true;
    };

    match metadata.effective_expiry() {
        Expiry::Never => false,
        Expiry::At(at) => now >= at,
        Expiry::Unknown => true,
    }
}
