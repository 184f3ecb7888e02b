//! Cache entry and its metadata.
//!
//! The same pairing is stored by every tier: the memory store keeps it
//! verbatim, and adapters persist it in whatever format they choose.

use serde::{Deserialize, Serialize};

use crate::expiration::Expiry;

/// Sentinel stored in `expires_at` for entries that never expire.
pub const NEVER_EXPIRES: i64 = -1;

/// Timing metadata attached to every cached value.
///
/// All timestamps are milliseconds since the Unix epoch. Entries created by
/// this crate always populate every field; the optional fields exist so that
/// records written by other adapter implementations still deserialize, and
/// are then judged fail-closed by the expiration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// When the entry was created.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Nominal lifetime. Negative means the entry never expires.
    #[serde(default)]
    pub ttl_ms: Option<i64>,
    /// Margin subtracted from the nominal expiry to force an early refresh.
    #[serde(default)]
    pub expiration_threshold_ms: i64,
    /// Precomputed absolute expiry, or [`NEVER_EXPIRES`].
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl CacheMetadata {
    /// Build metadata from its parts, computing `expires_at` once.
    pub fn new(created_at: i64, ttl_ms: i64, expiration_threshold_ms: i64) -> Self {
        let expires_at = if ttl_ms < 0 {
            NEVER_EXPIRES
        } else {
            created_at
                .saturating_add(ttl_ms)
                .saturating_sub(expiration_threshold_ms)
        };

        Self {
            created_at: Some(created_at),
            ttl_ms: Some(ttl_ms),
            expiration_threshold_ms,
            expires_at: Some(expires_at),
        }
    }

    /// Returns true if this metadata marks its entry as never expiring.
    pub fn never_expires(&self) -> bool {
        self.effective_expiry() == Expiry::Never
    }
}

/// A cached value together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value, opaque to the cache.
    pub data: T,
    /// Timing metadata. A record without metadata is always expired.
    #[serde(default)]
    pub metadata: CacheMetadata,
}

impl<T> CacheEntry<T> {
    /// Pair a value with existing metadata.
    pub fn new(data: T, metadata: CacheMetadata) -> Self {
        Self { data, metadata }
    }

    /// Consume the entry and return the value.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Map the inner value, keeping the metadata untouched.
    pub fn map<U, F>(self, f: F) -> CacheEntry<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheEntry {
            data: f(self.data),
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_new_with_threshold() {
        let metadata = CacheMetadata::new(1_000, 10_000, 2_000);
        assert_eq!(metadata.created_at, Some(1_000));
        assert_eq!(metadata.ttl_ms, Some(10_000));
        assert_eq!(metadata.expiration_threshold_ms, 2_000);
        assert_eq!(metadata.expires_at, Some(9_000));
        assert!(!metadata.never_expires());
    }

    #[test]
    fn test_metadata_negative_ttl_never_expires() {
        let metadata = CacheMetadata::new(1_000, -1, 500);
        assert_eq!(metadata.expires_at, Some(NEVER_EXPIRES));
        assert!(metadata.never_expires());
    }

    #[test]
    fn test_metadata_threshold_larger_than_ttl_is_in_the_past() {
        let metadata = CacheMetadata::new(1_000, 100, 5_000);
        assert_eq!(metadata.expires_at, Some(-3_900));
        assert!(!metadata.never_expires());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let metadata = CacheMetadata::new(10, 20, 5);
        let json = serde_json::to_value(metadata).unwrap();
        assert_eq!(json["createdAt"], 10);
        assert_eq!(json["ttlMs"], 20);
        assert_eq!(json["expirationThresholdMs"], 5);
        assert_eq!(json["expiresAt"], 25);
    }

    #[test]
    fn test_foreign_metadata_missing_fields_deserializes() {
        let metadata: CacheMetadata =
            serde_json::from_str(r#"{"createdAt": 100, "ttlMs": 50}"#).unwrap();
        assert_eq!(metadata.created_at, Some(100));
        assert_eq!(metadata.ttl_ms, Some(50));
        assert_eq!(metadata.expiration_threshold_ms, 0);
        assert_eq!(metadata.expires_at, None);
    }

    #[test]
    fn test_entry_without_metadata_deserializes_empty() {
        let entry: CacheEntry<String> = serde_json::from_str(r#"{"data": "v"}"#).unwrap();
        assert_eq!(entry.data, "v");
        assert_eq!(entry.metadata, CacheMetadata::default());
    }

    #[test]
    fn test_entry_map_keeps_metadata() {
        let metadata = CacheMetadata::new(0, 1_000, 0);
        let entry = CacheEntry::new(21, metadata).map(|v| v * 2);
        assert_eq!(entry.data, 42);
        assert_eq!(entry.metadata, metadata);
        assert_eq!(entry.into_data(), 42);
    }
}
