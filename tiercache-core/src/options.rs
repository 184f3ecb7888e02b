//! Per-instance cache options and per-call overrides.

use serde::{Deserialize, Serialize};

/// Default lifetime of a cached entry: one hour.
pub const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

/// Default expiration threshold: no early refresh.
pub const DEFAULT_EXPIRATION_THRESHOLD_MS: i64 = 0;

/// Options used when writing new entries.
///
/// A cache instance holds one set of defaults; individual lookups can
/// override either field with a [`CacheOptionsOverride`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptions {
    /// Nominal lifetime of new entries. Negative means never expire.
    pub ttl_ms: i64,
    /// Margin subtracted from `ttl_ms` to force an earlier refresh.
    pub expiration_threshold_ms: i64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            expiration_threshold_ms: DEFAULT_EXPIRATION_THRESHOLD_MS,
        }
    }
}

impl CacheOptions {
    /// Create options with explicit values.
    pub fn new(ttl_ms: i64, expiration_threshold_ms: i64) -> Self {
        Self {
            ttl_ms,
            expiration_threshold_ms,
        }
    }

    /// Options whose entries never expire.
    pub fn never_expire() -> Self {
        Self::default().with_ttl_ms(-1)
    }

    /// Set the TTL.
    pub fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Set the expiration threshold.
    pub fn with_expiration_threshold_ms(mut self, threshold_ms: i64) -> Self {
        self.expiration_threshold_ms = threshold_ms;
        self
    }

    /// Apply a per-call override on top of these defaults.
    pub fn merge(&self, overrides: &CacheOptionsOverride) -> CacheOptions {
        CacheOptions {
            ttl_ms: overrides.ttl_ms.unwrap_or(self.ttl_ms),
            expiration_threshold_ms: overrides
                .expiration_threshold_ms
                .unwrap_or(self.expiration_threshold_ms),
        }
    }
}

/// Partial override of [`CacheOptions`] for a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptionsOverride {
    pub ttl_ms: Option<i64>,
    pub expiration_threshold_ms: Option<i64>,
}

impl CacheOptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn expiration_threshold_ms(mut self, threshold_ms: i64) -> Self {
        self.expiration_threshold_ms = Some(threshold_ms);
        self
    }

    /// Returns true if neither field is overridden.
    pub fn is_empty(&self) -> bool {
        self.ttl_ms.is_none() && self.expiration_threshold_ms.is_none()
    }
}

impl From<CacheOptions> for CacheOptionsOverride {
    fn from(options: CacheOptions) -> Self {
        Self {
            ttl_ms: Some(options.ttl_ms),
            expiration_threshold_ms: Some(options.expiration_threshold_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CacheOptions::default();
        assert_eq!(options.ttl_ms, 3_600_000);
        assert_eq!(options.expiration_threshold_ms, 0);
    }

    #[test]
    fn test_builder() {
        let options = CacheOptions::default()
            .with_ttl_ms(1_000)
            .with_expiration_threshold_ms(100);
        assert_eq!(options, CacheOptions::new(1_000, 100));
        assert_eq!(CacheOptions::never_expire().ttl_ms, -1);
    }

    #[test]
    fn test_merge_empty_override_keeps_defaults() {
        let defaults = CacheOptions::new(5_000, 500);
        let overrides = CacheOptionsOverride::new();
        assert!(overrides.is_empty());
        assert_eq!(defaults.merge(&overrides), defaults);
    }

    #[test]
    fn test_merge_partial_override() {
        let defaults = CacheOptions::new(5_000, 500);

        let ttl_only = CacheOptionsOverride::new().ttl_ms(-1);
        assert_eq!(defaults.merge(&ttl_only), CacheOptions::new(-1, 500));

        let threshold_only = CacheOptionsOverride::new().expiration_threshold_ms(0);
        assert_eq!(defaults.merge(&threshold_only), CacheOptions::new(5_000, 0));
    }

    #[test]
    fn test_full_override_from_options() {
        let defaults = CacheOptions::default();
        let replacement = CacheOptions::new(10, 1);
        assert_eq!(defaults.merge(&replacement.into()), replacement);
    }
}
