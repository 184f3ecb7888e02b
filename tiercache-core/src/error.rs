//! Error types for tiercache operations

use thiserror::Error;

/// Boxed error produced by adapters and loaders.
///
/// The cache never inspects these; they are carried to the caller as the
/// `source()` of a [`CacheError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for cache lookups.
///
/// Adapter and loader failures are wrapped with the key being resolved but
/// otherwise surface unchanged through `source()`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Adapter error for key {key}: {source}")]
    Adapter {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Loader error for key {key}: {source}")]
    Loader {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Memory store lock poisoned")]
    LockPoisoned,

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// Key of the lookup that failed, when the failure came from a tier.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Adapter { key, .. } | Self::Loader { key, .. } => Some(key),
            Self::LockPoisoned | Self::Config(_) => None,
        }
    }

    /// Returns true if the failure came from the adapter tier.
    pub fn is_adapter(&self) -> bool {
        matches!(self, Self::Adapter { .. })
    }

    /// Returns true if the failure came from the loader.
    pub fn is_loader(&self) -> bool {
        matches!(self, Self::Loader { .. })
    }
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("connection refused")]
    struct Refused;

    #[test]
    fn test_adapter_error_preserves_source() {
        let err = CacheError::Adapter {
            key: "user:1".to_string(),
            source: Box::new(Refused),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Adapter error"));
        assert!(msg.contains("user:1"));
        assert!(msg.contains("connection refused"));

        let source = err.source().expect("adapter error has a source");
        assert!(source.downcast_ref::<Refused>().is_some());
        assert_eq!(err.key(), Some("user:1"));
        assert!(err.is_adapter());
        assert!(!err.is_loader());
    }

    #[test]
    fn test_loader_error_display() {
        let err = CacheError::Loader {
            key: "k".to_string(),
            source: "upstream timed out".into(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Loader error"));
        assert!(msg.contains("upstream timed out"));
        assert!(err.is_loader());
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "expiration_threshold_ms",
            reason: "must be >= 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("expiration_threshold_ms"));
        assert!(msg.contains("must be >= 0"));

        let wrapped: CacheError = err.into();
        assert!(wrapped.key().is_none());
        assert!(format!("{}", wrapped).starts_with("Config error"));
    }

    #[test]
    fn test_lock_poisoned_has_no_key() {
        assert_eq!(CacheError::LockPoisoned.key(), None);
    }
}
