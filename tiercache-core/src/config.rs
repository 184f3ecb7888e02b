//! Configuration loading for cache options.
//!
//! Options are read from TOML; missing keys take the defaults.
//!
//! ```toml
//! ttl_ms = 600000
//! expiration_threshold_ms = 30000
//! ```

use std::path::Path;

use crate::error::ConfigError;
use crate::options::CacheOptions;

impl CacheOptions {
    /// Parse and validate options from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: CacheOptions = toml::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Read, parse and validate options from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate option values.
    ///
    /// Any TTL is accepted (negative disables expiry) and a threshold larger
    /// than the TTL is legal. A negative threshold would extend entries past
    /// their TTL and is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration_threshold_ms < 0 {
            return Err(ConfigError::InvalidValue {
                field: "expiration_threshold_ms",
                reason: "must be >= 0".to_string(),
            });
        }
        Ok(())
    }
}
