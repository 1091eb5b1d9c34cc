//! Configuration Module
//!
//! Cache construction parameters, with defaults and an optional
//! environment-variable loader for the owning application.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

// == Strategy ==
/// Eviction strategy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Evict the least recently used entry
    Lru,
    /// Evict the least frequently used entry
    Lfu,
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Strategy::Lru),
            "lfu" => Ok(Strategy::Lfu),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

// == Cache Config ==
/// Cache configuration parameters.
///
/// All values can also be loaded from environment variables with sensible
/// defaults; see [`CacheConfig::from_env`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Eviction strategy to build the cache with
    pub strategy: Strategy,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL applied to entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Period of the background expired-entry sweep
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STRATEGY` - `lru` or `lfu` (default: lru)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    ///
    /// Numeric variables fall back to their defaults when absent or
    /// unparseable. `CACHE_STRATEGY`, when present, must name a recognized
    /// strategy; anything else fails with [`ConfigError::UnknownStrategy`].
    pub fn from_env() -> Result<Self> {
        let strategy = match env::var("CACHE_STRATEGY") {
            Ok(raw) => raw.parse()?,
            Err(_) => Strategy::Lru,
        };

        Ok(Self {
            strategy,
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(300)),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(1)),
        })
    }

    /// Checks the configuration for values no cache can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroCleanupInterval);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lru,
            max_entries: 1000,
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.strategy, Strategy::Lru);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.cleanup_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lru".parse::<Strategy>().unwrap(), Strategy::Lru);
        assert_eq!("LFU".parse::<Strategy>().unwrap(), Strategy::Lfu);
    }

    #[test]
    fn test_strategy_from_str_unknown() {
        let err = "arc".parse::<Strategy>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("arc".to_string()));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig {
            max_entries: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = CacheConfig {
            cleanup_interval: Duration::ZERO,
            ..CacheConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCleanupInterval));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_STRATEGY");
        env::remove_var("MAX_ENTRIES");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("CLEANUP_INTERVAL");

        let config = CacheConfig::from_env().unwrap();
        assert_eq!(config.strategy, Strategy::Lru);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.cleanup_interval, Duration::from_secs(1));
    }
}
