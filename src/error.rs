//! Error types for cache construction
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while building a cache instance.
///
/// These are the only error outcomes in the crate: runtime operations never
/// fail, and a cache miss is reported as `None` rather than an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested eviction strategy is not one of the recognized values
    #[error("unsupported cache strategy: {0}")]
    UnknownStrategy(String),

    /// `max_entries` must be at least 1
    #[error("max_entries must be greater than zero")]
    ZeroCapacity,

    /// A zero-period sweep timer cannot be scheduled
    #[error("cleanup_interval must be greater than zero")]
    ZeroCleanupInterval,
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, ConfigError>;
