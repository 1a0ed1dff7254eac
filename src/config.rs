//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment
//! variables. Configuration is fixed at engine construction and immutable
//! thereafter.

use std::env;
use std::time::Duration;

/// Cache engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL applied to entries stored without an explicit one
    pub default_ttl: Duration,
    /// Interval between background expiry sweeps
    pub sweep_interval: Duration,
    /// Whether to mirror the store to a snapshot medium on every mutation
    pub persistence_enabled: bool,
    /// Key under which the snapshot blob is stored in the medium
    pub persistence_key: String,
    /// Whether snapshot bytes are routed through the compression strategy
    pub compression_enabled: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_PERSISTENCE_ENABLED` - Snapshot persistence on/off (default: false)
    /// - `CACHE_PERSISTENCE_KEY` - Snapshot blob key (default: "cache_snapshot")
    /// - `CACHE_COMPRESSION_ENABLED` - Compression hook on/off (default: false)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(300)),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),
            persistence_enabled: env::var("CACHE_PERSISTENCE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            persistence_key: env::var("CACHE_PERSISTENCE_KEY")
                .unwrap_or_else(|_| "cache_snapshot".to_string()),
            compression_enabled: env::var("CACHE_COMPRESSION_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            persistence_enabled: false,
            persistence_key: "cache_snapshot".to_string(),
            compression_enabled: false,
        }
    }
}
