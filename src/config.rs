//! Cache Configuration

use serde::{Deserialize, Serialize};

use crate::cache::PAGE_BYTES;

/// Default cache capacity (256 MiB)
pub const DEFAULT_CAPACITY: u64 = 256 * 1024 * 1024;

/// Default watchdog TTL in seconds
pub const DEFAULT_WATCHDOG_LIMIT: u64 = 15;

/// Cache construction parameters
///
/// Capacity is given in bytes and translated to a page count; a capacity
/// below one page footprint fails construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache capacity in bytes
    pub capacity_bytes: u64,
    /// Seconds until an unrefreshed peer status stops counting as valid
    pub watchdog_limit_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY,
            watchdog_limit_secs: DEFAULT_WATCHDOG_LIMIT,
        }
    }
}

impl CacheConfig {
    /// Configuration with the given capacity and the default watchdog TTL
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            ..Self::default()
        }
    }

    /// Override the watchdog TTL
    pub fn with_watchdog_limit(mut self, secs: u64) -> Self {
        self.watchdog_limit_secs = secs;
        self
    }

    /// Number of pool pages the configured capacity affords
    pub fn page_count(&self) -> usize {
        (self.capacity_bytes / PAGE_BYTES as u64) as usize
    }
}

// =============================================================================
// Tests
// =============================================================================
