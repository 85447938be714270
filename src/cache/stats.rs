//! Statistics Keys
//!
//! Stable small-integer keys for [`Database::stat`](super::Database::stat).
//! The numeric values are part of the external contract (console tooling
//! addresses counters by number), so they carry explicit discriminants.

use serde::{Deserialize, Serialize};

/// Addressable statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum StatKind {
    /// Configured watchdog TTL in seconds
    Expire = 1,
    /// Lifetime find-request count
    Requests = 2,
    /// Lifetime find-hit count
    Hits = 3,
    /// Hit rate in per-mille; reading it resets both counters
    CountClear = 4,

    /// Total pages in the pool
    AllocatedPages = 10,
    /// Pages currently free
    FreePages = 11,
    /// Pages currently holding cache content
    ActivePages = 12,

    /// Peers with a status record
    KnownPeers = 20,
    /// Peers currently writable (scans the status table)
    WritablePeers = 21,
    /// Peers currently readable (scans the status table)
    ReadablePeers = 22,
}

impl StatKind {
    /// Numeric key value
    #[inline]
    pub fn key(self) -> u32 {
        self as u32
    }

    /// Resolve a numeric key
    pub fn from_key(key: u32) -> Option<Self> {
        match key {
            1 => Some(Self::Expire),
            2 => Some(Self::Requests),
            3 => Some(Self::Hits),
            4 => Some(Self::CountClear),
            10 => Some(Self::AllocatedPages),
            11 => Some(Self::FreePages),
            12 => Some(Self::ActivePages),
            20 => Some(Self::KnownPeers),
            21 => Some(Self::WritablePeers),
            22 => Some(Self::ReadablePeers),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(StatKind::Expire.key(), 1);
        assert_eq!(StatKind::CountClear.key(), 4);
        assert_eq!(StatKind::AllocatedPages.key(), 10);
        assert_eq!(StatKind::ActivePages.key(), 12);
        assert_eq!(StatKind::KnownPeers.key(), 20);
        assert_eq!(StatKind::ReadablePeers.key(), 22);
    }

    #[test]
    fn test_from_key_round_trip() {
        for kind in [
            StatKind::Expire,
            StatKind::Requests,
            StatKind::Hits,
            StatKind::CountClear,
            StatKind::AllocatedPages,
            StatKind::FreePages,
            StatKind::ActivePages,
            StatKind::KnownPeers,
            StatKind::WritablePeers,
            StatKind::ReadablePeers,
        ] {
            assert_eq!(StatKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(StatKind::from_key(0), None);
        assert_eq!(StatKind::from_key(99), None);
    }
}
