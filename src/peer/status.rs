//! Peer Liveness and Capability
//!
//! Every peer reports a capability tier and its available space; the
//! gateway stamps each report with an expiry. A record is never swept: it
//! simply stops counting as valid once its TTL elapses, and the next report
//! (or any successful insert/remove touching the peer) refreshes it.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Capability tier of a peer
///
/// Ordered: a higher tier implies every capability of the lower ones. The
/// numeric values are part of the external status protocol.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum PeerTier {
    /// No capability reported
    #[default]
    Unknown = 0,
    /// Under maintenance, serves nothing
    Maintenance = 10,
    /// Serves reads only
    Readonly = 20,
    /// Serves reads and accepts writes
    Active = 30,
}

impl std::fmt::Display for PeerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerTier::Unknown => write!(f, "Unknown"),
            PeerTier::Maintenance => write!(f, "Maintenance"),
            PeerTier::Readonly => write!(f, "Readonly"),
            PeerTier::Active => write!(f, "Active"),
        }
    }
}

/// Epoch seconds
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Per-peer status record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerStatus {
    /// Available capacity in bytes
    pub available: u64,
    /// Absolute expiry of this record (epoch seconds)
    pub expire_at: u64,
    /// Capability tier
    pub tier: PeerTier,
}

impl PeerStatus {
    /// Create a record; the table stamps `expire_at` when it is stored
    pub fn new(available: u64, tier: PeerTier) -> Self {
        Self {
            available,
            expire_at: 0,
            tier,
        }
    }

    /// True while the record's TTL has not elapsed
    #[inline]
    pub fn is_valid(&self) -> bool {
        now_secs() < self.expire_at
    }

    /// Valid and at least read-capable
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.is_valid() && self.tier >= PeerTier::Readonly
    }

    /// Valid and write-capable
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.is_valid() && self.tier >= PeerTier::Active
    }

    /// Writable with at least `require` bytes available
    #[inline]
    pub fn has_space(&self, require: u64) -> bool {
        self.is_writable() && self.available >= require
    }
}

/// Snapshot of one live peer, as reported by [`PeerStatusTable::infos`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Peer identifier
    pub peer: String,
    /// Capability tier
    pub tier: PeerTier,
    /// Available capacity in bytes
    pub available: u64,
}

/// Peer id → status record table
#[derive(Debug, Default)]
pub struct PeerStatusTable {
    records: HashMap<String, PeerStatus>,
}

impl PeerStatusTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `status` for `peer`, overwriting any previous record and
    /// stamping the expiry `ttl_secs` from now
    pub fn set(&mut self, peer: &str, mut status: PeerStatus, ttl_secs: u64) {
        status.expire_at = now_secs() + ttl_secs;
        self.records.insert(peer.to_owned(), status);
    }

    /// Current record for `peer`, expired or not
    pub fn get(&self, peer: &str) -> Option<PeerStatus> {
        self.records.get(peer).copied()
    }

    /// Extend the expiry of an existing record; absent peers are ignored
    pub fn touch(&mut self, peer: &str, ttl_secs: u64) {
        if let Some(status) = self.records.get_mut(peer) {
            status.expire_at = now_secs() + ttl_secs;
        }
    }

    /// De-register a peer; returns true if a record was removed
    pub fn remove(&mut self, peer: &str) -> bool {
        self.records.remove(peer).is_some()
    }

    /// True if `peer` has a currently readable record
    pub fn is_readable(&self, peer: &str) -> bool {
        self.records.get(peer).is_some_and(PeerStatus::is_readable)
    }

    /// Number of peers with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no peer has a record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All known peer ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Peers currently writable with at least `require` bytes available
    pub fn with_space(&self, require: u64) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |(_, s)| s.has_space(require))
            .map(|(peer, _)| peer.as_str())
    }

    /// Peers with a currently writable record
    pub fn writable_count(&self) -> usize {
        self.records.values().filter(|s| s.is_writable()).count()
    }

    /// Peers with a currently readable record
    pub fn readable_count(&self) -> usize {
        self.records.values().filter(|s| s.is_readable()).count()
    }

    /// Snapshot of all currently valid peers
    pub fn infos(&self) -> Vec<PeerInfo> {
        self.records
            .iter()
            .filter(|(_, s)| s.is_valid())
            .map(|(peer, s)| PeerInfo {
                peer: peer.clone(),
                tier: s.tier,
                available: s.available,
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
