//! Peer Bookkeeping
//!
//! Liveness, capability and storage-location state for the peer nodes the
//! gateway routes to:
//!
//! - [`status`] - per-peer liveness/capability records with TTL expiry
//! - [`paths`] - per-(peer, type) base-path tokens for locating content

mod paths;
mod status;

pub use paths::BasePathTable;
pub use status::{PeerInfo, PeerStatus, PeerStatusTable, PeerTier};
