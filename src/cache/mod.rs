//! Page-Pooled Content-Location Cache
//!
//! The hot path of the gateway: every read and write consults this cache to
//! learn which peers hold a given (content id, type, revision) and where.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Database                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ContentKey → page index   │  PeerStatusTable │  BasePathTable   │
//! │  ┌────────────────────┐    │  (TTL liveness)  │  (peer,type)→    │
//! │  │      PagePool      │    │                  │   base token     │
//! │  │  fixed page arena  │    ├──────────────────┴──────────────────┤
//! │  │  free ∪ allocated  │    │             PeerCodec               │
//! │  └────────────────────┘    │  peer id ↔ dense 15-bit code        │
//! │     CachePage[4096]        │                                     │
//! │     revision + Slot        │                                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - Bounded memory: all pages are pre-allocated at construction; exhausting
//!   the pool force-evicts the least-recently-allocated page.
//! - O(1)-ish operations: one hash lookup plus array indexing per call.
//! - Miss is not an error: absent content, stale revisions and unreachable
//!   peers all surface as empty results.

mod codec;
mod database;
mod page;
mod pool;
mod slot;
mod stats;

mod proptest;

pub use codec::{PeerCode, PeerCodec, PEER_CODE_SPACE};
pub use database::{Database, FindResult, Location};
pub use page::{CachePage, PageRemove, SlotLookup};
pub use pool::{PageAlloc, PageIdx, PagePool};
pub use slot::{PeerSet, Slot, SLOT_WIDTH};
pub use stats::StatKind;

/// Offsets per cache page. Must be a power of two.
pub const PAGE_SIZE: usize = 4096;

/// Reserved byte footprint of one page, rounded up to a 4 KiB multiple.
///
/// Capacity-to-page-count translation divides the configured cache size by
/// this value, so it deliberately over-counts the per-offset payload
/// (revision byte + slot) to leave headroom for table bookkeeping.
pub const PAGE_BYTES: usize =
    (PAGE_SIZE * (std::mem::size_of::<Slot>() + 1) + 4095) & !4095;

// =============================================================================
// Tests
// =============================================================================
