//! LocaStor - In-Memory Content-Location Cache
//!
//! The content-location cache at the heart of a distributed object-storage
//! gateway: for a given content identifier, type and revision it tracks
//! which peer nodes hold a copy, where on each peer the copy lives, and
//! whether each peer is currently able to serve or accept data.
//!
//! # Architecture
//!
//! ```text
//! callers ──▶ SharedCache (one lock) ──▶ Database
//!                                          ├── PagePool     fixed page arena
//!                                          ├── PeerCodec    id ↔ 15-bit code
//!                                          ├── PeerStatus   TTL liveness
//!                                          └── BasePaths    (peer,type)→token
//! ```
//!
//! Memory is bounded up front: the configured capacity is carved into a
//! fixed pool of 4096-offset pages, and running out of pages force-evicts
//! the least-recently-allocated content range. This is a pure cache, not a
//! record of truth - peers re-announce what they hold, so an evicted range
//! simply refills on the next announcement.
//!
//! # Example
//!
//! ```
//! use locastor::{CacheConfig, ContentId, PeerStatus, PeerTier, SharedCache};
//!
//! let cache = SharedCache::new(&CacheConfig::new(4 * 1024 * 1024)).unwrap();
//! cache.set_status("peer-a", PeerStatus::new(1 << 30, PeerTier::Active));
//! cache.insert(ContentId::new(0x10001), 2, 3, "peer-a", "/export/base0");
//!
//! let found = cache.find(ContentId::new(0x10001), 2, 3);
//! assert_eq!(found.locations[0].peer, "peer-a");
//! ```
//!
//! # Modules
//!
//! - [`cache`] - page-pooled cache table and the orchestrating database
//! - [`peer`] - peer liveness, capability and base-path bookkeeping
//! - [`config`] - construction parameters
//! - [`error`] - error types
//! - [`shared`](SharedCache) - single-lock concurrency wrapper

pub mod cache;
pub mod config;
pub mod content_id;
pub mod error;
pub mod peer;

mod shared;

// Re-export commonly used types
pub use cache::{Database, FindResult, Location, StatKind};
pub use config::CacheConfig;
pub use content_id::{ContentId, ContentKey};
pub use error::{Error, Result};
pub use peer::{PeerInfo, PeerStatus, PeerTier};
pub use shared::SharedCache;
