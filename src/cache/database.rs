//! Cache Database
//!
//! The orchestrator that ties the pool, the key→page index, the peer codec
//! and the peer tables into the external contract: insert/find/remove plus
//! peer status, statistics and a full-cache dump.
//!
//! Page identity mismatches never escape this module. A mismatch means the
//! pool reused the indexed page for another content range, so the stale
//! index entry is dropped and - on insert - a fresh page allocated and
//! re-indexed. The index and the pool's allocated set stay in bijection:
//! whenever a forced eviction displaces a page, the displaced key is
//! un-indexed in the same operation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::content_id::{ContentId, ContentKey};
use crate::error::{Error, Result};
use crate::peer::{BasePathTable, PeerInfo, PeerStatus, PeerStatusTable};

use super::codec::PeerCodec;
use super::page::{PageRemove, SlotLookup};
use super::pool::{PageIdx, PagePool};
use super::stats::StatKind;

/// One cached location: a readable peer and its base-path token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Peer identifier
    pub peer: String,
    /// Base-path token for the peer and content type
    pub base_path: Arc<str>,
}

/// Outcome of a [`Database::find`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    /// Readable locations for the requested content, possibly empty
    pub locations: Vec<Location>,
    /// True if the content was explicitly deleted (distinct from a miss:
    /// deleted means stop searching, absent means fall back elsewhere)
    pub removed: bool,
}

/// Content-location cache database
///
/// Owns every sub-structure exclusively; all methods take `&mut self`, so
/// wrapping one `Database` in a lock (see [`SharedCache`](crate::SharedCache))
/// serializes every operation by construction.
#[derive(Debug)]
pub struct Database {
    watchdog_limit: u64,
    requests: u64,
    hits: u64,
    pool: PagePool,
    table: HashMap<ContentKey, PageIdx>,
    codec: PeerCodec,
    status: PeerStatusTable,
    paths: BasePathTable,
}

impl Database {
    /// Build a database from `config`
    ///
    /// Fails if the configured capacity is too small to hold a single page.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let pages = config.page_count();
        if pages == 0 {
            return Err(Error::Config(format!(
                "cache capacity {} bytes does not hold a single page",
                config.capacity_bytes
            )));
        }
        Ok(Self {
            watchdog_limit: config.watchdog_limit_secs,
            requests: 0,
            hits: 0,
            pool: PagePool::new(pages),
            table: HashMap::new(),
            codec: PeerCodec::new(),
            status: PeerStatusTable::new(),
            paths: BasePathTable::new(),
        })
    }

    /// Configured watchdog TTL in seconds
    #[inline]
    pub fn watchdog_limit(&self) -> u64 {
        self.watchdog_limit
    }

    /// Record that `peer` holds `(id, content_type, revision)` under
    /// `base_path`
    ///
    /// Also refreshes the base-path token and extends the peer's status
    /// expiry.
    pub fn insert(
        &mut self,
        id: ContentId,
        content_type: u32,
        revision: u32,
        peer: &str,
        base_path: &str,
    ) {
        let key = ContentKey::new(id, content_type);

        let cached = self.table.get(&key).copied();
        let idx = match cached {
            Some(idx) if self.pool.page(idx).matches(id, content_type) => idx,
            cached => {
                if cached.is_some() {
                    // the pool reused this page for another range
                    self.table.remove(&key);
                }
                let alloc = self.pool.alloc();
                if let Some(previous) = alloc.evicted {
                    if self.table.get(&previous) == Some(&alloc.idx) {
                        tracing::debug!(
                            base = %previous.base(),
                            content_type = previous.content_type(),
                            "un-indexing content range displaced by page eviction"
                        );
                        self.table.remove(&previous);
                    }
                }
                self.pool.page_mut(alloc.idx).init(id, content_type);
                self.table.insert(key, alloc.idx);
                alloc.idx
            }
        };

        let code = self.codec.code_for(peer);
        let inserted = self.pool.page_mut(idx).insert(id, content_type, revision, code);
        debug_assert!(inserted, "page magic was validated before insert");

        self.paths.set(peer, content_type, base_path);
        self.status.touch(peer, self.watchdog_limit);
    }

    /// Locations of `(id, content_type, revision)` on currently readable
    /// peers
    ///
    /// Peers without a readable status record and peers without a base-path
    /// token are silently excluded. Counts toward the request statistics; a
    /// hit is counted only when at least one location is returned.
    pub fn find(&mut self, id: ContentId, content_type: u32, revision: u32) -> FindResult {
        self.requests += 1;

        let mut result = FindResult::default();
        let key = ContentKey::new(id, content_type);
        let Some(&idx) = self.table.get(&key) else {
            return result;
        };

        let lookup = match self.pool.page(idx).find(id, content_type, revision) {
            Some(lookup) => lookup,
            None => {
                // stale index entry left behind by a forced eviction
                self.table.remove(&key);
                return result;
            }
        };

        match lookup {
            SlotLookup::Removed => result.removed = true,
            SlotLookup::Miss => {}
            SlotLookup::Found(codes) => {
                for code in codes {
                    let Some(peer) = self.codec.id_for(code) else {
                        continue;
                    };
                    if !self.status.is_readable(peer) {
                        continue;
                    }
                    if let Some(base_path) = self.paths.get(peer, content_type) {
                        result.locations.push(Location {
                            peer: peer.to_owned(),
                            base_path,
                        });
                    }
                }
            }
        }

        if !result.locations.is_empty() {
            self.hits += 1;
        }
        result
    }

    /// Drop `peer`'s copy of `(id, content_type, revision)`
    ///
    /// Releases the page back to the pool when the removal empties it.
    /// Extends the peer's status expiry regardless of outcome.
    pub fn remove(&mut self, id: ContentId, content_type: u32, revision: u32, peer: &str) {
        let key = ContentKey::new(id, content_type);
        if let Some(&idx) = self.table.get(&key) {
            if !self.pool.page(idx).matches(id, content_type) {
                // stale index entry left behind by a forced eviction
                self.table.remove(&key);
            } else {
                let code = self.codec.code_for(peer);
                let outcome = self.pool.page_mut(idx).remove(id, content_type, revision, code);
                if outcome == PageRemove::Empty {
                    tracing::debug!(
                        base = %key.base(),
                        content_type,
                        "releasing emptied cache page"
                    );
                    self.pool.release(idx);
                    self.table.remove(&key);
                }
            }
        }
        self.status.touch(peer, self.watchdog_limit);
    }

    /// Store a status record for `peer`, overwriting any previous one and
    /// stamping its expiry with the watchdog TTL
    pub fn set_status(&mut self, peer: &str, status: PeerStatus) {
        self.status.set(peer, status, self.watchdog_limit);
    }

    /// Current status record for `peer`, expired or not
    pub fn get_status(&self, peer: &str) -> Option<PeerStatus> {
        self.status.get(peer)
    }

    /// All peers with a status record
    pub fn list_peers(&self) -> Vec<String> {
        self.status.ids().map(str::to_owned).collect()
    }

    /// Peers currently writable with at least `require` bytes available
    pub fn list_peers_with_space(&self, require: u64) -> Vec<String> {
        self.status.with_space(require).map(str::to_owned).collect()
    }

    /// Snapshot of all currently valid peers with tier and capacity
    pub fn peer_infos(&self) -> Vec<PeerInfo> {
        self.status.infos()
    }

    /// Remove `peer`'s status record
    ///
    /// Cached page entries referencing the peer are left alone: they fail
    /// the readability check on the next `find` and age out lazily.
    pub fn deregister(&mut self, peer: &str) -> bool {
        self.status.remove(peer)
    }

    /// Read one statistic
    ///
    /// [`StatKind::CountClear`] reports the hit rate in per-mille and resets
    /// the request/hit counters as a side effect.
    pub fn stat(&mut self, kind: StatKind) -> u64 {
        match kind {
            StatKind::Expire => self.watchdog_limit,
            StatKind::Requests => self.requests,
            StatKind::Hits => self.hits,
            StatKind::CountClear => {
                let rate = if self.requests > 0 {
                    self.hits * 1000 / self.requests
                } else {
                    0
                };
                self.requests = 0;
                self.hits = 0;
                rate
            }
            StatKind::AllocatedPages => self.pool.total() as u64,
            StatKind::FreePages => self.pool.free_count() as u64,
            StatKind::ActivePages => self.pool.active_count() as u64,
            StatKind::KnownPeers => self.status.len() as u64,
            StatKind::WritablePeers => self.status.writable_count() as u64,
            StatKind::ReadablePeers => self.status.readable_count() as u64,
        }
    }

    /// Walk every live cache entry
    ///
    /// Visits pages in allocation order (most recently allocated first),
    /// offsets in order and peers in slot position order. The visitor
    /// receives `(content id, type, revision, peer, base path)` and returns
    /// false to stop the walk; `dump` then returns false as well.
    pub fn dump<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(ContentId, u32, u32, &str, Option<&str>) -> bool,
    {
        for idx in self.pool.allocated() {
            let page = self.pool.page(idx);
            let magic = page.magic();
            for (offset, revision, slot) in page.entries() {
                for code in slot.peers() {
                    let Some(peer) = self.codec.id_for(code) else {
                        continue;
                    };
                    let base_path = self.paths.get(peer, magic.content_type());
                    let id = magic.base() + offset as u64;
                    if !visit(
                        id,
                        magic.content_type(),
                        revision as u32,
                        peer,
                        base_path.as_deref(),
                    ) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PAGE_BYTES;
    use crate::peer::PeerTier;

    const TYPE: u32 = 2;
    const REV: u32 = 3;

    fn database(pages: usize) -> Database {
        let config = CacheConfig::new((pages * PAGE_BYTES) as u64);
        Database::new(&config).unwrap()
    }

    fn active(db: &mut Database, peer: &str) {
        db.set_status(peer, PeerStatus::new(1000, PeerTier::Active));
    }

    fn id(value: u128) -> ContentId {
        ContentId::new(value)
    }

    #[test]
    fn test_construction_requires_one_page() {
        let config = CacheConfig::new(0);
        assert!(matches!(Database::new(&config), Err(Error::Config(_))));

        let config = CacheConfig::new((PAGE_BYTES - 1) as u64);
        assert!(Database::new(&config).is_err());

        let config = CacheConfig::new(PAGE_BYTES as u64);
        assert!(Database::new(&config).is_ok());
    }

    #[test]
    fn test_find_never_inserted_is_clean_miss() {
        let mut db = database(2);
        let result = db.find(id(0x10001), TYPE, REV);
        assert!(result.locations.is_empty());
        assert!(!result.removed);
    }

    #[test]
    fn test_insert_then_find_with_writable_peer() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        let result = db.find(id(0x10001), TYPE, REV);
        assert_eq!(result.locations.len(), 1);
        assert_eq!(result.locations[0].peer, "peer-a");
        assert_eq!(result.locations[0].base_path.as_ref(), "/base/a");
        assert!(!result.removed);
    }

    #[test]
    fn test_peer_without_status_is_not_readable() {
        let mut db = database(2);
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        let result = db.find(id(0x10001), TYPE, REV);
        assert!(result.locations.is_empty());
        assert!(!result.removed);
    }

    #[test]
    fn test_revision_bump_clears_old_membership() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        active(&mut db, "peer-b");

        db.insert(id(0x10001), TYPE, 1, "peer-a", "/base/a");
        db.insert(id(0x10001), TYPE, 2, "peer-b", "/base/b");

        let old = db.find(id(0x10001), TYPE, 1);
        assert!(old.locations.is_empty());
        assert!(!old.removed);

        let new = db.find(id(0x10001), TYPE, 2);
        assert_eq!(new.locations.len(), 1);
        assert_eq!(new.locations[0].peer, "peer-b");
    }

    #[test]
    fn test_removing_only_peer_leaves_tombstone() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        // a second offset keeps the page alive so the tombstone survives
        db.insert(id(0x10002), TYPE, REV, "peer-a", "/base/a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        db.remove(id(0x10001), TYPE, REV, "peer-a");

        let result = db.find(id(0x10001), TYPE, REV);
        assert!(result.locations.is_empty());
        assert!(result.removed);
    }

    #[test]
    fn test_emptied_page_returns_to_pool() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        assert_eq!(db.stat(StatKind::ActivePages), 1);

        db.remove(id(0x10001), TYPE, REV, "peer-a");
        assert_eq!(db.stat(StatKind::ActivePages), 0);
        assert_eq!(db.stat(StatKind::FreePages), 2);

        // the tombstone went with the page: this is a plain miss now
        let result = db.find(id(0x10001), TYPE, REV);
        assert!(result.locations.is_empty());
        assert!(!result.removed);
    }

    #[test]
    fn test_forced_eviction_invalidates_oldest_range() {
        let mut db = database(2);
        active(&mut db, "peer-a");

        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        let found = db.find(id(0x10001), TYPE, REV);
        assert_eq!(found.locations.len(), 1);

        // two more distinct ranges overflow the two-page pool
        db.insert(id(0x30001), TYPE, REV, "peer-a", "/base/a");
        db.insert(id(0x40001), TYPE, REV, "peer-a", "/base/a");

        // evicted, not tombstoned: the page was reused, not the key removed
        let evicted = db.find(id(0x10001), TYPE, REV);
        assert!(evicted.locations.is_empty());
        assert!(!evicted.removed);

        // the surviving ranges still resolve
        assert_eq!(db.find(id(0x30001), TYPE, REV).locations.len(), 1);
        assert_eq!(db.find(id(0x40001), TYPE, REV).locations.len(), 1);
        assert_eq!(db.stat(StatKind::ActivePages), 2);
    }

    #[test]
    fn test_insert_reuses_page_for_same_range() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        db.insert(id(0x10002), TYPE, REV, "peer-a", "/base/a");

        assert_eq!(db.stat(StatKind::ActivePages), 1);
    }

    #[test]
    fn test_base_path_refreshes_on_insert() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/old");
        db.insert(id(0x10002), TYPE, REV, "peer-a", "/base/new");

        let result = db.find(id(0x10001), TYPE, REV);
        assert_eq!(result.locations[0].base_path.as_ref(), "/base/new");
    }

    #[test]
    fn test_insert_touches_peer_expiry() {
        let mut db = database(2);
        db.set_status("peer-a", PeerStatus::new(1000, PeerTier::Active));
        let before = db.get_status("peer-a").unwrap().expire_at;

        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        let after = db.get_status("peer-a").unwrap().expire_at;
        assert!(after >= before);
    }

    #[test]
    fn test_stat_hit_rate_resets_counters() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        db.find(id(0x10001), TYPE, REV); // hit
        db.find(id(0x20001), TYPE, REV); // miss

        assert_eq!(db.stat(StatKind::Requests), 2);
        assert_eq!(db.stat(StatKind::Hits), 1);
        assert_eq!(db.stat(StatKind::CountClear), 500);
        assert_eq!(db.stat(StatKind::Requests), 0);
        assert_eq!(db.stat(StatKind::Hits), 0);
        assert_eq!(db.stat(StatKind::CountClear), 0);
    }

    #[test]
    fn test_stat_pool_and_peer_counts() {
        let mut db = database(3);
        active(&mut db, "peer-a");
        db.set_status("peer-b", PeerStatus::new(0, PeerTier::Readonly));
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        assert_eq!(db.stat(StatKind::Expire), 15);
        assert_eq!(db.stat(StatKind::AllocatedPages), 3);
        assert_eq!(db.stat(StatKind::FreePages), 2);
        assert_eq!(db.stat(StatKind::ActivePages), 1);
        assert_eq!(db.stat(StatKind::KnownPeers), 2);
        assert_eq!(db.stat(StatKind::WritablePeers), 1);
        assert_eq!(db.stat(StatKind::ReadablePeers), 2);
    }

    #[test]
    fn test_deregister_leaves_cache_entries_to_age_out() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");

        assert!(db.deregister("peer-a"));
        assert_eq!(db.get_status("peer-a"), None);

        // entry still cached, but the peer fails the readability check
        let result = db.find(id(0x10001), TYPE, REV);
        assert!(result.locations.is_empty());
        assert!(!result.removed);
    }

    #[test]
    fn test_list_peers_and_space_filter() {
        let mut db = database(2);
        db.set_status("big", PeerStatus::new(5000, PeerTier::Active));
        db.set_status("small", PeerStatus::new(10, PeerTier::Active));

        let mut all = db.list_peers();
        all.sort_unstable();
        assert_eq!(all, vec!["big", "small"]);

        assert_eq!(db.list_peers_with_space(1000), vec!["big"]);
    }

    #[test]
    fn test_dump_walks_live_entries() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        db.insert(id(0x10005), TYPE, 4, "peer-a", "/base/a");

        let mut seen = Vec::new();
        let complete = db.dump(|cid, typ, rev, peer, base| {
            seen.push((cid, typ, rev, peer.to_owned(), base.map(str::to_owned)));
            true
        });

        assert!(complete);
        seen.sort_by_key(|(cid, ..)| *cid);
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            (
                id(0x10001),
                TYPE,
                REV,
                "peer-a".to_owned(),
                Some("/base/a".to_owned())
            )
        );
        assert_eq!(seen[1].0, id(0x10005));
        assert_eq!(seen[1].2, 4);
    }

    #[test]
    fn test_dump_stops_when_visitor_declines() {
        let mut db = database(2);
        active(&mut db, "peer-a");
        db.insert(id(0x10001), TYPE, REV, "peer-a", "/base/a");
        db.insert(id(0x10002), TYPE, REV, "peer-a", "/base/a");

        let mut count = 0;
        let complete = db.dump(|_, _, _, _, _| {
            count += 1;
            false
        });
        assert!(!complete);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_remove_on_unknown_range_still_touches_peer() {
        let mut db = database(2);
        db.set_status("peer-a", PeerStatus::new(1000, PeerTier::Active));
        let before = db.get_status("peer-a").unwrap().expire_at;

        db.remove(id(0x70001), TYPE, REV, "peer-a");
        assert!(db.get_status("peer-a").unwrap().expire_at >= before);
    }
}
