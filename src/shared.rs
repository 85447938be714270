//! Shared Cache Handle
//!
//! The [`Database`] takes `&mut self` for every operation; `SharedCache`
//! wraps one instance in a single process-wide lock so any number of
//! threads can use it. Each call acquires the lock for its full duration -
//! callers observe every operation as atomic, and no operation blocks on
//! anything but the lock itself (all work is in-memory map and array
//! manipulation).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{Database, FindResult, StatKind};
use crate::config::CacheConfig;
use crate::content_id::ContentId;
use crate::error::Result;
use crate::peer::{PeerInfo, PeerStatus};

/// Thread-safe handle to a content-location cache
///
/// Cheap to clone; all clones share the same underlying database.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<Database>>,
}

impl SharedCache {
    /// Build a cache from `config`
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(Database::new(config)?)),
        })
    }

    /// See [`Database::insert`]
    pub fn insert(
        &self,
        id: ContentId,
        content_type: u32,
        revision: u32,
        peer: &str,
        base_path: &str,
    ) {
        self.inner
            .lock()
            .insert(id, content_type, revision, peer, base_path);
    }

    /// See [`Database::find`]
    pub fn find(&self, id: ContentId, content_type: u32, revision: u32) -> FindResult {
        self.inner.lock().find(id, content_type, revision)
    }

    /// See [`Database::remove`]
    pub fn remove(&self, id: ContentId, content_type: u32, revision: u32, peer: &str) {
        self.inner.lock().remove(id, content_type, revision, peer);
    }

    /// See [`Database::set_status`]
    pub fn set_status(&self, peer: &str, status: PeerStatus) {
        self.inner.lock().set_status(peer, status);
    }

    /// See [`Database::get_status`]
    pub fn get_status(&self, peer: &str) -> Option<PeerStatus> {
        self.inner.lock().get_status(peer)
    }

    /// See [`Database::list_peers`]
    pub fn list_peers(&self) -> Vec<String> {
        self.inner.lock().list_peers()
    }

    /// See [`Database::list_peers_with_space`]
    pub fn list_peers_with_space(&self, require: u64) -> Vec<String> {
        self.inner.lock().list_peers_with_space(require)
    }

    /// See [`Database::peer_infos`]
    pub fn peer_infos(&self) -> Vec<PeerInfo> {
        self.inner.lock().peer_infos()
    }

    /// See [`Database::deregister`]
    pub fn deregister(&self, peer: &str) -> bool {
        self.inner.lock().deregister(peer)
    }

    /// See [`Database::watchdog_limit`]
    pub fn watchdog_limit(&self) -> u64 {
        self.inner.lock().watchdog_limit()
    }

    /// See [`Database::stat`]
    pub fn stat(&self, kind: StatKind) -> u64 {
        self.inner.lock().stat(kind)
    }

    /// See [`Database::dump`]
    ///
    /// The lock is held for the whole walk; this is a diagnostics path, not
    /// a hot one.
    pub fn dump<F>(&self, visit: F) -> bool
    where
        F: FnMut(ContentId, u32, u32, &str, Option<&str>) -> bool,
    {
        self.inner.lock().dump(visit)
    }
}

// =============================================================================
// Tests
// =============================================================================
