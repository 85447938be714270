//! Base-Path Tokens
//!
//! Each peer stores content for a given type under one base path; the token
//! is opaque here and only reassembled into a real path by the layer above.
//! The table keeps the latest token per (peer, type), overwritten on every
//! insert so a peer that relocates its store converges on the next write.

use std::collections::HashMap;
use std::sync::Arc;

/// (peer, type) → base-path token table
#[derive(Debug, Default)]
pub struct BasePathTable {
    // nested by peer so lookups borrow the key instead of allocating one
    paths: HashMap<String, HashMap<u32, Arc<str>>>,
}

impl BasePathTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token for `(peer, content_type)`, replacing any previous one
    pub fn set(&mut self, peer: &str, content_type: u32, base_path: &str) {
        self.paths
            .entry(peer.to_owned())
            .or_default()
            .insert(content_type, Arc::from(base_path));
    }

    /// Token for `(peer, content_type)`, if one was recorded
    pub fn get(&self, peer: &str, content_type: u32) -> Option<Arc<str>> {
        self.paths.get(peer)?.get(&content_type).cloned()
    }

    /// Number of (peer, type) entries
    pub fn len(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }

    /// True if no tokens are recorded
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut table = BasePathTable::new();
        table.set("peer-a", 1, "/data/base0");

        assert_eq!(table.get("peer-a", 1).as_deref(), Some("/data/base0"));
        assert_eq!(table.get("peer-a", 2), None);
        assert_eq!(table.get("peer-b", 1), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut table = BasePathTable::new();
        table.set("peer-a", 1, "/data/base0");
        table.set("peer-a", 1, "/data/base1");

        assert_eq!(table.get("peer-a", 1).as_deref(), Some("/data/base1"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_types_are_independent() {
        let mut table = BasePathTable::new();
        table.set("peer-a", 1, "/data/t1");
        table.set("peer-a", 2, "/data/t2");

        assert_eq!(table.get("peer-a", 1).as_deref(), Some("/data/t1"));
        assert_eq!(table.get("peer-a", 2).as_deref(), Some("/data/t2"));
        assert_eq!(table.len(), 2);
    }
}
