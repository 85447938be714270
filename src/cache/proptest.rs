//! Property-Based Tests for the Cache Primitives
//!
//! Uses proptest to verify the slot-set and content-id invariants across
//! arbitrary operation sequences.
//!
//! # Test Properties
//!
//! 1. **Slot capacity**: a slot never reports more than three peers
//! 2. **Slot contiguity**: removal keeps occupied positions contiguous
//! 3. **Tombstone**: only a removal that empties the set leaves a tombstone
//! 4. **ContentId arithmetic**: +/- of a 64-bit delta round-trips and
//!    carries/borrows across the 64-bit word boundary

#![cfg(test)]

use proptest::prelude::*;

use crate::content_id::ContentId;

use super::slot::{Slot, SLOT_WIDTH};

// =============================================================================
// Property Strategies
// =============================================================================

/// Strategy for non-reserved peer codes (small space to force collisions).
fn code_strategy() -> impl Strategy<Value = u16> {
    1u16..=8
}

/// Strategy for sequences of slot operations (insert = true).
fn op_strategy() -> impl Strategy<Value = Vec<(bool, u16)>> {
    prop::collection::vec((any::<bool>(), code_strategy()), 0..64)
}

// =============================================================================
// Slot Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_slot_never_exceeds_capacity(ops in op_strategy()) {
        let mut slot = Slot::default();
        for (is_insert, code) in ops {
            if is_insert {
                slot.insert(code);
            } else {
                slot.remove(code);
            }
            prop_assert!(slot.peers().count() <= SLOT_WIDTH);
        }
    }

    #[test]
    fn prop_slot_peers_are_distinct(ops in op_strategy()) {
        let mut slot = Slot::default();
        for (is_insert, code) in ops {
            if is_insert {
                slot.insert(code);
            } else {
                slot.remove(code);
            }
        }
        let peers: Vec<u16> = slot.peers().collect();
        let mut deduped = peers.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(peers.len(), deduped.len());
    }

    #[test]
    fn prop_slot_inserted_code_is_present(codes in prop::collection::vec(code_strategy(), 1..16)) {
        let mut slot = Slot::default();
        for &code in &codes {
            slot.insert(code);
            // the most recent insertion always survives
            prop_assert!(slot.peers().any(|c| c == code));
        }
    }

    #[test]
    fn prop_slot_tombstone_only_after_emptying_removal(ops in op_strategy()) {
        let mut slot = Slot::default();
        let mut was_active = false;
        for (is_insert, code) in ops {
            if is_insert {
                slot.insert(code);
                was_active = true;
                prop_assert!(!slot.is_removed());
            } else {
                slot.remove(code);
            }
        }
        if slot.is_removed() {
            prop_assert!(was_active);
        }
    }
}

// =============================================================================
// ContentId Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_content_id_add_sub_round_trip(value in any::<u128>(), delta in any::<u64>()) {
        let id = ContentId::new(value);
        prop_assert_eq!((id + delta) - delta, id);
    }

    #[test]
    fn prop_content_id_add_carries(lower in any::<u64>(), delta in any::<u64>()) {
        let id = ContentId::from_parts(0, lower);
        let sum = id + delta;
        let (expected_lower, carried) = lower.overflowing_add(delta);
        prop_assert_eq!(sum.lower(), expected_lower);
        prop_assert_eq!(sum.higher(), u64::from(carried));
    }

    #[test]
    fn prop_content_id_ordering_matches_value(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(ContentId::new(a) < ContentId::new(b), a < b);
    }

    #[test]
    fn prop_page_base_and_offset_partition(value in any::<u128>()) {
        let id = ContentId::new(value);
        prop_assert_eq!(id.page_base() + id.page_offset() as u64, id);
        prop_assert_eq!(id.page_base().page_offset(), 0);
    }
}
