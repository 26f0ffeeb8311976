//! Property-based tests for RedBlackTree.
//!
//! These tests check the set algebra against a sorted, deduplicated `Vec`
//! reference and verify that the red-black invariants hold after every
//! single update.

use persistent_red_black::persistent::RedBlackTree;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// Reference Model
// =============================================================================

fn sorted_unique(items: &[i16]) -> Vec<i16> {
    let mut sorted = items.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

fn to_tree(items: &[i16]) -> RedBlackTree<i16> {
    items.iter().copied().collect()
}

fn to_vec(tree: &RedBlackTree<i16>) -> Vec<i16> {
    tree.iter().copied().collect()
}

type Entry = (i8, u8);

fn by_key(left: &Entry, right: &Entry) -> Ordering {
    left.0.cmp(&right.0)
}

type KeyedTree = RedBlackTree<Entry, fn(&Entry, &Entry) -> Ordering>;

fn to_keyed_tree(entries: &[Entry]) -> KeyedTree {
    let comparator: fn(&Entry, &Entry) -> Ordering = by_key;
    entries
        .iter()
        .fold(RedBlackTree::with_comparator(comparator), |tree, &entry| {
            tree.upsert(entry)
        })
}

/// Later entries overwrite earlier ones with the same key.
fn keyed_model(entries: &[Entry]) -> BTreeMap<i8, u8> {
    entries.iter().copied().collect()
}

#[derive(Clone, Debug)]
enum Operation {
    Upsert(i8),
    Delete(i8),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        any::<i8>().prop_map(Operation::Upsert),
        any::<i8>().prop_map(Operation::Delete),
    ]
}

// =============================================================================
// Set Algebra Laws
// =============================================================================

proptest! {
    /// Law: iteration yields the sorted distinct items.
    #[test]
    fn prop_iteration_is_sorted_and_distinct(items in prop::collection::vec(any::<i16>(), 0..200)) {
        let tree = to_tree(&items);
        prop_assert_eq!(to_vec(&tree), sorted_unique(&items));
        prop_assert_eq!(tree.len(), sorted_unique(&items).len());
        prop_assert!(tree.validate_invariants().is_ok());
    }

    /// Law: union contains every item of both sides.
    #[test]
    fn prop_union_matches_model(
        left in prop::collection::vec(-50_i16..50, 0..80),
        right in prop::collection::vec(-50_i16..50, 0..80)
    ) {
        let union = to_tree(&left).union(&to_tree(&right));
        let expected = sorted_unique(&[left, right].concat());
        prop_assert_eq!(to_vec(&union), expected.clone());
        prop_assert_eq!(union.len(), expected.len());
        prop_assert!(union.validate_invariants().is_ok());
    }

    /// Law: intersection contains the items present on both sides.
    #[test]
    fn prop_intersection_matches_model(
        left in prop::collection::vec(-50_i16..50, 0..80),
        right in prop::collection::vec(-50_i16..50, 0..80)
    ) {
        let intersection = to_tree(&left).intersection(&to_tree(&right));
        let right_items = sorted_unique(&right);
        let expected: Vec<i16> = sorted_unique(&left)
            .into_iter()
            .filter(|item| right_items.binary_search(item).is_ok())
            .collect();
        prop_assert_eq!(to_vec(&intersection), expected.clone());
        prop_assert_eq!(intersection.len(), expected.len());
        prop_assert!(intersection.validate_invariants().is_ok());
    }

    /// Law: subtract keeps the items of the left side absent on the right.
    #[test]
    fn prop_subtract_matches_model(
        left in prop::collection::vec(-50_i16..50, 0..80),
        right in prop::collection::vec(-50_i16..50, 0..80)
    ) {
        let difference = to_tree(&left).subtract(&to_tree(&right));
        let right_items = sorted_unique(&right);
        let expected: Vec<i16> = sorted_unique(&left)
            .into_iter()
            .filter(|item| right_items.binary_search(item).is_err())
            .collect();
        prop_assert_eq!(to_vec(&difference), expected.clone());
        prop_assert_eq!(difference.len(), expected.len());
        prop_assert!(difference.validate_invariants().is_ok());
    }

    /// Law: on equal keys, union keeps the items of the argument.
    #[test]
    fn prop_union_prefers_other(
        left in prop::collection::vec(any::<Entry>(), 0..60),
        right in prop::collection::vec(any::<Entry>(), 0..60)
    ) {
        let union = to_keyed_tree(&left).union(&to_keyed_tree(&right));

        let mut expected = keyed_model(&left);
        expected.extend(keyed_model(&right));
        let expected: Vec<Entry> = expected.into_iter().collect();

        prop_assert_eq!(union.iter().copied().collect::<Vec<_>>(), expected);
        prop_assert!(union.validate_invariants().is_ok());
    }

    /// Law: on equal keys, intersection keeps the items of the receiver.
    #[test]
    fn prop_intersection_prefers_receiver(
        left in prop::collection::vec(any::<Entry>(), 0..60),
        right in prop::collection::vec(any::<Entry>(), 0..60)
    ) {
        let intersection = to_keyed_tree(&left).intersection(&to_keyed_tree(&right));

        let right_keys = keyed_model(&right);
        let expected: Vec<Entry> = keyed_model(&left)
            .into_iter()
            .filter(|(key, _)| right_keys.contains_key(key))
            .collect();

        prop_assert_eq!(intersection.iter().copied().collect::<Vec<_>>(), expected);
        prop_assert!(intersection.validate_invariants().is_ok());
    }
}

// =============================================================================
// Update Laws
// =============================================================================

proptest! {
    /// Law: invariants hold after every single upsert and delete.
    #[test]
    fn prop_interleaved_updates_keep_invariants(
        operations in prop::collection::vec(operation(), 0..300)
    ) {
        let mut tree: RedBlackTree<i8> = RedBlackTree::new();
        let mut model: Vec<i8> = Vec::new();

        for operation in operations {
            match operation {
                Operation::Upsert(item) => {
                    tree = tree.upsert(item);
                    if let Err(position) = model.binary_search(&item) {
                        model.insert(position, item);
                    }
                }
                Operation::Delete(item) => {
                    tree = tree.delete(&item);
                    if let Ok(position) = model.binary_search(&item) {
                        model.remove(position);
                    }
                }
            }
            prop_assert!(tree.validate_invariants().is_ok());
            prop_assert_eq!(tree.len(), model.len());
        }

        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), model);
    }

    /// Law: deleting an absent item keeps the same items.
    #[test]
    fn prop_delete_absent_is_noop(
        items in prop::collection::vec(0_i16..1000, 0..100),
        absent in 1000_i16..2000
    ) {
        let tree = to_tree(&items);
        let deleted = tree.delete(&absent);
        prop_assert_eq!(&deleted, &tree);
        prop_assert_eq!(deleted.len(), tree.len());
    }

    /// Law: an update never changes the version it was derived from.
    #[test]
    fn prop_updates_preserve_previous_version(
        items in prop::collection::vec(any::<i16>(), 0..100),
        item: i16
    ) {
        let tree = to_tree(&items);
        let before = to_vec(&tree);

        let _inserted = tree.upsert(item);
        let _deleted = tree.delete(&item);

        prop_assert_eq!(to_vec(&tree), before);
    }

    /// Law: upsert then delete of a fresh item restores the items.
    #[test]
    fn prop_upsert_delete_roundtrip(
        items in prop::collection::vec(any::<i16>(), 0..100),
        item: i16
    ) {
        let tree = to_tree(&items);
        prop_assume!(!tree.contains(&item));
        let restored = tree.upsert(item).delete(&item);
        prop_assert_eq!(&restored, &tree);
        prop_assert!(restored.validate_invariants().is_ok());
    }

    /// Law: contains agrees with the model.
    #[test]
    fn prop_contains_matches_model(
        items in prop::collection::vec(-100_i16..100, 0..100),
        probe in -100_i16..100
    ) {
        let tree = to_tree(&items);
        prop_assert_eq!(tree.contains(&probe), items.contains(&probe));
    }
}
