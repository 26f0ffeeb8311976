//! Persistent (immutable) ordered set.
//!
//! This module provides [`RedBlackTree`], an ordered set that never
//! mutates in place: upsert, delete, union, intersection and subtract all
//! return a new tree and leave their inputs untouched.
//!
//! # Structural Sharing
//!
//! Nodes are held behind a reference counter, so a new version only
//! allocates the nodes on the paths it rebuilt and shares everything else
//! with the version it was derived from. Old versions stay valid and
//! unchanged for as long as they are referenced.
//!
//! # Examples
//!
//! ```rust
//! use persistent_red_black::persistent::RedBlackTree;
//!
//! let tree: RedBlackTree<i32> = (1..=5).collect();
//!
//! // Structural sharing: the original tree is preserved
//! let updated = tree.upsert(6).delete(&1);
//! assert_eq!(tree.len(), 5);    // Original unchanged
//! assert_eq!(updated.len(), 5); // New version
//! assert!(updated.contains(&6));
//! assert!(!updated.contains(&1));
//!
//! assert!(updated.validate_invariants().is_ok());
//! ```
//!
//! # Thread Safety
//!
//! By default nodes are shared through [`std::rc::Rc`]. Enable the `arc`
//! feature to switch to [`std::sync::Arc`], which makes trees and cursors
//! `Send + Sync` when the items and comparator are.

/// Reference counter used for node sharing.
///
/// `Rc` by default, `Arc` with the `arc` feature.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod comparator;
mod iterator;
mod merge;
mod node;
mod red_black_tree;
mod validate;

pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use iterator::RedBlackTreeCursor;
pub use iterator::RedBlackTreeIntoIterator;
pub use iterator::RedBlackTreeIterator;
pub use red_black_tree::RedBlackTree;
pub use validate::Direction;
pub use validate::InvariantViolation;
pub use validate::InvariantViolations;
pub use validate::NodePath;
pub use validate::validate_invariants;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use super::RedBlackTree;
    use rstest::rstest;

    #[rstest]
    fn test_tree_clone_is_one_more_root_reference() {
        let tree: RedBlackTree<i32> = (0..8).collect();
        let Some(root) = tree.root().cloned() else {
            panic!("non-empty tree has a root");
        };
        let before = ReferenceCounter::strong_count(&root);
        let copy = tree.clone();
        assert_eq!(ReferenceCounter::strong_count(&root), before + 1);
        drop(copy);
        assert_eq!(ReferenceCounter::strong_count(&root), before);
    }

    #[rstest]
    fn test_dropping_newer_version_releases_shared_nodes() {
        let tree: RedBlackTree<i32> = (0..64).collect();
        let Some(root) = tree.root().cloned() else {
            panic!("non-empty tree has a root");
        };
        let Some(left) = root.left.clone() else {
            panic!("tree of 64 items has a left subtree");
        };
        let before = ReferenceCounter::strong_count(&left);

        // 64 lands on the right spine, so the left subtree is shared
        let newer = tree.upsert(64);
        assert!(ReferenceCounter::strong_count(&left) > before);
        drop(newer);
        assert_eq!(ReferenceCounter::strong_count(&left), before);
    }
}
