//! Persistent (immutable) ordered set based on a Red-Black Tree.
//!
//! This module provides [`RedBlackTree`], an immutable ordered collection
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! Every operation returns a new tree and leaves the receiver untouched.
//! Old and new versions share every subtree the operation did not change,
//! so keeping old versions around costs nothing beyond the nodes that were
//! actually rebuilt.
//!
//! - O(log N) upsert, delete, contains, get
//! - O(log N) min/max
//! - O(min(N, M) log(N + M)) union and subtract with a tree of size M
//! - O(M log N) intersection with a tree of size M
//! - O(1) len, `is_empty` and clone
//!
//! Ordering is decided by a [`Comparator`] strategy, so items do not need
//! to implement [`Ord`].
//!
//! # Examples
//!
//! ```rust
//! use persistent_red_black::persistent::RedBlackTree;
//!
//! let tree = RedBlackTree::new().upsert(3).upsert(1).upsert(2);
//! let items: Vec<&i32> = tree.iter().collect();
//! assert_eq!(items, vec![&1, &2, &3]);
//!
//! // The original tree is preserved
//! let smaller = tree.delete(&2);
//! assert_eq!(tree.len(), 3);
//! assert_eq!(smaller.len(), 2);
//!
//! // Set algebra
//! let other: RedBlackTree<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(tree.union(&other).len(), 4);
//! assert_eq!(tree.intersection(&other).len(), 2);
//! assert_eq!(tree.subtract(&other).len(), 1);
//! ```
//!
//! # Internal Structure
//!
//! The Red-Black Tree maintains the following invariants:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. All leaves (NIL) are black
//! 4. Red nodes have only black children
//! 5. Every path from root to leaf has the same number of black nodes
//!
//! These invariants ensure the tree height is O(log N). They can be checked
//! at any time with [`RedBlackTree::validate_invariants`].

use std::fmt;
use std::iter::FromIterator;

use super::ReferenceCounter;
use super::comparator::{Comparator, NaturalOrder};
use super::iterator::{RedBlackTreeCursor, RedBlackTreeIntoIterator, RedBlackTreeIterator};
use super::merge;
use super::node::{Link, Node};
use super::validate::{self, InvariantViolations};

// =============================================================================
// RedBlackTree Definition
// =============================================================================

/// A persistent (immutable) ordered set based on a Red-Black Tree.
///
/// Items equal under the comparator are stored once; inserting an equal
/// item overwrites the stored one. This makes the tree usable as a map by
/// storing key-value pairs under a comparator that only looks at the key.
///
/// # Time Complexity
///
/// | Operation      | Complexity              |
/// |----------------|-------------------------|
/// | `new`          | O(1)                    |
/// | `upsert`       | O(log N)                |
/// | `delete`       | O(log N)                |
/// | `contains`     | O(log N)                |
/// | `get`          | O(log N)                |
/// | `min`/`max`    | O(log N)                |
/// | `union`        | O(min(N, M) log(N + M)) |
/// | `intersection` | O(M log N)              |
/// | `subtract`     | O(min(N, M) log(N + M)) |
/// | `len`          | O(1)                    |
/// | `is_empty`     | O(1)                    |
///
/// # Examples
///
/// ```rust
/// use persistent_red_black::persistent::RedBlackTree;
///
/// // Key-value pairs ordered by key only
/// let by_key = |left: &(i32, &str), right: &(i32, &str)| left.0.cmp(&right.0);
/// let tree = RedBlackTree::with_comparator(by_key)
///     .upsert((2, "two"))
///     .upsert((1, "one"))
///     .upsert((2, "TWO"));
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.get(&(2, "")), Some(&(2, "TWO")));
/// ```
pub struct RedBlackTree<T, C = NaturalOrder> {
    /// Root node of the tree
    root: Link<T>,
    /// Number of items
    length: usize,
    /// Ordering strategy, shared by every version derived from this tree
    comparator: ReferenceCounter<C>,
}

impl<T> RedBlackTree<T, NaturalOrder> {
    /// Creates a new empty tree ordered by [`Ord`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree: RedBlackTree<i32> = RedBlackTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Clone + Ord> RedBlackTree<T, NaturalOrder> {
    /// Creates a tree containing a single item.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree = RedBlackTree::singleton(42);
    /// assert_eq!(tree.len(), 1);
    /// assert!(tree.contains(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(item: T) -> Self {
        Self::new().upsert(item)
    }
}

impl<T, C> RedBlackTree<T, C> {
    /// Creates a new empty tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let descending = RedBlackTree::with_comparator(|left: &i32, right: &i32| right.cmp(left))
    ///     .upsert(1)
    ///     .upsert(2);
    /// assert_eq!(descending.min(), Some(&2));
    /// ```
    #[inline]
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            length: 0,
            comparator: ReferenceCounter::new(comparator),
        }
    }

    /// Returns the number of items in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree contains no items.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the comparator that orders this tree.
    #[inline]
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns a cursor positioned on the smallest item.
    ///
    /// The cursor owns a snapshot of this version: it is unaffected by
    /// later operations and may outlive `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree = RedBlackTree::new().upsert(1).upsert(2);
    /// let mut cursor = tree.cursor();
    /// assert_eq!(cursor.element(), Some(&1));
    /// cursor.advance();
    /// assert_eq!(cursor.element(), Some(&2));
    /// cursor.advance();
    /// assert!(!cursor.has_element());
    /// ```
    #[must_use]
    pub fn cursor(&self) -> RedBlackTreeCursor<T> {
        RedBlackTreeCursor::new(self.root.as_ref())
    }

    /// Returns an iterator over the items in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree = RedBlackTree::new().upsert(3).upsert(1).upsert(2);
    /// let sum: i32 = tree.iter().sum();
    /// assert_eq!(sum, 6);
    /// ```
    #[must_use]
    pub fn iter(&self) -> RedBlackTreeIterator<'_, T> {
        RedBlackTreeIterator::new(self.root.as_ref(), self.length)
    }

    /// Returns the smallest item.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(left) = node.left.as_ref() {
            node = left;
        }
        Some(&node.item)
    }

    /// Returns the largest item.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(right) = node.right.as_ref() {
            node = right;
        }
        Some(&node.item)
    }

    pub(crate) fn root(&self) -> Option<&ReferenceCounter<Node<T>>> {
        self.root.as_ref()
    }

    /// Returns `true` if both trees are the same non-empty version.
    fn shares_root_with(&self, other: &Self) -> bool {
        match (self.root.as_ref(), other.root.as_ref()) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Builds a tree that shares this tree's comparator.
    fn derive(&self, root: Link<T>, length: usize) -> Self {
        Self {
            root,
            length,
            comparator: ReferenceCounter::clone(&self.comparator),
        }
    }
}

impl<T: Clone, C: Comparator<T>> RedBlackTree<T, C> {
    /// Returns the stored item equal to `item` under the comparator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree = RedBlackTree::new().upsert(1);
    /// assert_eq!(tree.get(&1), Some(&1));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, item: &T) -> Option<&T> {
        merge::find(self.root.as_ref(), item, &*self.comparator)
    }

    /// Returns `true` if the tree holds an item equal to `item`.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.get(item).is_some()
    }

    /// Inserts `item`, overwriting an equal item if one is present.
    ///
    /// Only the nodes on the path to `item` are rebuilt; every other
    /// subtree is shared with `self`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree1 = RedBlackTree::new().upsert(1);
    /// let tree2 = tree1.upsert(2);
    ///
    /// assert_eq!(tree1.len(), 1); // Original unchanged
    /// assert_eq!(tree2.len(), 2); // New version
    /// ```
    #[must_use]
    pub fn upsert(&self, item: T) -> Self {
        let (root, added) = merge::upsert(self.root.as_ref(), item, &*self.comparator);
        self.derive(Some(root), self.length + usize::from(added))
    }

    /// Removes the item equal to `item`.
    ///
    /// If no such item exists (including when the tree is empty) the
    /// result shares its root with `self`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let tree: RedBlackTree<i32> = (1..=3).collect();
    /// let removed = tree.delete(&2);
    ///
    /// assert!(tree.contains(&2));    // Original unchanged
    /// assert!(!removed.contains(&2));
    /// assert_eq!(tree.delete(&10), tree);
    /// ```
    #[must_use]
    pub fn delete(&self, item: &T) -> Self {
        let (root, removed) = merge::delete(self.root.as_ref(), item, &*self.comparator);
        self.derive(root, self.length - usize::from(removed))
    }

    /// Returns every item of `self` and `other`.
    ///
    /// When both trees hold equal items, the one from `other` is kept.
    /// The smaller of the two trees is walked and merged into the larger,
    /// whose untouched subtrees are shared with the result.
    /// Both trees must be ordered consistently; the result uses the
    /// comparator of `self`.
    ///
    /// # Complexity
    ///
    /// O(min(N, M) log(N + M)) where M is the size of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let by_key = |left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0);
    /// let left = RedBlackTree::with_comparator(by_key).upsert((1, 'a')).upsert((2, 'a'));
    /// let right = RedBlackTree::with_comparator(by_key).upsert((2, 'b')).upsert((3, 'b'));
    ///
    /// let merged = left.union(&right);
    /// let union: Vec<&(i32, char)> = merged.iter().collect();
    /// assert_eq!(union, vec![&(1, 'a'), &(2, 'b'), &(3, 'b')]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.shares_root_with(other) {
            return self.derive(other.root.clone(), other.length);
        }

        // Walk the smaller side; equal items of `other` win either way
        let (root, length) = if self.length < other.length {
            let (root, added) = merge::insert_absent_merge(
                other.root.clone(),
                self.root.as_ref(),
                &*self.comparator,
            );
            (root, other.length + added)
        } else {
            let (root, added) =
                merge::upsert_merge(self.root.clone(), other.root.as_ref(), &*self.comparator);
            (root, self.length + added)
        };
        tracing::trace!(
            left = self.length,
            right = other.length,
            length,
            "red-black tree union"
        );
        self.derive(root, length)
    }

    /// Returns the items of `self` that have an equal item in `other`.
    ///
    /// The items of `self` are the ones kept. The result is built from new
    /// nodes and shares none with either input, unless both are the same
    /// version, in which case `self` is returned as is.
    ///
    /// # Complexity
    ///
    /// O(M log N) where M is the size of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let left: RedBlackTree<i32> = [0, 1, 2, 3, 10].into_iter().collect();
    /// let right: RedBlackTree<i32> = [-1, 2, 3, 10, 11].into_iter().collect();
    ///
    /// let both = left.intersection(&right);
    /// let common: Vec<&i32> = both.iter().collect();
    /// assert_eq!(common, vec![&2, &3, &10]);
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        if self.shares_root_with(other) {
            return self.clone();
        }

        let (root, length) = merge::intersect_merge(
            (None, 0),
            self.root.as_ref(),
            other.root.as_ref(),
            &*self.comparator,
        );
        tracing::trace!(
            left = self.length,
            right = other.length,
            kept = length,
            "red-black tree intersection"
        );
        self.derive(root, length)
    }

    /// Returns the items of `self` that have no equal item in `other`.
    ///
    /// Only the paths to removed items are rebuilt; the rest of `self` is
    /// shared with the result.
    ///
    /// # Complexity
    ///
    /// O(min(N, M) log(N + M)) where M is the size of `other`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_red_black::persistent::RedBlackTree;
    ///
    /// let left: RedBlackTree<i32> = (1..=7).collect();
    /// let right: RedBlackTree<i32> = [1, 6, 7, 8, 9, 10, 4].into_iter().collect();
    ///
    /// let rest = left.subtract(&right);
    /// let difference: Vec<&i32> = rest.iter().collect();
    /// assert_eq!(difference, vec![&2, &3, &5]);
    /// ```
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        if self.root.is_none() {
            return self.clone();
        }
        if self.shares_root_with(other) {
            return self.derive(None, 0);
        }

        let (root, removed) = if self.length < other.length {
            merge::retain_absent_merge(
                self.root.clone(),
                self.root.as_ref(),
                other.root.as_ref(),
                &*self.comparator,
            )
        } else {
            merge::subtract_merge(self.root.clone(), other.root.as_ref(), &*self.comparator)
        };
        tracing::trace!(
            left = self.length,
            right = other.length,
            removed,
            "red-black tree subtract"
        );
        self.derive(root, self.length - removed)
    }

    /// Checks the Red-Black Tree invariants of this tree.
    ///
    /// See [`validate_invariants`](super::validate_invariants).
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate_invariants(&self) -> Result<(), InvariantViolations<T>> {
        validate::validate_invariants(self)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C> Clone for RedBlackTree<T, C> {
    fn clone(&self) -> Self {
        self.derive(self.root.clone(), self.length)
    }
}

impl<T, C: Default> Default for RedBlackTree<T, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for RedBlackTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Clone, C: Comparator<T>> Extend<T> for RedBlackTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            *self = self.upsert(item);
        }
    }
}

impl<T: Clone, C> IntoIterator for RedBlackTree<T, C> {
    type Item = T;
    type IntoIter = RedBlackTreeIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        RedBlackTreeIntoIterator::new(self.cursor(), self.length)
    }
}

impl<'a, T, C> IntoIterator for &'a RedBlackTree<T, C> {
    type Item = &'a T;
    type IntoIter = RedBlackTreeIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C> PartialEq for RedBlackTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for RedBlackTree<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for RedBlackTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for RedBlackTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for item in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{item}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Send + Sync Tests (arc feature only)
// =============================================================================

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(RedBlackTree<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(RedBlackTreeCursor<String>: Send, Sync);
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(RedBlackTree<i32>: Send, Sync);

#[cfg(all(test, feature = "arc"))]
mod multithread_tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    fn test_tree_shared_across_threads() {
        let tree: Arc<RedBlackTree<i32>> = Arc::new((0..100).collect());

        let handles: Vec<_> = (0..4)
            .map(|index| {
                let tree_clone = Arc::clone(&tree);
                thread::spawn(move || {
                    let updated = tree_clone.upsert(1000 + index).delete(&index);
                    assert_eq!(tree_clone.len(), 100);
                    assert!(tree_clone.contains(&index));
                    assert!(!updated.contains(&index));
                    assert!(updated.validate_invariants().is_ok());
                    updated
                })
            })
            .map(|handle| handle.join().expect("Thread panicked"))
            .collect();

        for (index, updated) in (0..).zip(&handles) {
            assert!(updated.contains(&(1000 + index)));
        }
        assert_eq!(tree.len(), 100);
    }
}
