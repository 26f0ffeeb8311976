//! In-order traversal over a [`RedBlackTree`](super::RedBlackTree).
//!
//! All traversals keep an explicit stack of ancestors whose right subtrees
//! have not been visited yet. Nothing is collected up front and no
//! recursion is involved.
//!
//! - [`RedBlackTreeCursor`] owns its snapshot: it holds reference-counted
//!   handles on the nodes, so it stays valid after the tree it came from is
//!   dropped and keeps observing that version even when newer versions are
//!   derived.
//! - [`RedBlackTreeIterator`] borrows the tree and yields `&T`.
//! - [`RedBlackTreeIntoIterator`] is the owning [`Iterator`] built on the
//!   cursor.

use smallvec::SmallVec;
use std::iter::FusedIterator;

use super::ReferenceCounter;
use super::node::Node;

/// Ancestors kept inline before spilling to the heap.
///
/// A red-black tree of height 48 holds millions of items.
const INLINE_DEPTH: usize = 48;

// =============================================================================
// Cursor
// =============================================================================

/// A single-pass cursor over the items of a tree in ascending order.
///
/// The cursor is positioned on the first item when created. It is not
/// restartable: ask the tree for a new cursor to traverse again.
///
/// # Examples
///
/// ```rust
/// use persistent_red_black::persistent::RedBlackTree;
///
/// let tree = RedBlackTree::new().upsert(2).upsert(3).upsert(1);
///
/// let mut items = Vec::new();
/// let mut cursor = tree.cursor();
/// while cursor.has_element() {
///     items.push(*cursor.element().unwrap());
///     cursor.advance();
/// }
/// assert_eq!(items, vec![1, 2, 3]);
/// ```
pub struct RedBlackTreeCursor<T> {
    pending: SmallVec<[ReferenceCounter<Node<T>>; INLINE_DEPTH]>,
    current: Option<ReferenceCounter<Node<T>>>,
}

impl<T> RedBlackTreeCursor<T> {
    pub(crate) fn new(root: Option<&ReferenceCounter<Node<T>>>) -> Self {
        let mut cursor = Self {
            pending: SmallVec::new(),
            current: None,
        };
        cursor.descend_left(root.cloned());
        cursor.current = cursor.pending.pop();
        cursor
    }

    /// Pushes `node` and its chain of left descendants.
    fn descend_left(&mut self, mut node: Option<ReferenceCounter<Node<T>>>) {
        while let Some(node_ref) = node {
            node = node_ref.left.clone();
            self.pending.push(node_ref);
        }
    }

    /// Returns `true` while the cursor points at an item.
    #[must_use]
    pub const fn has_element(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the item under the cursor, or `None` once exhausted.
    #[must_use]
    pub fn element(&self) -> Option<&T> {
        self.current.as_ref().map(|node| &node.item)
    }

    /// Moves to the next item in ascending order.
    ///
    /// Does nothing once the cursor is exhausted.
    pub fn advance(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        self.descend_left(current.right.clone());
        self.current = self.pending.pop();
    }
}

impl<T> Clone for RedBlackTreeCursor<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            current: self.current.clone(),
        }
    }
}

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// An iterator over references to the items of a tree, in ascending order.
pub struct RedBlackTreeIterator<'a, T> {
    pending: SmallVec<[&'a Node<T>; INLINE_DEPTH]>,
    remaining: usize,
}

impl<'a, T> RedBlackTreeIterator<'a, T> {
    pub(crate) fn new(root: Option<&'a ReferenceCounter<Node<T>>>, length: usize) -> Self {
        let mut iterator = Self {
            pending: SmallVec::new(),
            remaining: length,
        };
        iterator.descend_left(root);
        iterator
    }

    fn descend_left(&mut self, mut node: Option<&'a ReferenceCounter<Node<T>>>) {
        while let Some(node_ref) = node {
            self.pending.push(node_ref);
            node = node_ref.left.as_ref();
        }
    }
}

impl<'a, T> Iterator for RedBlackTreeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.descend_left(node.right.as_ref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RedBlackTreeIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for RedBlackTreeIterator<'_, T> {}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over the items of a tree, in ascending order.
///
/// Items are cloned out of the shared nodes.
pub struct RedBlackTreeIntoIterator<T> {
    cursor: RedBlackTreeCursor<T>,
    remaining: usize,
}

impl<T> RedBlackTreeIntoIterator<T> {
    pub(crate) const fn new(cursor: RedBlackTreeCursor<T>, length: usize) -> Self {
        Self {
            cursor,
            remaining: length,
        }
    }
}

impl<T: Clone> Iterator for RedBlackTreeIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.cursor.element()?.clone();
        self.cursor.advance();
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Clone> ExactSizeIterator for RedBlackTreeIntoIterator<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T: Clone> FusedIterator for RedBlackTreeIntoIterator<T> {}

// =============================================================================
// Tests
// =============================================================================
