//! Recursive engines behind every tree-producing operation.
//!
//! - Upsert, and the upsert-merge that drives union
//! - Delete, and the subtract-merge that drives subtraction
//! - Intersect-merge
//!
//! Upsert, delete and the merges built on them read their inputs and
//! allocate new nodes only along the paths they change. Untouched subtrees
//! are shared with the input being updated. Intersect-merge instead builds
//! its result from scratch and shares no nodes with either input.
//!
//! Union and subtraction each come in two directions so that the caller
//! can walk whichever input is smaller: [`upsert_merge`] and
//! [`insert_absent_merge`] for union, [`subtract_merge`] and
//! [`retain_absent_merge`] for subtraction.
//!
//! # Deletion
//!
//! Removing a node replaces it with the join of its two children. A black
//! node removed from a subtree leaves that subtree one black unit short, so
//! the way back up goes through [`balance_left`] / [`balance_right`], which
//! either absorb the deficit into a red node or push it further up while
//! the four-case [`balance`](super::node::balance) repairs any red-red
//! chain they create. The root is recolored black at the end.

use std::cmp::Ordering;

use super::ReferenceCounter;
use super::comparator::Comparator;
use super::node::{
    Color, Link, Node, balance, balanced_black, blacken, is_black_node, redden, with_color,
};

// =============================================================================
// Lookup
// =============================================================================

/// Finds the stored item equal to `item` under `comparator`.
pub(crate) fn find<'a, T, C>(
    mut node: Option<&'a ReferenceCounter<Node<T>>>,
    item: &T,
    comparator: &C,
) -> Option<&'a T>
where
    C: Comparator<T> + ?Sized,
{
    while let Some(node_ref) = node {
        match comparator.compare(item, &node_ref.item) {
            Ordering::Less => node = node_ref.left.as_ref(),
            Ordering::Greater => node = node_ref.right.as_ref(),
            Ordering::Equal => return Some(&node_ref.item),
        }
    }
    None
}

// =============================================================================
// Upsert / Union
// =============================================================================

/// Inserts or overwrites `item` and recolors the new root black.
///
/// Returns (`new_root`, `was_added`) where `was_added` is false when an
/// equal item was overwritten.
pub(crate) fn upsert<T, C>(
    root: Option<&ReferenceCounter<Node<T>>>,
    item: T,
    comparator: &C,
) -> (ReferenceCounter<Node<T>>, bool)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let (new_root, added) = insert_into_node(root, item, comparator);
    (with_color(&new_root, Color::Black), added)
}

/// Recursive helper for upsert.
fn insert_into_node<T, C>(
    node: Option<&ReferenceCounter<Node<T>>>,
    item: T,
    comparator: &C,
) -> (ReferenceCounter<Node<T>>, bool)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(node_ref) = node else {
        return (ReferenceCounter::new(Node::new_red(item)), true);
    };

    match comparator.compare(&item, &node_ref.item) {
        Ordering::Less => {
            let (new_left, added) = insert_into_node(node_ref.left.as_ref(), item, comparator);
            let new_node = node_ref.with_children(Some(new_left), node_ref.right.clone());
            (ReferenceCounter::new(balance(new_node)), added)
        }
        Ordering::Greater => {
            let (new_right, added) = insert_into_node(node_ref.right.as_ref(), item, comparator);
            let new_node = node_ref.with_children(node_ref.left.clone(), Some(new_right));
            (ReferenceCounter::new(balance(new_node)), added)
        }
        Ordering::Equal => (ReferenceCounter::new(node_ref.with_item(item)), false),
    }
}

/// Merges every item of `incoming` into `target`.
///
/// The incoming root goes in first, then its right subtree, then its left
/// subtree. Each item passes through [`upsert`], so the tree is a valid
/// red-black tree after every step and incoming items overwrite equal ones.
///
/// Returns the merged root and the number of items that were new.
pub(crate) fn upsert_merge<T, C>(
    target: Link<T>,
    incoming: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(incoming) = incoming else {
        return (target, 0);
    };

    let (root, added) = upsert(target.as_ref(), incoming.item.clone(), comparator);
    let (root, added_right) = upsert_merge(Some(root), incoming.right.as_ref(), comparator);
    let (root, added_left) = upsert_merge(root, incoming.left.as_ref(), comparator);
    (root, usize::from(added) + added_right + added_left)
}

/// Merges the items of `incoming` that have no equal item in `target`.
///
/// The mirror of [`upsert_merge`]: on equal items the one already in
/// `target` is kept, and `target` is returned untouched when it already
/// holds everything.
///
/// Returns the merged root and the number of items that were new.
pub(crate) fn insert_absent_merge<T, C>(
    target: Link<T>,
    incoming: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(incoming) = incoming else {
        return (target, 0);
    };

    let (root, added) = if find(target.as_ref(), &incoming.item, comparator).is_some() {
        (target, false)
    } else {
        let (root, added) = upsert(target.as_ref(), incoming.item.clone(), comparator);
        (Some(root), added)
    };
    let (root, added_right) = insert_absent_merge(root, incoming.right.as_ref(), comparator);
    let (root, added_left) = insert_absent_merge(root, incoming.left.as_ref(), comparator);
    (root, usize::from(added) + added_right + added_left)
}

// =============================================================================
// Delete / Subtract
// =============================================================================

/// Removes the item equal to `item`, recoloring the new root black.
///
/// Returns (`new_root`, `was_removed`). When nothing matches, the original
/// root is handed back untouched.
pub(crate) fn delete<T, C>(
    root: Option<&ReferenceCounter<Node<T>>>,
    item: &T,
    comparator: &C,
) -> (Link<T>, bool)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    if find(root, item, comparator).is_none() {
        return (root.cloned(), false);
    }
    (blacken(remove_from_node(root, item, comparator)), true)
}

/// Recursive helper for delete.
///
/// Removing from a black child shortens that side by one black unit, which
/// the matching `balance_*` call repairs.
fn remove_from_node<T, C>(
    node: Option<&ReferenceCounter<Node<T>>>,
    item: &T,
    comparator: &C,
) -> Link<T>
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let node_ref = node?;

    match comparator.compare(item, &node_ref.item) {
        Ordering::Equal => join(node_ref.left.clone(), node_ref.right.clone()),
        Ordering::Less => {
            let new_left = remove_from_node(node_ref.left.as_ref(), item, comparator);
            if is_black_node(node_ref.left.as_ref()) {
                Some(balance_left(
                    new_left,
                    node_ref.item.clone(),
                    node_ref.right.clone(),
                ))
            } else {
                Some(Node::red(
                    new_left,
                    node_ref.item.clone(),
                    node_ref.right.clone(),
                ))
            }
        }
        Ordering::Greater => {
            let new_right = remove_from_node(node_ref.right.as_ref(), item, comparator);
            if is_black_node(node_ref.right.as_ref()) {
                Some(balance_right(
                    node_ref.left.clone(),
                    node_ref.item.clone(),
                    new_right,
                ))
            } else {
                Some(Node::red(
                    node_ref.left.clone(),
                    node_ref.item.clone(),
                    new_right,
                ))
            }
        }
    }
}

/// Rebuilds a node whose left side is one black unit short.
fn balance_left<T: Clone>(left: Link<T>, item: T, right: Link<T>) -> ReferenceCounter<Node<T>> {
    if let Some(left_ref) = left.as_ref()
        && left_ref.is_red()
    {
        return Node::red(Some(with_color(left_ref, Color::Black)), item, right);
    }

    if let Some(right_ref) = right.as_ref()
        && right_ref.is_black()
    {
        return balanced_black(left, item, Some(with_color(right_ref, Color::Red)));
    }

    if let Some(right_ref) = right.as_ref()
        && let Some(right_left) = right_ref.left.as_ref().filter(|node| node.is_black())
    {
        return Node::red(
            Some(Node::black(left, item, right_left.left.clone())),
            right_left.item.clone(),
            Some(balanced_black(
                right_left.right.clone(),
                right_ref.item.clone(),
                redden(right_ref.right.clone()),
            )),
        );
    }

    // Unreachable for well-formed inputs
    Node::red(left, item, right)
}

/// Rebuilds a node whose right side is one black unit short.
fn balance_right<T: Clone>(left: Link<T>, item: T, right: Link<T>) -> ReferenceCounter<Node<T>> {
    if let Some(right_ref) = right.as_ref()
        && right_ref.is_red()
    {
        return Node::red(left, item, Some(with_color(right_ref, Color::Black)));
    }

    if let Some(left_ref) = left.as_ref()
        && left_ref.is_black()
    {
        return balanced_black(Some(with_color(left_ref, Color::Red)), item, right);
    }

    if let Some(left_ref) = left.as_ref()
        && let Some(left_right) = left_ref.right.as_ref().filter(|node| node.is_black())
    {
        return Node::red(
            Some(balanced_black(
                redden(left_ref.left.clone()),
                left_ref.item.clone(),
                left_right.left.clone(),
            )),
            left_right.item.clone(),
            Some(Node::black(left_right.right.clone(), item, right)),
        );
    }

    // Unreachable for well-formed inputs
    Node::red(left, item, right)
}

/// Joins two sibling subtrees of equal black-height, every item of `left`
/// ordering before every item of `right`.
fn join<T: Clone>(left: Link<T>, right: Link<T>) -> Link<T> {
    let (left, right) = match (left, right) {
        (None, right) => return right,
        (left, None) => return left,
        (Some(left), Some(right)) => (left, right),
    };

    match (left.color, right.color) {
        (Color::Red, Color::Red) => {
            let middle = join(left.right.clone(), right.left.clone());
            if let Some(middle_ref) = middle.as_ref()
                && middle_ref.is_red()
            {
                Some(Node::red(
                    Some(Node::red(
                        left.left.clone(),
                        left.item.clone(),
                        middle_ref.left.clone(),
                    )),
                    middle_ref.item.clone(),
                    Some(Node::red(
                        middle_ref.right.clone(),
                        right.item.clone(),
                        right.right.clone(),
                    )),
                ))
            } else {
                Some(Node::red(
                    left.left.clone(),
                    left.item.clone(),
                    Some(Node::red(middle, right.item.clone(), right.right.clone())),
                ))
            }
        }
        (Color::Black, Color::Black) => {
            let middle = join(left.right.clone(), right.left.clone());
            if let Some(middle_ref) = middle.as_ref()
                && middle_ref.is_red()
            {
                Some(Node::red(
                    Some(Node::black(
                        left.left.clone(),
                        left.item.clone(),
                        middle_ref.left.clone(),
                    )),
                    middle_ref.item.clone(),
                    Some(Node::black(
                        middle_ref.right.clone(),
                        right.item.clone(),
                        right.right.clone(),
                    )),
                ))
            } else {
                Some(balance_left(
                    left.left.clone(),
                    left.item.clone(),
                    Some(Node::black(middle, right.item.clone(), right.right.clone())),
                ))
            }
        }
        (Color::Black, Color::Red) => Some(Node::red(
            join(Some(left), right.left.clone()),
            right.item.clone(),
            right.right.clone(),
        )),
        (Color::Red, Color::Black) => Some(Node::red(
            left.left.clone(),
            left.item.clone(),
            join(left.right.clone(), Some(right)),
        )),
    }
}

/// Removes every item of `subtracting` from `target`.
///
/// The subtracting root is removed first, then its right subtree, then its
/// left subtree, stopping early once `target` is empty.
///
/// Returns the remaining root and the number of items removed.
pub(crate) fn subtract_merge<T, C>(
    target: Link<T>,
    subtracting: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(subtracting) = subtracting else {
        return (target, 0);
    };
    if target.is_none() {
        return (target, 0);
    }

    let (root, removed) = delete(target.as_ref(), &subtracting.item, comparator);
    let (root, removed_right) = subtract_merge(root, subtracting.right.as_ref(), comparator);
    let (root, removed_left) = subtract_merge(root, subtracting.left.as_ref(), comparator);
    (root, usize::from(removed) + removed_right + removed_left)
}

/// Removes from `target` every item of `candidates` that has an equal item
/// in `other`.
///
/// Subtraction driven by the left-hand side: `candidates` is walked and
/// `other` is only probed, so the cost follows the size of `candidates`.
/// `candidates` is normally the original root of `target`.
///
/// Returns the remaining root and the number of items removed.
pub(crate) fn retain_absent_merge<T, C>(
    target: Link<T>,
    candidates: Option<&ReferenceCounter<Node<T>>>,
    other: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(candidate) = candidates else {
        return (target, 0);
    };

    let (root, removed) = if find(other, &candidate.item, comparator).is_some() {
        delete(target.as_ref(), &candidate.item, comparator)
    } else {
        (target, false)
    };
    let (root, removed_right) =
        retain_absent_merge(root, candidate.right.as_ref(), other, comparator);
    let (root, removed_left) = retain_absent_merge(root, candidate.left.as_ref(), other, comparator);
    (root, usize::from(removed) + removed_right + removed_left)
}

// =============================================================================
// Intersection
// =============================================================================

/// Collects the items of `receiver` that also occur in `other` into
/// `accumulated`.
///
/// Both trees are descended together. When the roots differ, the side of
/// `other` that lies entirely before (or after) the receiver's root is only
/// probed against the matching child of the receiver, and the remaining
/// side of `other` is intersected with the whole receiver.
///
/// `accumulated` is a (root, length) pair; the updated pair is returned.
pub(crate) fn intersect_merge<T, C>(
    accumulated: (Link<T>, usize),
    receiver: Option<&ReferenceCounter<Node<T>>>,
    other: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let (Some(receiver), Some(other)) = (receiver, other) else {
        return accumulated;
    };

    match comparator.compare(&other.item, &receiver.item) {
        Ordering::Equal => {
            let accumulated = keep(accumulated, &receiver.item, comparator);
            let accumulated = intersect_merge(
                accumulated,
                receiver.left.as_ref(),
                other.left.as_ref(),
                comparator,
            );
            intersect_merge(
                accumulated,
                receiver.right.as_ref(),
                other.right.as_ref(),
                comparator,
            )
        }
        Ordering::Less => {
            let accumulated = intersect_merge(
                accumulated,
                receiver.left.as_ref(),
                other.left.as_ref(),
                comparator,
            );
            let accumulated = match find(receiver.left.as_ref(), &other.item, comparator) {
                Some(found) => keep(accumulated, found, comparator),
                None => accumulated,
            };
            intersect_merge(
                accumulated,
                Some(receiver),
                other.right.as_ref(),
                comparator,
            )
        }
        Ordering::Greater => {
            let accumulated = intersect_merge(
                accumulated,
                receiver.right.as_ref(),
                other.right.as_ref(),
                comparator,
            );
            let accumulated = match find(receiver.right.as_ref(), &other.item, comparator) {
                Some(found) => keep(accumulated, found, comparator),
                None => accumulated,
            };
            intersect_merge(
                accumulated,
                Some(receiver),
                other.left.as_ref(),
                comparator,
            )
        }
    }
}

fn keep<T, C>(accumulated: (Link<T>, usize), item: &T, comparator: &C) -> (Link<T>, usize)
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let (root, length) = accumulated;
    let (root, added) = upsert(root.as_ref(), item.clone(), comparator);
    (Some(root), length + usize::from(added))
}

// =============================================================================
// Tests
// =============================================================================
