//! Pluggable total orders for [`RedBlackTree`](super::RedBlackTree).
//!
//! A tree does not require its items to implement [`Ord`]. Instead it is
//! parameterized by a [`Comparator`] strategy that is consulted for every
//! ordering decision. Closures and function pointers are comparators, and
//! [`NaturalOrder`] delegates to [`Ord`].
//!
//! # Examples
//!
//! ```rust
//! use persistent_red_black::persistent::{Comparator, NaturalOrder, RedBlackTree};
//! use std::cmp::Ordering;
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//!
//! // Descending order through a closure
//! let tree = RedBlackTree::with_comparator(|left: &i32, right: &i32| right.cmp(left))
//!     .upsert(1)
//!     .upsert(3)
//!     .upsert(2);
//! let items: Vec<&i32> = tree.iter().collect();
//! assert_eq!(items, vec![&3, &2, &1]);
//! ```

use std::cmp::Ordering;

/// A total order over `T`.
///
/// Implementations must be deterministic, and every tree that takes part in
/// a union, intersection or subtraction must use a consistent order.
/// Mixing incompatible comparators is not detected and produces
/// unspecified (but memory-safe) results.
pub trait Comparator<T: ?Sized> {
    /// Compares two items.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}

/// The comparator that orders items by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn by_length(left: &String, right: &String) -> Ordering {
        left.len().cmp(&right.len())
    }

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Greater)]
    fn test_natural_order(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_closure_comparator() {
        let descending = |left: &i32, right: &i32| right.cmp(left);
        assert_eq!(descending.compare(&1, &2), Ordering::Greater);
    }

    #[rstest]
    fn test_function_pointer_comparator() {
        let comparator: fn(&String, &String) -> Ordering = by_length;
        assert_eq!(
            comparator.compare(&"ab".to_string(), &"cd".to_string()),
            Ordering::Equal
        );
    }

    #[rstest]
    fn test_natural_order_on_unsized() {
        assert_eq!(NaturalOrder.compare("a", "b"), Ordering::Less);
    }
}
