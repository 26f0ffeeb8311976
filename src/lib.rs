//! # persistent-red-black
//!
//! A persistent (immutable) ordered set for Rust, built on a red-black tree
//! with structural sharing.
//!
//! ## Overview
//!
//! - **Persistent updates**: `upsert` and `delete` return a new version in
//!   O(log N) and leave every older version intact
//! - **Set algebra**: `union`, `intersection` and `subtract` between trees
//! - **Pluggable ordering**: any [`Comparator`](persistent::Comparator),
//!   including closures, decides the order
//! - **Traversal**: an owning cursor and borrowing/owning iterators
//! - **Validation**: every red-black invariant can be checked on demand
//!
//! ## Feature Flags
//!
//! - `arc`: Share nodes through `Arc` instead of `Rc`, making trees
//!   `Send + Sync`
//!
//! ## Example
//!
//! ```rust
//! use persistent_red_black::prelude::*;
//!
//! let left: RedBlackTree<i32> = (1..=7).collect();
//! let right: RedBlackTree<i32> = [1, 6, 7, 8, 9, 10, 4].into_iter().collect();
//!
//! assert_eq!(format!("{}", left.subtract(&right)), "{2, 3, 5}");
//! assert_eq!(format!("{}", left.intersection(&right)), "{1, 4, 6, 7}");
//! assert_eq!(left.union(&right).len(), 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use persistent_red_black::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::{Comparator, NaturalOrder, RedBlackTree, validate_invariants};
}

pub mod persistent;
