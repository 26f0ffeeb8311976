//! Red-Black Tree invariant validation.
//!
//! [`validate_invariants`] certifies that a tree at rest satisfies:
//!
//! 1. The root is black
//! 2. In-order traversal is strictly increasing under the tree's comparator
//!    (no duplicates)
//! 3. Red nodes have only black children
//! 4. Every path from the root to an empty subtree has the same number of
//!    black nodes, the empty subtree itself counting as one
//!
//! Validation is a query: it never panics and never changes the tree. Every
//! violation found is reported, each with the items or paths involved.
//!
//! # Examples
//!
//! ```rust
//! use persistent_red_black::persistent::{RedBlackTree, validate_invariants};
//!
//! let tree: RedBlackTree<i32> = (0..100).collect();
//! assert!(validate_invariants(&tree).is_ok());
//! ```

use std::cmp::Ordering;
use std::fmt;

use super::ReferenceCounter;
use super::comparator::Comparator;
use super::node::{Color, Node};
use super::red_black_tree::RedBlackTree;

// =============================================================================
// Paths
// =============================================================================

/// One step from a node to one of its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

/// The position of a node (or empty subtree), as the steps taken from the
/// root to reach it.
///
/// Displayed as `root/L/R`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Direction>);

impl NodePath {
    /// Returns the steps from the root.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.0
    }

    /// Returns the number of steps from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Direction>> for NodePath {
    fn from(directions: Vec<Direction>) -> Self {
        Self(directions)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "root")?;
        for direction in &self.0 {
            match direction {
                Direction::Left => write!(formatter, "/L")?,
                Direction::Right => write!(formatter, "/R")?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// Violations
// =============================================================================

/// A single broken invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation<T> {
    /// The root node is red.
    RedRoot {
        /// The item held by the root.
        root: T,
    },
    /// Two items adjacent in traversal order are equal or descending.
    OutOfOrder {
        /// The item visited first.
        previous: T,
        /// The item visited next.
        next: T,
    },
    /// A red node has a red child.
    RedRedViolation {
        /// The item of the red parent.
        parent: T,
        /// The item of the red child.
        child: T,
        /// The position of the child.
        path: NodePath,
    },
    /// Two root-to-empty paths pass through different numbers of black nodes.
    BlackHeightMismatch {
        /// The black-height of the first path that was measured.
        expected: usize,
        /// The first path that was measured.
        expected_path: NodePath,
        /// The black-height of the offending path.
        found: usize,
        /// The offending path.
        found_path: NodePath,
    },
}

impl<T: fmt::Debug> fmt::Display for InvariantViolation<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot { root } => write!(formatter, "root {root:?} is red"),
            Self::OutOfOrder { previous, next } => write!(
                formatter,
                "items out of order: {previous:?} is not less than {next:?}"
            ),
            Self::RedRedViolation {
                parent,
                child,
                path,
            } => write!(
                formatter,
                "red node {parent:?} has red child {child:?} at {path}"
            ),
            Self::BlackHeightMismatch {
                expected,
                expected_path,
                found,
                found_path,
            } => write!(
                formatter,
                "black-height mismatch: {expected_path} has {expected}, {found_path} has {found}"
            ),
        }
    }
}

/// Every violation found by one validation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantViolations<T>(Vec<InvariantViolation<T>>);

impl<T> InvariantViolations<T> {
    /// Returns the violations in the order they were found.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation<T>] {
        &self.0
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no violation is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the report, returning the violations.
    #[must_use]
    pub fn into_inner(self) -> Vec<InvariantViolation<T>> {
        self.0
    }
}

impl<T: fmt::Debug> fmt::Display for InvariantViolations<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} invariant violation(s)", self.0.len())?;
        for violation in &self.0 {
            write!(formatter, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> std::error::Error for InvariantViolations<T> {}

// =============================================================================
// Validation
// =============================================================================

/// Checks every Red-Black Tree invariant of `tree`.
///
/// # Errors
///
/// Returns every violation found, each identifying the items or paths
/// involved.
///
/// # Examples
///
/// ```rust
/// use persistent_red_black::persistent::{RedBlackTree, validate_invariants};
///
/// let tree = RedBlackTree::new().upsert(2).upsert(1).upsert(3).delete(&1);
/// assert_eq!(validate_invariants(&tree), Ok(()));
/// ```
pub fn validate_invariants<T, C>(tree: &RedBlackTree<T, C>) -> Result<(), InvariantViolations<T>>
where
    T: Clone,
    C: Comparator<T>,
{
    let violations = collect_violations(tree.root(), tree.comparator());
    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            violations = violations.len(),
            "red-black tree failed invariant validation"
        );
        Err(InvariantViolations(violations))
    }
}

/// Collects every violation below `root`.
pub(crate) fn collect_violations<T, C>(
    root: Option<&ReferenceCounter<Node<T>>>,
    comparator: &C,
) -> Vec<InvariantViolation<T>>
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let mut validator = Validator {
        comparator,
        violations: Vec::new(),
        previous: None,
        expected_black_height: None,
        path: Vec::new(),
    };

    if let Some(root) = root
        && root.color == Color::Red
    {
        validator.violations.push(InvariantViolation::RedRoot {
            root: root.item.clone(),
        });
    }
    validator.visit(root, 0);
    validator.violations
}

struct Validator<'a, T, C: ?Sized> {
    comparator: &'a C,
    violations: Vec<InvariantViolation<T>>,
    previous: Option<&'a T>,
    expected_black_height: Option<(usize, NodePath)>,
    path: Vec<Direction>,
}

impl<'a, T, C> Validator<'a, T, C>
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    /// In-order walk; `black_above` counts the black nodes strictly above
    /// `node` on the current path.
    fn visit(&mut self, node: Option<&'a ReferenceCounter<Node<T>>>, black_above: usize) {
        let Some(node) = node else {
            self.check_black_height(black_above + 1);
            return;
        };

        let black_height = black_above + usize::from(node.color == Color::Black);

        self.path.push(Direction::Left);
        self.check_red_child(node, node.left.as_ref());
        self.visit(node.left.as_ref(), black_height);
        self.path.pop();

        self.check_order(&node.item);

        self.path.push(Direction::Right);
        self.check_red_child(node, node.right.as_ref());
        self.visit(node.right.as_ref(), black_height);
        self.path.pop();
    }

    fn check_red_child(&mut self, parent: &Node<T>, child: Option<&ReferenceCounter<Node<T>>>) {
        if parent.color == Color::Red
            && let Some(child) = child
            && child.color == Color::Red
        {
            self.violations.push(InvariantViolation::RedRedViolation {
                parent: parent.item.clone(),
                child: child.item.clone(),
                path: NodePath(self.path.clone()),
            });
        }
    }

    fn check_order(&mut self, item: &'a T) {
        if let Some(previous) = self.previous
            && self.comparator.compare(previous, item) != Ordering::Less
        {
            self.violations.push(InvariantViolation::OutOfOrder {
                previous: previous.clone(),
                next: item.clone(),
            });
        }
        self.previous = Some(item);
    }

    fn check_black_height(&mut self, found: usize) {
        let Some((expected, expected_path)) = self.expected_black_height.clone() else {
            self.expected_black_height = Some((found, NodePath(self.path.clone())));
            return;
        };
        if expected != found {
            self.violations
                .push(InvariantViolation::BlackHeightMismatch {
                    expected,
                    expected_path,
                    found,
                    found_path: NodePath(self.path.clone()),
                });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
