//! Immutable tree nodes and the local rebalancing rule.
//!
//! Nodes are never modified after construction. Every "change" builds a new
//! node that shares the untouched children of the old one, so any node that
//! is reachable from a published tree stays valid for as long as that tree
//! lives.

use super::ReferenceCounter;

// =============================================================================
// Color Definition
// =============================================================================

/// The color of a Red-Black Tree node.
///
/// An empty subtree has no node and counts as black.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

// =============================================================================
// Node Definition
// =============================================================================

/// A shared, possibly empty subtree.
pub(crate) type Link<T> = Option<ReferenceCounter<Node<T>>>;

/// Internal node structure for the Red-Black Tree.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) color: Color,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Creates a node from its parts.
    pub(crate) const fn new(color: Color, left: Link<T>, item: T, right: Link<T>) -> Self {
        Self {
            item,
            color,
            left,
            right,
        }
    }

    /// Creates a new red node with no children.
    pub(crate) const fn new_red(item: T) -> Self {
        Self::new(Color::Red, None, item, None)
    }

    /// Builds a red node around `item`.
    pub(crate) fn red(left: Link<T>, item: T, right: Link<T>) -> ReferenceCounter<Self> {
        ReferenceCounter::new(Self::new(Color::Red, left, item, right))
    }

    /// Builds a black node around `item`.
    pub(crate) fn black(left: Link<T>, item: T, right: Link<T>) -> ReferenceCounter<Self> {
        ReferenceCounter::new(Self::new(Color::Black, left, item, right))
    }

    /// Checks if this node is red.
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    /// Checks if this node is black.
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

impl<T: Clone> Node<T> {
    /// Creates a copy of this node holding a different item.
    pub(crate) fn with_item(&self, item: T) -> Self {
        Self::new(self.color, self.left.clone(), item, self.right.clone())
    }

    /// Creates a copy of this node with new children.
    pub(crate) fn with_children(&self, left: Link<T>, right: Link<T>) -> Self {
        Self::new(self.color, left, self.item.clone(), right)
    }
}

/// Helper function to check if an optional node is a black node.
///
/// Unlike the black-height rule, an empty subtree does not count here.
pub(crate) fn is_black_node<T>(node: Option<&ReferenceCounter<Node<T>>>) -> bool {
    node.is_some_and(|node| node.is_black())
}

/// Returns `node` recolored to `color`.
///
/// The same node is handed back when it already has that color, so the
/// common path allocates nothing.
pub(crate) fn with_color<T: Clone>(
    node: &ReferenceCounter<Node<T>>,
    color: Color,
) -> ReferenceCounter<Node<T>> {
    if node.color == color {
        ReferenceCounter::clone(node)
    } else {
        ReferenceCounter::new(Node::new(
            color,
            node.left.clone(),
            node.item.clone(),
            node.right.clone(),
        ))
    }
}

/// Recolors the root of a possibly empty subtree black.
pub(crate) fn blacken<T: Clone>(link: Link<T>) -> Link<T> {
    link.map(|node| with_color(&node, Color::Black))
}

/// Recolors the root of a possibly empty subtree red.
pub(crate) fn redden<T: Clone>(link: Link<T>) -> Link<T> {
    link.map(|node| with_color(&node, Color::Red))
}

// =============================================================================
// Balancing
// =============================================================================

/// Restores "no red node has a red child" one level below `node`.
///
/// Red nodes are returned untouched: their parent is black and will be
/// balanced on the way up. A black node whose child and grandchild form a
/// red-red chain (left-right, left-left, right-right or right-left) is
/// rebuilt so that the middle of the three items becomes a red root with
/// two black children. The four outer subtrees are reused as they are.
pub(crate) fn balance<T: Clone>(node: Node<T>) -> Node<T> {
    if node.is_red() {
        return node;
    }

    // Left-Right
    if let Some(left) = node.left.as_ref().filter(|left| left.is_red())
        && let Some(left_right) = left.right.as_ref().filter(|child| child.is_red())
    {
        return Node::new(
            Color::Red,
            Some(Node::black(
                left.left.clone(),
                left.item.clone(),
                left_right.left.clone(),
            )),
            left_right.item.clone(),
            Some(Node::black(
                left_right.right.clone(),
                node.item,
                node.right,
            )),
        );
    }

    // Left-Left
    if let Some(left) = node.left.as_ref().filter(|left| left.is_red())
        && let Some(left_left) = left.left.as_ref().filter(|child| child.is_red())
    {
        return Node::new(
            Color::Red,
            Some(with_color(left_left, Color::Black)),
            left.item.clone(),
            Some(Node::black(left.right.clone(), node.item, node.right)),
        );
    }

    // Right-Right
    if let Some(right) = node.right.as_ref().filter(|right| right.is_red())
        && let Some(right_right) = right.right.as_ref().filter(|child| child.is_red())
    {
        return Node::new(
            Color::Red,
            Some(Node::black(node.left, node.item, right.left.clone())),
            right.item.clone(),
            Some(with_color(right_right, Color::Black)),
        );
    }

    // Right-Left
    if let Some(right) = node.right.as_ref().filter(|right| right.is_red())
        && let Some(right_left) = right.left.as_ref().filter(|child| child.is_red())
    {
        return Node::new(
            Color::Red,
            Some(Node::black(
                node.left,
                node.item,
                right_left.left.clone(),
            )),
            right_left.item.clone(),
            Some(Node::black(
                right_left.right.clone(),
                right.item.clone(),
                right.right.clone(),
            )),
        );
    }

    node
}

/// Balances a black node built from parts and wraps it.
pub(crate) fn balanced_black<T: Clone>(
    left: Link<T>,
    item: T,
    right: Link<T>,
) -> ReferenceCounter<Node<T>> {
    ReferenceCounter::new(balance(Node::new(Color::Black, left, item, right)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf(color: Color, item: i32) -> Link<i32> {
        Some(ReferenceCounter::new(Node::new(color, None, item, None)))
    }

    fn items_in_order(link: Option<&ReferenceCounter<Node<i32>>>, output: &mut Vec<i32>) {
        if let Some(node) = link {
            items_in_order(node.left.as_ref(), output);
            output.push(node.item);
            items_in_order(node.right.as_ref(), output);
        }
    }

    fn shape(node: &Node<i32>) -> (i32, Color, Option<(i32, Color)>, Option<(i32, Color)>) {
        (
            node.item,
            node.color,
            node.left.as_ref().map(|left| (left.item, left.color)),
            node.right.as_ref().map(|right| (right.item, right.color)),
        )
    }

    #[rstest]
    fn test_with_color_same_color_returns_same_node() {
        let node = ReferenceCounter::new(Node::new_red(1));
        let recolored = with_color(&node, Color::Red);
        assert!(ReferenceCounter::ptr_eq(&node, &recolored));
    }

    #[rstest]
    fn test_with_color_different_color_allocates_and_keeps_children() {
        let node = Node::red(leaf(Color::Black, 1), 2, leaf(Color::Black, 3));
        let recolored = with_color(&node, Color::Black);
        assert!(!ReferenceCounter::ptr_eq(&node, &recolored));
        assert_eq!(recolored.color, Color::Black);
        assert!(ReferenceCounter::ptr_eq(
            node.left.as_ref().unwrap(),
            recolored.left.as_ref().unwrap()
        ));
        assert!(ReferenceCounter::ptr_eq(
            node.right.as_ref().unwrap(),
            recolored.right.as_ref().unwrap()
        ));
        // The original node is untouched
        assert_eq!(node.color, Color::Red);
    }

    #[rstest]
    fn test_balance_red_node_is_noop() {
        let node = Node::new(
            Color::Red,
            Some(Node::red(leaf(Color::Red, 1), 2, None)),
            3,
            None,
        );
        let balanced = balance(node);
        assert_eq!(balanced.color, Color::Red);
        assert_eq!(balanced.item, 3);
    }

    #[rstest]
    fn test_balance_without_violation_is_noop() {
        let node = Node::new(Color::Black, leaf(Color::Red, 1), 2, leaf(Color::Red, 3));
        let balanced = balance(node);
        assert_eq!(
            shape(&balanced),
            (2, Color::Black, Some((1, Color::Red)), Some((3, Color::Red)))
        );
    }

    #[rstest]
    #[case::left_left(Node::new(Color::Black, Some(Node::red(leaf(Color::Red, 1), 2, None)), 3, None))]
    #[case::left_right(Node::new(Color::Black, Some(Node::red(None, 1, leaf(Color::Red, 2))), 3, None))]
    #[case::right_right(Node::new(Color::Black, None, 1, Some(Node::red(None, 2, leaf(Color::Red, 3)))))]
    #[case::right_left(Node::new(Color::Black, None, 1, Some(Node::red(leaf(Color::Red, 2), 3, None))))]
    fn test_balance_four_cases_produce_red_middle(#[case] node: Node<i32>) {
        let balanced = balance(node);
        assert_eq!(
            shape(&balanced),
            (2, Color::Red, Some((1, Color::Black)), Some((3, Color::Black)))
        );
    }

    #[rstest]
    fn test_balance_reuses_outer_subtrees() {
        let a = leaf(Color::Black, 1);
        let b = leaf(Color::Black, 3);
        let c = leaf(Color::Black, 5);
        let d = leaf(Color::Black, 7);
        let node = Node::new(
            Color::Black,
            Some(Node::red(a.clone(), 2, Some(Node::red(b.clone(), 4, c.clone())))),
            6,
            d.clone(),
        );
        let balanced = balance(node);

        let mut items = Vec::new();
        items_in_order(Some(&ReferenceCounter::new(balanced.clone())), &mut items);
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7]);

        let left = balanced.left.as_ref().unwrap();
        let right = balanced.right.as_ref().unwrap();
        assert_eq!(balanced.item, 4);
        assert!(ReferenceCounter::ptr_eq(left.left.as_ref().unwrap(), a.as_ref().unwrap()));
        assert!(ReferenceCounter::ptr_eq(left.right.as_ref().unwrap(), b.as_ref().unwrap()));
        assert!(ReferenceCounter::ptr_eq(right.left.as_ref().unwrap(), c.as_ref().unwrap()));
        assert!(ReferenceCounter::ptr_eq(right.right.as_ref().unwrap(), d.as_ref().unwrap()));
    }

    #[rstest]
    fn test_blacken_and_redden_on_empty() {
        assert!(blacken::<i32>(None).is_none());
        assert!(redden::<i32>(None).is_none());
    }

    #[rstest]
    fn test_is_black_node_ignores_empty() {
        assert!(!is_black_node::<i32>(None));
        assert!(is_black_node(leaf(Color::Black, 1).as_ref()));
        assert!(!is_black_node(leaf(Color::Red, 1).as_ref()));
    }
}
