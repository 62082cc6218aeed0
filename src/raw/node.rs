use super::handle::Handle;
use super::size::Size;

/// Which child link of a node a descent followed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A single AVL node.
///
/// `left` and `right` own their subtrees; `parent` is a back-reference used only
/// for walking the tree in order.
#[derive(Clone, Debug)]
pub(crate) struct AvlNode<K> {
    key: K,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    // A leaf has height 1; bounded by `Handle::MAX_HEIGHT`.
    height: u8,
    // Number of nodes in the left subtree.
    left_count: Size,
    // Number of nodes in the right subtree.
    right_count: Size,
}

impl<K> AvlNode<K> {
    /// Creates a new leaf hanging off `parent`.
    pub(crate) fn new_leaf(key: K, parent: Option<Handle>) -> Self {
        Self {
            key,
            left: None,
            right: None,
            parent,
            height: 1,
            left_count: Size::ZERO,
            right_count: Size::ZERO,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    /// Returns the child on `side`.
    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }

    /// Returns the count of the subtree on `side`.
    #[inline]
    pub(crate) fn count(&self, side: Side) -> Size {
        match side {
            Side::Left => self.left_count,
            Side::Right => self.right_count,
        }
    }

    pub(crate) fn set_count(&mut self, side: Side, count: Size) {
        match side {
            Side::Left => self.left_count = count,
            Side::Right => self.right_count = count,
        }
    }

    /// Records one more node on `side`.
    pub(crate) fn increment_count(&mut self, side: Side) {
        match side {
            Side::Left => self.left_count.increment(),
            Side::Right => self.right_count.increment(),
        }
    }

    /// Number of nodes in the subtree rooted here.
    #[inline]
    pub(crate) fn subtree_size(&self) -> Size {
        Size::of_subtree(self.left_count, self.right_count)
    }
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
