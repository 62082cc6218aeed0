use core::fmt;

use super::Iter;
use crate::OutOfRange;
use crate::raw::{Handle, RawAvlTree};

/// A bidirectional position in an [`AvlTree`](crate::AvlTree).
///
/// A cursor either points at a key or sits at the past-the-end position, which
/// behaves like a "ghost" element between the back and the front of the tree:
/// moving forward from the back, or backward from the front, lands on it, and
/// moving off it wraps around to the other end.
///
/// Cursors only borrow the tree, so the borrow checker rules out an insertion
/// while one is alive.
///
/// # Examples
///
/// ```
/// use range_avl::AvlTree;
///
/// let tree = AvlTree::from([10, 20, 30]);
/// let mut cursor = tree.lower_bound(&15);
/// assert_eq!(cursor.get(), Some(&20));
///
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&30));
///
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert!(cursor.key().is_err());
/// ```
pub struct Cursor<'a, K> {
    tree: &'a RawAvlTree<K>,
    node: Option<Handle>,
}

impl<'a, K> Cursor<'a, K> {
    pub(crate) fn new(tree: &'a RawAvlTree<K>, node: Option<Handle>) -> Self {
        Self { tree, node }
    }

    /// Returns the key under the cursor, or `None` at the past-the-end position.
    #[must_use]
    pub fn get(&self) -> Option<&'a K> {
        let tree = self.tree;
        self.node.map(|handle| tree.key(handle))
    }

    /// Returns the key under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if the cursor is at the past-the-end position.
    pub fn key(&self) -> Result<&'a K, OutOfRange> {
        self.get().ok_or(OutOfRange)
    }

    /// Returns `true` if the cursor is at the past-the-end position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Moves to the next key in ascending order.
    ///
    /// From the last key this moves to the past-the-end position; from there it
    /// moves to the first key.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn move_next(&mut self) {
        self.node = match self.node {
            Some(handle) => self.tree.successor(handle),
            None => self.tree.front(),
        };
    }

    /// Moves to the previous key in ascending order.
    ///
    /// From the first key this moves to the past-the-end position; from there it
    /// moves to the last key.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(handle) => self.tree.predecessor(handle),
            None => self.tree.back(),
        };
    }
}

impl<'a, K: Ord> Cursor<'a, K> {
    /// Returns how many keys lie from the cursor (inclusive) to the end of the tree.
    ///
    /// This is the number of [`move_next`](Self::move_next) calls needed to
    /// reach the past-the-end position, computed without walking.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = (0..1000).collect();
    /// let mut cursor = tree.begin();
    /// for _ in 0..5 {
    ///     cursor.move_next();
    /// }
    /// assert_eq!(cursor.remaining(), 995);
    /// assert_eq!(tree.end().remaining(), 0);
    /// ```
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.node.map_or(0, |handle| self.tree.count_greater(handle) + 1)
    }

    /// Returns an iterator over the keys from the cursor to the end of the tree.
    #[must_use]
    pub fn iter(&self) -> Iter<'a, K> {
        Iter::new(self.tree, self.node, self.tree.back(), self.remaining())
    }
}

impl<K> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Cursor<'_, K> {}

/// Two cursors are equal when they sit at the same position of the same tree.
impl<K> PartialEq for Cursor<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<K> Eq for Cursor<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for Cursor<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}
