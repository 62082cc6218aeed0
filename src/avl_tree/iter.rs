use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawAvlTree};

/// An iterator over the keys of an [`AvlTree`](crate::AvlTree) in ascending order.
///
/// This `struct` is created by [`AvlTree::iter`](crate::AvlTree::iter),
/// [`AvlTree::range`](crate::AvlTree::range) and
/// [`Cursor::iter`](crate::Cursor::iter).
///
/// # Examples
///
/// ```
/// use range_avl::AvlTree;
///
/// let tree = AvlTree::from([3, 1, 2]);
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K> {
    tree: &'a RawAvlTree<K>,
    front: Option<Handle>,
    back: Option<Handle>,
    // Keys left between `front` and `back` inclusive; stops the two ends crossing.
    len: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(tree: &'a RawAvlTree<K>, front: Option<Handle>, back: Option<Handle>, len: usize) -> Self {
        Self { tree, front, back, len }
    }

    pub(crate) fn empty(tree: &'a RawAvlTree<K>) -> Self {
        Self::new(tree, None, None, 0)
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.len == 0 {
            return None;
        }
        let handle = self.front?;
        self.front = self.tree.successor(handle);
        self.len -= 1;
        Some(self.tree.key(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.len == 0 {
            return None;
        }
        let handle = self.back?;
        self.back = self.tree.predecessor(handle);
        self.len -= 1;
        Some(self.tree.key(handle))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
