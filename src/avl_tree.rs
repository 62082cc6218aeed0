use core::borrow::Borrow;
use core::fmt;

use crate::raw::RawAvlTree;

mod cursor;
mod iter;

pub use cursor::Cursor;
pub use iter::Iter;

/// An ordered set of unique keys that counts the keys in any inclusive range in
/// O(log n).
///
/// `AvlTree` is a height-balanced (AVL) binary search tree. Every node also
/// records how many nodes hang off each side, so the number of keys in
/// `[lo, hi]` comes from two root-to-node walks instead of a scan. Those counts
/// are kept exact through every rotation, in constant time per rotation.
///
/// Keys are never removed; a key stays in the tree until the tree is cleared or
/// dropped. Inserting a key that is already present leaves the tree unchanged.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key, as determined by the [`Ord`] trait, changes while
/// it is in the tree. The behavior resulting from such a logic error is not
/// specified, but will not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use range_avl::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for key in [4, 2, 3, 2, 6, 1, 5, 0, 8] {
///     tree.insert(key);
/// }
///
/// assert_eq!(tree.len(), 8);
/// assert_eq!(tree.count_in_range(&3, &5), 3);
/// assert_eq!(tree.count_in_range(&8, &5), 0);
/// assert_eq!(tree.count_in_range(&10, &12), 0);
///
/// assert_eq!(tree.front(), Some(&0));
/// assert_eq!(tree.back(), Some(&8));
/// assert!(tree.iter().copied().eq([0, 1, 2, 3, 4, 5, 6, 8]));
/// ```
pub struct AvlTree<K> {
    raw: RawAvlTree<K>,
}

impl<K> AvlTree<K> {
    /// Makes a new, empty `AvlTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let mut tree: AvlTree<i32> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        AvlTree { raw: RawAvlTree::new() }
    }

    /// Creates an empty tree with room for at least `capacity` keys before the
    /// node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree: AvlTree<u64> = AvlTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlTree {
            raw: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns how many keys the tree can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every key, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.front(), None);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest key, or `None` if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn front(&self) -> Option<&K> {
        self.raw.front().map(|handle| self.raw.key(handle))
    }

    /// Returns the largest key, or `None` if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn back(&self) -> Option<&K> {
        self.raw.back().map(|handle| self.raw.key(handle))
    }

    /// Returns a cursor at the smallest key.
    ///
    /// For an empty tree this is the same as [`end`](Self::end).
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([2, 1]);
    /// let mut cursor = tree.begin();
    /// let mut steps = 0;
    /// while cursor != tree.end() {
    ///     cursor.move_next();
    ///     steps += 1;
    /// }
    /// assert_eq!(steps, tree.len());
    ///
    /// let empty: AvlTree<i32> = AvlTree::new();
    /// assert_eq!(empty.begin(), empty.end());
    /// ```
    pub fn begin(&self) -> Cursor<'_, K> {
        Cursor::new(&self.raw, self.raw.front())
    }

    /// Returns a cursor at the past-the-end position.
    pub fn end(&self) -> Cursor<'_, K> {
        Cursor::new(&self.raw, None)
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// let keys: Vec<_> = tree.iter().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.raw, self.raw.front(), self.raw.back(), self.raw.len())
    }
}

impl<K: Ord> AvlTree<K> {
    /// Adds a key to the tree.
    ///
    /// Returns whether the key was newly inserted. If the tree already holds an
    /// equal key, nothing changes and `false` is returned.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds the maximum number of keys its node
    /// handles can address (`u32::MAX - 1`).
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> bool {
        self.raw.insert(key).1
    }

    /// Adds a key to the tree and returns a cursor at it.
    ///
    /// The `bool` reports whether the key was newly inserted; when it is
    /// `false`, the cursor points at the equal key that was already present.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`insert`](Self::insert).
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 5]);
    /// let (mut cursor, inserted) = tree.insert_full(3);
    /// assert!(inserted);
    /// cursor.move_next();
    /// assert_eq!(cursor.get(), Some(&5));
    /// ```
    pub fn insert_full(&mut self, key: K) -> (Cursor<'_, K>, bool) {
        let (handle, inserted) = self.raw.insert(key);
        (Cursor::new(&self.raw, Some(handle)), inserted)
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Returns the number of keys `k` with `lo <= k <= hi`.
    ///
    /// An inverted range (`lo > hi`) is empty and yields 0, as does any range
    /// on an empty tree.
    ///
    /// # Complexity
    ///
    /// O(log n), independent of how many keys fall in the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3, 5, 7, 9, 8]);
    /// assert_eq!(tree.count_in_range(&2, &3), 2);
    /// assert_eq!(tree.count_in_range(&-1, &9), 7);
    /// assert_eq!(tree.count_in_range(&15, &19), 0);
    /// assert_eq!(tree.count_in_range(&9, &1), 0);
    /// ```
    #[must_use]
    pub fn count_in_range<Q>(&self, lo: &Q, hi: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.count_in_range(lo, hi)
    }

    /// Returns a cursor at the smallest key greater than or equal to `key`.
    ///
    /// Returns the past-the-end cursor if every key is less than `key`.
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
    /// let tree = AvlTree::from([10, 20, 30]);
    /// assert_eq!(tree.lower_bound(&20).get(), Some(&20));
    /// assert_eq!(tree.lower_bound(&21).get(), Some(&30));
    /// assert!(tree.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(key))
    }

    /// Returns a cursor at the largest key less than or equal to `key`.
    ///
    /// Returns the past-the-end cursor if every key is greater than `key`.
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
    /// let tree = AvlTree::from([10, 20, 30]);
    /// assert_eq!(tree.upper_bound(&20).get(), Some(&20));
    /// assert_eq!(tree.upper_bound(&19).get(), Some(&10));
    /// assert!(tree.upper_bound(&9).is_end());
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(key))
    }

    /// Gets an iterator over the keys `k` with `lo <= k <= hi`, in ascending order.
    ///
    /// The iterator knows its exact length up front.
    ///
    /// # Complexity
    ///
    /// O(log n) to create, then amortized O(1) per key.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = (0..100).collect();
    /// let range = tree.range(&5, &48);
    /// assert_eq!(range.len(), 44);
    /// assert!(range.copied().eq(5..=48));
    /// ```
    pub fn range<Q>(&self, lo: &Q, hi: &Q) -> Iter<'_, K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let len = self.raw.count_in_range(lo, hi);
        if len == 0 {
            return Iter::empty(&self.raw);
        }
        Iter::new(&self.raw, self.raw.lower_bound(lo), self.raw.upper_bound(hi), len)
    }
}

impl<K: Clone> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        AvlTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Default for AvlTree<K> {
    /// Creates an empty `AvlTree`.
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K: PartialEq> PartialEq for AvlTree<K> {
    fn eq(&self, other: &AvlTree<K>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for AvlTree<K> {}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy> Extend<&'a K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for AvlTree<K> {
    /// Inserts the array's keys in order; later duplicates are ignored.
    ///
    /// ```
    /// use range_avl::AvlTree;
    ///
    /// let tree1 = AvlTree::from([1, 2, 3, 4]);
    /// let tree2: AvlTree<_> = [4, 3, 2, 1].into();
    /// assert_eq!(tree1, tree2);
    /// ```
    fn from(arr: [K; N]) -> Self {
        let mut tree = AvlTree::with_capacity(N);
        tree.extend(arr);
        tree
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}
