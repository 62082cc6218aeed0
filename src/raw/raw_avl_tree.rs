use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, Side};

/// The core AVL tree backing `AvlTree`.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K> {
    /// Arena storing all tree nodes; it is the sole owner of every node.
    nodes: Arena<AvlNode<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Handle to the minimum node, for O(1) `front` and iteration start.
    front: Option<Handle>,
    /// Handle to the maximum node, for O(1) `back` and iteration end.
    back: Option<Handle>,
}

/// Path element recorded while descending for an insertion.
struct PathElement {
    /// Handle to the ancestor at this level.
    node: Handle,
    /// Side of the ancestor the descent continued into.
    side: Side,
}

/// Inline capacity of `Path`; one of the array sizes `smallvec` implements.
const PATH_INLINE: usize = 64;

// An insertion path never outgrows the tallest addressable tree.
const _: () = assert!(Handle::MAX_HEIGHT <= PATH_INLINE);

/// Ancestor stack for the bottom-up rebalance pass.
type Path = SmallVec<[PathElement; PATH_INLINE]>;

impl<K> RawAvlTree<K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            front: None,
            back: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            front: None,
            back: None,
        }
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        // Nodes are never freed, so every allocated slot holds a live key.
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.front = None;
        self.back = None;
    }

    pub(crate) fn front(&self) -> Option<Handle> {
        self.front
    }

    pub(crate) fn back(&self) -> Option<Handle> {
        self.back
    }

    /// Returns the key stored at `handle`.
    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    /// Returns the in-order successor of `handle`, or `None` past the maximum.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if self.back == Some(handle) {
            return None;
        }

        let node = self.nodes.get(handle);
        if let Some(right) = node.right() {
            return Some(self.leftmost(right));
        }

        // Climb until we arrive from a left child.
        let mut child = handle;
        let mut parent = node.parent();
        while let Some(p) = parent {
            let parent_node = self.nodes.get(p);
            if parent_node.left() == Some(child) {
                return Some(p);
            }
            child = p;
            parent = parent_node.parent();
        }
        None
    }

    /// Returns the in-order predecessor of `handle`, or `None` before the minimum.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if self.front == Some(handle) {
            return None;
        }

        let node = self.nodes.get(handle);
        if let Some(left) = node.left() {
            return Some(self.rightmost(left));
        }

        let mut child = handle;
        let mut parent = node.parent();
        while let Some(p) = parent {
            let parent_node = self.nodes.get(p);
            if parent_node.right() == Some(child) {
                return Some(p);
            }
            child = p;
            parent = parent_node.parent();
        }
        None
    }

    fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right() {
            handle = right;
        }
        handle
    }

    fn refresh_front_back(&mut self) {
        self.front = self.root.map(|root| self.leftmost(root));
        self.back = self.root.map(|root| self.rightmost(root));
    }

    #[inline]
    fn height(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height(node.left()).max(self.height(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// Returns `height(left) - height(right)` for `handle`.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height(node.left())) - i16::from(self.height(node.right()))
    }

    /// Points whatever owned `old` (a parent's child link, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            None => self.root = Some(new),
            Some(parent) => {
                let parent_node = self.nodes.get_mut(parent);
                let side = if parent_node.left() == Some(old) {
                    Side::Left
                } else {
                    debug_assert_eq!(parent_node.right(), Some(old), "`old` is not a child of `parent`");
                    Side::Right
                };
                parent_node.set_child(side, Some(new));
            }
        }
    }

    /// Lifts the `heavy` child of `x` above it and returns the new subtree root.
    ///
    /// The pivot's inner subtree moves to `x`'s `heavy` side. Both counts are
    /// taken from the moved links, so the rotation is O(1).
    fn rotate(&mut self, x: Handle, heavy: Side) -> Handle {
        let light = heavy.opposite();

        let x_node = self.nodes.get(x);
        let grandparent = x_node.parent();
        let y = x_node.child(heavy).expect("`RawAvlTree::rotate()` - pivot is missing!");
        let y_node = self.nodes.get(y);
        let inner = y_node.child(light);
        let inner_count = y_node.count(light);

        let x_node = self.nodes.get_mut(x);
        x_node.set_child(heavy, inner);
        x_node.set_count(heavy, inner_count);
        x_node.set_parent(Some(y));
        let x_size = x_node.subtree_size();

        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(x));
        }

        let y_node = self.nodes.get_mut(y);
        y_node.set_child(light, Some(x));
        y_node.set_count(light, x_size);
        y_node.set_parent(grandparent);

        self.replace_child(grandparent, x, y);
        self.update_height(x);
        self.update_height(y);

        trace!(pivot = ?y, demoted = ?x, toward = ?light, "rotated");
        y
    }

    /// Rotates the left child of `handle` up into its place.
    pub(crate) fn rotate_right(&mut self, handle: Handle) -> Handle {
        self.rotate(handle, Side::Left)
    }

    /// Rotates the right child of `handle` up into its place.
    pub(crate) fn rotate_left(&mut self, handle: Handle) -> Handle {
        self.rotate(handle, Side::Right)
    }
}

impl<K: Ord> RawAvlTree<K> {
    /// Searches for a key and returns its node.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match node.key().borrow().cmp(key) {
                Greater => node.left(),
                Less => node.right(),
                Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts `key`, returning its node and whether it was newly added.
    ///
    /// A duplicate key leaves the tree untouched.
    pub(crate) fn insert(&mut self, key: K) -> (Handle, bool) {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match key.cmp(node.key()) {
                Less => Side::Left,
                Greater => Side::Right,
                Equal => {
                    trace!(node = ?handle, "insert found existing key");
                    return (handle, false);
                }
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }

        let parent = path.last().map(|element| element.node);
        let leaf = self.nodes.alloc(AvlNode::new_leaf(key, parent));
        match path.last() {
            Some(element) => self.nodes.get_mut(element.node).set_child(element.side, Some(leaf)),
            None => self.root = Some(leaf),
        }

        // Bottom-up: a rotation below changes the height the next ancestor sees.
        for element in path.iter().rev() {
            self.nodes.get_mut(element.node).increment_count(element.side);
            self.update_height(element.node);
            self.balance(element.node, leaf);
        }

        self.refresh_front_back();
        trace!(node = ?leaf, depth = path.len(), len = self.len(), "inserted");
        (leaf, true)
    }

    /// Restores the AVL invariant at `handle` after `inserted` was added below it.
    ///
    /// Returns the root of the subtree that now sits where `handle` was.
    pub(crate) fn balance(&mut self, handle: Handle, inserted: Handle) -> Handle {
        let factor = self.balance_factor(handle);
        let heavy = match factor {
            2.. => Side::Left,
            ..=-2 => Side::Right,
            _ => return handle,
        };

        let child = self.nodes.get(handle).child(heavy).expect("`RawAvlTree::balance()` - heavy side is empty!");
        // The new key lies under `child`; which of its sides decides single vs double rotation.
        let inserted_side = match self.key(inserted).cmp(self.key(child)) {
            Less => Side::Left,
            Greater => Side::Right,
            Equal => heavy,
        };

        match (heavy, inserted_side) {
            (Side::Left, Side::Left) => self.rotate_right(handle),
            (Side::Right, Side::Right) => self.rotate_left(handle),
            (Side::Left, Side::Right) => {
                self.rotate_left(child);
                self.rotate_right(handle)
            }
            (Side::Right, Side::Left) => {
                self.rotate_right(child);
                self.rotate_left(handle)
            }
        }
    }

    /// Returns how many keys in the tree are strictly greater than the key at `target`.
    pub(crate) fn count_greater(&self, target: Handle) -> usize {
        let key = self.key(target);
        let mut count = 0;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match node.key().cmp(key) {
                Greater => {
                    // This node and its right subtree all exceed `key`.
                    count += node.count(Side::Right).to_usize() + 1;
                    current = node.left();
                }
                Less => current = node.right(),
                Equal => return count + node.count(Side::Right).to_usize(),
            }
        }
        count
    }

    /// Returns the node with the smallest key `>= key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let back = self.back?;
        if self.key(back).borrow().cmp(key).is_lt() {
            return None;
        }

        let mut candidate = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match node.key().borrow().cmp(key) {
                Less => current = node.right(),
                Equal => return Some(handle),
                Greater => {
                    candidate = Some(handle);
                    current = node.left();
                }
            }
        }

        candidate.filter(|&handle| self.key(handle).borrow().cmp(key).is_ge())
    }

    /// Returns the node with the largest key `<= key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let front = self.front?;
        if self.key(front).borrow().cmp(key).is_gt() {
            return None;
        }

        let mut candidate = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match node.key().borrow().cmp(key) {
                Greater => current = node.left(),
                Equal => return Some(handle),
                Less => {
                    candidate = Some(handle);
                    current = node.right();
                }
            }
        }

        candidate.filter(|&handle| self.key(handle).borrow().cmp(key).is_le())
    }

    /// Counts keys `k` with `lo <= k <= hi` in O(log n).
    pub(crate) fn count_in_range<Q>(&self, lo: &Q, hi: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if lo > hi || self.is_empty() {
            return 0;
        }

        let (Some(first), Some(last)) = (self.lower_bound(lo), self.upper_bound(hi)) else {
            trace!("range lies outside the stored keys");
            return 0;
        };

        // When no key falls in [lo, hi], `last` is the predecessor of `first`
        // and the difference below is exactly zero.
        let above_first = self.count_greater(first);
        let above_last = self.count_greater(last);
        debug_assert!(above_first + 1 >= above_last, "range endpoints out of order");
        above_first + 1 - above_last
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone + core::fmt::Debug> RawAvlTree<K> {
        /// Recomputes every cached quantity from scratch and panics on any mismatch.
        fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            let Some(root) = self.root else {
                if self.front.is_some() || self.back.is_some() || self.len() != 0 {
                    errors.push("empty tree has front/back or nonzero len".into());
                }
                assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
                return;
            };

            if self.nodes.get(root).parent().is_some() {
                errors.push("root has a parent".into());
            }

            let mut keys: Vec<K> = Vec::new();
            let (_, size) = self.validate_node(root, &mut keys, &mut errors);

            if size != self.len() {
                errors.push(alloc::format!("len mismatch: len={}, reachable={}", self.len(), size));
            }
            for pair in keys.windows(2) {
                if pair[0] >= pair[1] {
                    errors.push(alloc::format!("keys not strictly increasing: {:?} >= {:?}", pair[0], pair[1]));
                }
            }
            if self.front.map(|h| self.key(h)) != keys.first() {
                errors.push(alloc::format!("front mismatch: expected {:?}", keys.first()));
            }
            if self.back.map(|h| self.key(h)) != keys.last() {
                errors.push(alloc::format!("back mismatch: expected {:?}", keys.last()));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns (height, subtree_size).
        fn validate_node(&self, handle: Handle, keys: &mut Vec<K>, errors: &mut Vec<String>) -> (u8, usize) {
            let node = self.nodes.get(handle);

            let side = |child: Option<Handle>, keys: &mut Vec<K>, errors: &mut Vec<String>| match child {
                None => (0, 0),
                Some(child) => {
                    if self.nodes.get(child).parent() != Some(handle) {
                        errors.push(alloc::format!("parent link broken at {child:?}"));
                    }
                    self.validate_node(child, keys, errors)
                }
            };

            let (left_height, left_size) = side(node.left(), keys, errors);
            keys.push(node.key().clone());
            let (right_height, right_size) = side(node.right(), keys, errors);

            if node.count(Side::Left).to_usize() != left_size {
                errors.push(alloc::format!(
                    "left_count mismatch at {:?}: stored={}, actual={}",
                    handle,
                    node.count(Side::Left).to_usize(),
                    left_size
                ));
            }
            if node.count(Side::Right).to_usize() != right_size {
                errors.push(alloc::format!(
                    "right_count mismatch at {:?}: stored={}, actual={}",
                    handle,
                    node.count(Side::Right).to_usize(),
                    right_size
                ));
            }

            let height = 1 + left_height.max(right_height);
            if node.height() != height {
                errors.push(alloc::format!("height mismatch at {:?}: stored={}, actual={}", handle, node.height(), height));
            }
            if left_height.abs_diff(right_height) > 1 {
                errors.push(alloc::format!("unbalanced at {handle:?}: left={left_height}, right={right_height}"));
            }

            (height, left_size + right_size + 1)
        }

        fn root_key(&self) -> Option<&K> {
            self.root.map(|root| self.key(root))
        }
    }

    fn build(keys: &[i32]) -> RawAvlTree<i32> {
        let mut tree = RawAvlTree::new();
        for &key in keys {
            tree.insert(key);
        }
        tree
    }

    fn in_order(tree: &RawAvlTree<i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = tree.front();
        while let Some(handle) = current {
            keys.push(*tree.key(handle));
            current = tree.successor(handle);
        }
        keys
    }

    #[test]
    fn empty_tree() {
        let tree: RawAvlTree<i32> = RawAvlTree::new();
        tree.validate_invariants();

        assert!(tree.is_empty());
        assert!(tree.lower_bound(&0).is_none());
        assert!(tree.upper_bound(&0).is_none());
        assert_eq!(tree.count_in_range(&i32::MIN, &i32::MAX), 0);
    }

    // Each of the four imbalance shapes must end with `2` at the root.
    #[test]
    fn single_and_double_rotations() {
        for keys in [[3, 2, 1], [1, 2, 3], [3, 1, 2], [1, 3, 2]] {
            let tree = build(&keys);
            tree.validate_invariants();
            assert_eq!(tree.root_key(), Some(&2), "inserting {keys:?}");
            assert_eq!(in_order(&tree), [1, 2, 3]);
        }
    }

    #[test]
    fn rotation_moves_inner_subtree_counts() {
        // 4 and 6 each sit under 5; 1, 3 under 2.
        let mut tree = build(&[2, 1, 5, 3, 6]);
        tree.validate_invariants();
        let root = tree.root.unwrap();

        let new_root = tree.rotate_left(root);
        assert_eq!(*tree.key(new_root), 5);
        assert_eq!(tree.nodes.get(new_root).count(Side::Left).to_usize(), 3);
        assert_eq!(tree.nodes.get(new_root).count(Side::Right).to_usize(), 1);
        let demoted = tree.search(&2).unwrap();
        assert_eq!(tree.nodes.get(demoted).count(Side::Right).to_usize(), 1);
        assert_eq!(tree.nodes.get(tree.search(&3).unwrap()).parent(), Some(demoted));

        let back = tree.rotate_right(new_root);
        assert_eq!(*tree.key(back), 2);
        tree.validate_invariants();
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut tree = build(&[4, 2, 6]);
        let existing = tree.search(&2).unwrap();

        let (handle, inserted) = tree.insert(2);
        assert!(!inserted);
        assert_eq!(handle, existing);
        assert_eq!(tree.len(), 3);
        tree.validate_invariants();
    }

    #[test]
    fn count_greater_walks_from_root() {
        let tree = build(&(0..20).collect::<Vec<_>>());
        for key in 0..20 {
            let handle = tree.search(&key).unwrap();
            assert_eq!(tree.count_greater(handle), (19 - key) as usize);
        }
    }

    #[test]
    fn bounds_on_gaps() {
        let tree = build(&[10, 20, 30, 40]);

        assert_eq!(tree.lower_bound(&5).map(|h| *tree.key(h)), Some(10));
        assert_eq!(tree.lower_bound(&20).map(|h| *tree.key(h)), Some(20));
        assert_eq!(tree.lower_bound(&21).map(|h| *tree.key(h)), Some(30));
        assert!(tree.lower_bound(&41).is_none());

        assert_eq!(tree.upper_bound(&45).map(|h| *tree.key(h)), Some(40));
        assert_eq!(tree.upper_bound(&29).map(|h| *tree.key(h)), Some(20));
        assert_eq!(tree.upper_bound(&10).map(|h| *tree.key(h)), Some(10));
        assert!(tree.upper_bound(&9).is_none());
    }

    #[test]
    fn range_between_adjacent_keys_is_empty() {
        let tree = build(&[10, 20, 30]);
        assert_eq!(tree.count_in_range(&11, &19), 0);
        assert_eq!(tree.count_in_range(&20, &20), 1);
        assert_eq!(tree.count_in_range(&19, &21), 1);
    }

    #[test]
    fn predecessor_walks_backwards() {
        let tree = build(&(0..100).rev().collect::<Vec<_>>());
        let mut keys = Vec::new();
        let mut current = tree.back();
        while let Some(handle) = current {
            keys.push(*tree.key(handle));
            current = tree.predecessor(handle);
        }
        assert_eq!(keys, (0..100).rev().collect::<Vec<_>>());
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = build(&[1, 2, 3]);
        tree.clear();
        tree.validate_invariants();
        assert!(tree.front().is_none() && tree.back().is_none());

        tree.insert(7);
        tree.validate_invariants();
        assert_eq!(in_order(&tree), [7]);
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let tree = build(&(0..4096).collect::<Vec<_>>());
        tree.validate_invariants();
        // A perfectly balanced tree of 4096 keys has height 13.
        assert_eq!(tree.height(tree.root), 13);
    }

    #[test]
    fn path_holds_tallest_tree_inline() {
        let mut path = Path::new();
        assert!(path.inline_size() >= Handle::MAX_HEIGHT);
        for index in 0..Handle::MAX_HEIGHT {
            path.push(PathElement { node: Handle::from_index(index), side: Side::Left });
        }
        assert_eq!(path.len(), Handle::MAX_HEIGHT);
        assert!(!path.spilled());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Count(i32, i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (-500i32..500).prop_map(Op::Insert),
            1 => (-520i32..520, -520i32..520).prop_map(|(lo, hi)| Op::Count(lo, hi)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_inserts(keys in prop::collection::vec(-1000i32..1000, 0..400)) {
            let mut tree: RawAvlTree<i32> = RawAvlTree::new();
            for key in keys {
                tree.insert(key);
                tree.validate_invariants();
            }
        }

        #[test]
        fn count_in_range_matches_linear_scan(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawAvlTree<i32> = RawAvlTree::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let (_, inserted) = tree.insert(key);
                        prop_assert_eq!(inserted, !model.contains(&key));
                        if inserted {
                            model.push(key);
                        }
                    }
                    Op::Count(lo, hi) => {
                        let expected = model.iter().filter(|&&k| lo <= k && k <= hi).count();
                        prop_assert_eq!(tree.count_in_range(&lo, &hi), expected, "count_in_range({}, {})", lo, hi);
                    }
                }
            }
        }

        #[test]
        fn count_greater_matches_rank(keys in prop::collection::vec(-1000i32..1000, 1..300)) {
            let tree = build(&keys);
            let sorted = in_order(&tree);

            for (rank, key) in sorted.iter().enumerate() {
                let handle = tree.search(key).unwrap();
                prop_assert_eq!(tree.count_greater(handle), sorted.len() - rank - 1);
            }
        }

        #[test]
        fn successor_and_predecessor_agree(keys in prop::collection::vec(-1000i32..1000, 1..300)) {
            let tree = build(&keys);
            let mut current = tree.front();
            let mut steps = 0;

            while let Some(handle) = current {
                let next = tree.successor(handle);
                if let Some(next) = next {
                    prop_assert_eq!(tree.predecessor(next), Some(handle));
                }
                current = next;
                steps += 1;
            }
            prop_assert_eq!(steps, tree.len());
        }
    }
}
