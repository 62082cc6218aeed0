use core::num::NonZero;

#[cfg(test)]
pub(crate) type RawHandle = u16;
#[cfg(not(test))]
pub(crate) type RawHandle = u32;

/// Arena index of an AVL node.
///
/// Child and parent links are `Option<Handle>`, with `None` for a missing
/// child or for the root's parent. The index is stored off by one so the
/// `None` case costs nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest node index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Tallest AVL tree that fits in `MAX + 1` nodes.
    ///
    /// The sparsest AVL tree of height `h` has `N(h) = N(h - 1) + N(h - 2) + 1`
    /// nodes, so this is the largest `h` with `N(h) <= MAX + 1`. Insertion
    /// paths and the stored `u8` height are sized against it.
    pub(crate) const MAX_HEIGHT: usize = {
        let capacity = Self::MAX as u64 + 1;
        let (mut shorter, mut taller, mut height) = (0u64, 1u64, 1usize);
        while shorter + taller < capacity {
            let next = shorter + taller + 1;
            shorter = taller;
            taller = next;
            height += 1;
        }
        height
    };

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` is nonzero and fits after the assert above.
        #[allow(clippy::cast_possible_truncation)]
        Self(NonZero::new((index + 1) as RawHandle).unwrap())
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::{assert_eq_size, const_assert};

    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, RawHandle);
    const_assert!(Handle::MAX_HEIGHT <= u8::MAX as usize);

    /// Node count of the sparsest AVL tree of `height`.
    fn sparsest(height: usize) -> u64 {
        match height {
            0 => 0,
            1 => 1,
            _ => sparsest(height - 1) + sparsest(height - 2) + 1,
        }
    }

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` > `Handle::MAX`!")]
    fn invalid_handle() {
        let _ = Handle::from_index(Handle::MAX + 1);
    }

    #[test]
    fn first_and_last_index() {
        assert_eq!(Handle::from_index(0).to_index(), 0);
        assert_eq!(Handle::from_index(Handle::MAX).to_index(), Handle::MAX);
        assert_ne!(Handle::from_index(0), Handle::from_index(1));
    }

    #[test]
    fn max_height_is_tallest_sparse_tree() {
        let capacity = Handle::MAX as u64 + 1;
        assert!(sparsest(Handle::MAX_HEIGHT) <= capacity);
        assert!(sparsest(Handle::MAX_HEIGHT + 1) > capacity);
        // 65535 nodes under the test-width handle.
        assert_eq!(Handle::MAX_HEIGHT, 22);
    }

    proptest! {
        #[test]
        fn handle_preserves_index(index in 0..=Handle::MAX) {
            let handle = Handle::from_index(index);
            prop_assert_eq!(handle.to_index(), index);
        }
    }
}
