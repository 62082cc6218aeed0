use super::handle::{Handle, RawHandle};

/// Number of nodes in a subtree.
///
/// Shares its backing integer with [`Handle`]: a subtree can never hold more
/// nodes than the arena can address.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Size(RawHandle);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ZERO: Self = Self(0);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(size as RawHandle)
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// Adds one node to this count.
    #[inline]
    pub(crate) fn increment(&mut self) {
        *self = Self::from_usize(self.to_usize() + 1);
    }

    /// Size of a subtree whose root has `left` and `right` descendants.
    #[inline]
    pub(crate) const fn of_subtree(left: Self, right: Self) -> Self {
        Self::from_usize(left.to_usize() + right.to_usize() + 1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn invalid_size() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn increment_past_max() {
        let mut size = Size::from_usize(Size::MAX);
        size.increment();
    }

    #[test]
    fn subtree_counts_its_root() {
        assert_eq!(Size::of_subtree(Size::ZERO, Size::ZERO).to_usize(), 1);
        assert_eq!(Size::of_subtree(Size::from_usize(3), Size::from_usize(4)).to_usize(), 8);
    }

    proptest! {
        #[test]
        fn size_preserves_value(value in 0..Size::MAX) {
            let mut size = Size::from_usize(value);
            prop_assert_eq!(size.to_usize(), value);
            size.increment();
            prop_assert_eq!(size.to_usize(), value + 1);
        }
    }
}
