use thiserror::Error;

/// Returned when reading the key under a [`Cursor`](crate::Cursor) that sits at
/// the past-the-end position.
///
/// # Examples
///
/// ```
/// use range_avl::{AvlTree, OutOfRange};
///
/// let tree = AvlTree::from([1, 2, 3]);
/// assert_eq!(tree.end().key(), Err(OutOfRange));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("cursor is past the end of the tree")]
pub struct OutOfRange;
