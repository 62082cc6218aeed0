//! A size-augmented AVL tree with logarithmic range counting.
//!
//! This crate provides [`AvlTree`], an ordered set of unique keys that answers
//! "how many keys fall in `[lo, hi]`?" in O(log n), alongside the usual ordered
//! operations:
//!
//! - [`count_in_range`](AvlTree::count_in_range) - Count the keys in an inclusive range
//! - [`lower_bound`](AvlTree::lower_bound) / [`upper_bound`](AvlTree::upper_bound) - Nearest key at or past a bound
//! - [`front`](AvlTree::front) / [`back`](AvlTree::back) - O(1) minimum and maximum
//! - [`Cursor`] - Bidirectional position with a past-the-end state
//!
//! # Example
//!
//! ```
//! use range_avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in 0..100 {
//!     tree.insert(key);
//! }
//!
//! assert_eq!(tree.count_in_range(&5, &48), 44);
//! assert_eq!(tree.count_in_range(&48, &5), 0);
//!
//! let cursor = tree.lower_bound(&97);
//! assert_eq!(cursor.iter().copied().collect::<Vec<_>>(), [97, 98, 99]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No `unsafe`** - Nodes live in an arena and link to each other by index
//! - **O(log n) range counts** - Each node tracks the size of both of its subtrees
//!
//! # Implementation
//!
//! Every node stores its key, links to its children and parent, its height, and
//! the number of nodes in its left and right subtrees. Insertion descends
//! iteratively, then walks the recorded ancestors bottom-up, bumping one count
//! per level and rotating where the AVL balance is broken. A rotation moves one
//! subtree across and rederives both affected counts from their new children,
//! so the augmentation costs O(1) per rotation.
//!
//! The number of keys in `[lo, hi]` is
//! `1 + greater(lower_bound(lo)) - greater(upper_bound(hi))`, where `greater(x)`
//! counts keys above `x` with a single root-to-`x` walk.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avl_tree;

pub use avl_tree::{AvlTree, Cursor};
pub use error::OutOfRange;
