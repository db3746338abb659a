//! In-memory ordered key index backed by two interchangeable self-balancing binary search
//! trees.
//!
//! - `avl_tree::AvlSet` keeps the heights of sibling subtrees within one of each other.
//! - `red_black_tree::RedBlackSet` keeps a red/black coloring with uniform black height; its
//!   nodes live in an `arena::TypedArena` and link to each other by handle.
//!
//! Both implement `OrderedIndex`, so callers can switch between them freely.

pub mod arena;
pub mod avl_tree;
mod error;
mod ordered_index;
pub mod red_black_tree;
mod serialize;

pub use crate::error::{Error, Result};
pub use crate::ordered_index::OrderedIndex;
