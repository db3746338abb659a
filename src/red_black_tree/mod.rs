//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.
//!
//! Nodes live in a `TypedArena` and refer to their parent and children by handle.

mod node;
mod set;
mod tree;

pub use self::set::{RedBlackSet, RedBlackSetIntoIter, RedBlackSetIter, DEFAULT_CHUNK_SIZE};
