//! Contract shared by the ordered sets in this crate.

use crate::error::{Error, Result};

/// An in-memory ordered index over a totally ordered key type.
///
/// `AvlSet<T>` and `RedBlackSet<T>` both implement this trait, so a caller can pick either
/// balancing scheme behind the same interface. Inserting a duplicate key and removing an absent
/// key are no-ops.
///
/// # Examples
///
/// ```
/// use ordered_index::avl_tree::AvlSet;
/// use ordered_index::red_black_tree::RedBlackSet;
/// use ordered_index::OrderedIndex;
///
/// fn fill(index: &mut dyn OrderedIndex<u32>) {
///     for key in &[5, 3, 8, 1, 4, 7, 9] {
///         index.insert(*key);
///     }
///     index.remove(&3);
/// }
///
/// let mut avl: AvlSet<u32> = AvlSet::new();
/// let mut red_black: RedBlackSet<u32> = RedBlackSet::new();
/// fill(&mut avl);
/// fill(&mut red_black);
///
/// assert_eq!(OrderedIndex::in_order(&avl), vec![&1, &4, &5, &7, &8, &9]);
/// assert_eq!(OrderedIndex::in_order(&red_black), vec![&1, &4, &5, &7, &8, &9]);
/// ```
pub trait OrderedIndex<T>
where
    T: Ord,
{
    /// Inserts a key. Returns `false` if an equal key was already present.
    fn insert(&mut self, key: T) -> bool;

    /// Removes a key. Returns `true` if the key was present.
    fn remove(&mut self, key: &T) -> bool;

    /// Checks if a key is present.
    fn contains(&self, key: &T) -> bool;

    /// Returns every key in ascending order. The sequence is rebuilt on each call.
    fn in_order(&self) -> Vec<&T>;

    /// Returns the number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize;

    /// Returns the number of keys.
    fn len(&self) -> usize;

    /// Returns `true` if there are no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes held by the nodes.
    fn memory_usage(&self) -> usize;

    /// Checks the structural invariants of the underlying tree.
    fn validate(&self) -> Result<()>;
}

pub(crate) fn check_ascending<'a, T, I>(iter: I) -> Result<()>
where
    T: 'a + Ord,
    I: IntoIterator<Item = &'a T>,
{
    let mut prev: Option<&T> = None;
    for key in iter {
        if let Some(prev) = prev {
            if prev >= key {
                return Err(Error::OutOfOrder);
            }
        }
        prev = Some(key);
    }
    Ok(())
}
