use crate::avl_tree::node::Node;
use crate::avl_tree::tree;
use crate::error::{Error, Result};
use crate::ordered_index::{self, OrderedIndex};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

/// An ordered set implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of two child subtrees of any node differ by at most one. For `n` keys the height of
/// the tree never exceeds roughly `1.44 * log2(n + 2)`.
///
/// # Examples
///
/// ```
/// use ordered_index::avl_tree::AvlSet;
///
/// let mut set = AvlSet::new();
/// set.insert(0);
/// set.insert(3);
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.ceil(&2), Some(&3));
///
/// assert!(set.remove(&0));
/// assert!(!set.remove(&1));
/// ```
pub struct AvlSet<T> {
    tree: tree::Tree<T>,
    len: usize,
}

impl<T> AvlSet<T> {
    /// Constructs a new, empty `AvlSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = AvlSet::new();
    /// ```
    pub fn new() -> Self {
        AvlSet { tree: None, len: 0 }
    }

    /// Inserts a key into the set. Returns `false` if an equal key already exists, in which case
    /// the set is left unchanged and `key` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert!(set.insert(1));
    /// assert!(set.contains(&1));
    /// assert!(!set.insert(1));
    /// ```
    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        let inserted = tree::insert(&mut self.tree, key);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes a key from the set. Returns `true` if the key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert!(set.remove(&1));
    /// assert!(!set.remove(&1));
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes a key from the set and returns it. Returns `None` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(String::from("a"));
    /// assert_eq!(set.take("a"), Some(String::from("a")));
    /// assert_eq!(set.take("a"), None);
    /// ```
    pub fn take<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let ret = tree::remove(&mut self.tree, key);
        if ret.is_some() {
            self.len -= 1;
        }
        ret
    }

    /// Checks if a key exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns a reference to the key in the set that is equal to a particular key.
    pub fn get<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::get(&self.tree, key)
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the set, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree = None;
        self.len = 0;
    }

    /// Returns the number of nodes on the longest path from the root to a leaf. An empty set has
    /// height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = (1..8).collect();
    /// assert_eq!(set.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        tree::height(&self.tree)
    }

    /// Returns the number of bytes held by the nodes of the set.
    pub fn memory_usage(&self) -> usize {
        self.len * mem::size_of::<Node<T>>()
    }

    /// Returns a key in the set that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::floor(&self.tree, key)
    }

    /// Returns a key in the set that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::ceil(&self.tree, key)
    }

    /// Returns the minimum key of the set. Returns `None` if the set is empty.
    pub fn min(&self) -> Option<&T> {
        tree::min(&self.tree)
    }

    /// Returns the maximum key of the set. Returns `None` if the set is empty.
    pub fn max(&self) -> Option<&T> {
        tree::max(&self.tree)
    }

    /// Returns an iterator over the set. The iterator will yield keys using in-order traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> AvlSetIter<'_, T> {
        AvlSetIter {
            current: &self.tree,
            stack: Vec::new(),
        }
    }

    /// Checks every structural invariant of the tree: cached heights, the balance of every
    /// node, the number of nodes, and the ascending order of keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = (0..100).rev().collect();
    /// assert_eq!(set.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        let actual = tree::validate(&self.tree)?;
        if actual != self.len {
            return Err(Error::LengthMismatch {
                expected: self.len,
                actual,
            });
        }
        ordered_index::check_ascending(self.iter())
    }
}

impl<T> IntoIterator for AvlSet<T> {
    type IntoIter = AvlSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            current: self.tree,
            stack: Vec::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlSet<T>
where
    T: 'a,
{
    type IntoIter = AvlSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `AvlSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields owned keys.
pub struct AvlSetIntoIter<T> {
    current: tree::Tree<T>,
    stack: Vec<Node<T>>,
}

impl<T> Iterator for AvlSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut node) = self.current.take() {
            self.current = node.left.take();
            self.stack.push(*node);
        }
        self.stack.pop().map(|node| {
            let Node { key, right, .. } = node;
            self.current = right;
            key
        })
    }
}

/// An iterator for `AvlSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references.
pub struct AvlSetIter<'a, T> {
    current: &'a tree::Tree<T>,
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for AvlSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ref node) = self.current {
            self.current = &node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            self.current = &node.right;
            &node.key
        })
    }
}

impl<T> Default for AvlSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for AvlSet<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T> FromIterator<T> for AvlSet<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = AvlSet::new();
        set.extend(iter);
        set
    }
}

impl<T> PartialEq for AvlSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &AvlSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> Eq for AvlSet<T> where T: Eq {}

impl<T> fmt::Debug for AvlSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> OrderedIndex<T> for AvlSet<T>
where
    T: Ord,
{
    fn insert(&mut self, key: T) -> bool {
        AvlSet::insert(self, key)
    }

    fn remove(&mut self, key: &T) -> bool {
        AvlSet::remove(self, key)
    }

    fn contains(&self, key: &T) -> bool {
        AvlSet::contains(self, key)
    }

    fn in_order(&self) -> Vec<&T> {
        self.iter().collect()
    }

    fn height(&self) -> usize {
        AvlSet::height(self)
    }

    fn len(&self) -> usize {
        AvlSet::len(self)
    }

    fn memory_usage(&self) -> usize {
        AvlSet::memory_usage(self)
    }

    fn validate(&self) -> Result<()> {
        AvlSet::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AvlSet, Node};
    use crate::ordered_index::OrderedIndex;
    use std::mem;

    #[test]
    fn test_len_empty() {
        let set: AvlSet<u32> = AvlSet::new();
        assert_eq!(set.len(), 0);
        assert_eq!(set.height(), 0);
    }

    #[test]
    fn test_is_empty() {
        let set: AvlSet<u32> = AvlSet::new();
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: AvlSet<u32> = AvlSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut set = AvlSet::new();
        assert!(set.insert(1));
        assert!(set.contains(&1));
        assert_eq!(set.get(&1), Some(&1));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut set = AvlSet::new();
        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut set = AvlSet::new();
        set.insert(1);
        assert!(set.remove(&1));
        assert!(!set.contains(&1));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_missing() {
        let mut set = AvlSet::new();
        set.insert(1);
        assert!(!set.remove(&2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_min_max() {
        let mut set = AvlSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_floor_ceil() {
        let mut set = AvlSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.floor(&0), None);
        assert_eq!(set.floor(&2), Some(&1));
        assert_eq!(set.floor(&4), Some(&3));
        assert_eq!(set.floor(&6), Some(&5));

        assert_eq!(set.ceil(&0), Some(&1));
        assert_eq!(set.ceil(&2), Some(&3));
        assert_eq!(set.ceil(&4), Some(&5));
        assert_eq!(set.ceil(&6), None);
    }

    #[test]
    fn test_into_iter() {
        let mut set = AvlSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.into_iter().collect::<Vec<u32>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_iter() {
        let mut set = AvlSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
    }

    #[test]
    fn test_memory_usage() {
        let mut set = AvlSet::new();
        assert_eq!(set.memory_usage(), 0);
        set.insert(1u64);
        set.insert(2u64);
        assert_eq!(set.memory_usage(), 2 * mem::size_of::<Node<u64>>());
    }

    #[test]
    fn test_debug() {
        let set: AvlSet<u32> = vec![2, 1].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{1, 2}");
    }

    #[test]
    fn test_ordered_index() {
        let mut set: AvlSet<u32> = AvlSet::new();
        {
            let index: &mut dyn OrderedIndex<u32> = &mut set;
            assert!(index.insert(2));
            assert!(index.insert(1));
            assert!(!index.insert(1));
            assert_eq!(index.in_order(), vec![&1, &2]);
            assert!(index.remove(&2));
            assert!(!index.contains(&2));
            assert_eq!(index.height(), 1);
            assert_eq!(index.validate(), Ok(()));
        }
        assert_eq!(set.len(), 1);
    }
}
