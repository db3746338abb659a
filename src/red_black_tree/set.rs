use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use crate::ordered_index::{self, OrderedIndex};
use crate::red_black_tree::node::Node;
use crate::red_black_tree::tree::Tree;
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::vec;

/// Number of nodes per arena chunk used by `RedBlackSet::new`.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// An ordered set implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree that colors every node red or black.
/// The root is black, no red node has a red child, and every path from a node down to an empty
/// subtree passes through the same number of black nodes, which keeps the height below
/// `2 * log2(n + 1)`.
///
/// Nodes are stored in a typed arena and linked by handle, so removing a key frees a slot that
/// later insertions reuse.
///
/// # Examples
///
/// ```
/// use ordered_index::red_black_tree::RedBlackSet;
///
/// let mut set = RedBlackSet::new();
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
pub struct RedBlackSet<T> {
    tree: Tree<T>,
}

impl<T> RedBlackSet<T> {
    /// Constructs a new, empty `RedBlackSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackSet<T>` whose arena allocates `chunk_size` nodes at a
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::with_chunk_size(16);
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackSet {
            tree: Tree::new(chunk_size),
        }
    }

    /// Inserts a key into the set. Returns `false` if an equal key already exists, in which case
    /// the set is left unchanged and `key` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert!(set.insert(1));
    /// assert!(set.contains(&1));
    /// assert!(!set.insert(1));
    /// ```
    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        self.tree.insert(key)
    }

    /// Inserts a key into the set, returning `Error::AllocationFailed` instead of aborting if the
    /// arena cannot grow. The set is unchanged on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.try_insert(1), Ok(true));
    /// assert_eq!(set.try_insert(1), Ok(false));
    /// ```
    pub fn try_insert(&mut self, key: T) -> Result<bool>
    where
        T: Ord,
    {
        self.tree.try_insert(key)
    }

    /// Removes a key from the set. Returns `true` if the key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
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
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(String::from("a"));
    /// assert_eq!(set.take("a"), Some(String::from("a")));
    /// assert_eq!(set.take("a"), None);
    /// ```
    pub fn take<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Checks if a key exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
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
        self.tree.get(key)
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the set, removing all values and releasing the arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of nodes on the longest path from the root to a leaf. An empty set has
    /// height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (1..4).collect();
    /// assert_eq!(set.height(), 2);
    /// ```
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the number of black nodes on any path from the root down to an empty subtree.
    pub fn black_height(&self) -> usize {
        self.tree.black_height()
    }

    /// Returns the number of bytes held by the live nodes of the set.
    pub fn memory_usage(&self) -> usize {
        self.len() * mem::size_of::<Node<T>>()
    }

    /// Returns a key in the set that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.floor(key)
    }

    /// Returns a key in the set that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.ceil(key)
    }

    /// Returns the minimum key of the set. Returns `None` if the set is empty.
    pub fn min(&self) -> Option<&T> {
        self.tree.min()
    }

    /// Returns the maximum key of the set. Returns `None` if the set is empty.
    pub fn max(&self) -> Option<&T> {
        self.tree.max()
    }

    /// Returns an iterator over the set. The iterator will yield keys using in-order traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackSetIter<'_, T> {
        RedBlackSetIter {
            tree: &self.tree,
            current: self.tree.root,
            stack: Vec::new(),
        }
    }

    /// Checks every structural invariant of the tree: the root is black, no red node has a red
    /// child, black heights agree, parent links match child links, the node count matches, and
    /// keys ascend.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_index::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (0..100).collect();
    /// assert_eq!(set.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        let actual = self.tree.validate()?;
        if actual != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual,
            });
        }
        ordered_index::check_ascending(self.iter())
    }
}

impl<T> IntoIterator for RedBlackSet<T> {
    type IntoIter = RedBlackSetIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        let handles = self.tree.in_order_handles();
        Self::IntoIter {
            arena: self.tree.arena,
            handles: handles.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RedBlackSet<T>
where
    T: 'a,
{
    type IntoIter = RedBlackSetIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields owned keys.
pub struct RedBlackSetIntoIter<T> {
    arena: TypedArena<Node<T>>,
    handles: vec::IntoIter<Handle>,
}

impl<T> Iterator for RedBlackSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let RedBlackSetIntoIter {
            ref mut arena,
            ref mut handles,
        } = self;
        handles.next().map(|handle| arena.free(&handle).key)
    }
}

/// An iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references.
pub struct RedBlackSetIter<'a, T> {
    tree: &'a Tree<T>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, T> Iterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = tree.arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            let node = &tree.arena[handle];
            self.current = node.right;
            &node.key
        })
    }
}

impl<T> Default for RedBlackSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T> FromIterator<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = RedBlackSet::new();
        set.extend(iter);
        set
    }
}

impl<T> PartialEq for RedBlackSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &RedBlackSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> Eq for RedBlackSet<T> where T: Eq {}

impl<T> fmt::Debug for RedBlackSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> OrderedIndex<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn insert(&mut self, key: T) -> bool {
        RedBlackSet::insert(self, key)
    }

    fn remove(&mut self, key: &T) -> bool {
        RedBlackSet::remove(self, key)
    }

    fn contains(&self, key: &T) -> bool {
        RedBlackSet::contains(self, key)
    }

    fn in_order(&self) -> Vec<&T> {
        self.iter().collect()
    }

    fn height(&self) -> usize {
        RedBlackSet::height(self)
    }

    fn len(&self) -> usize {
        RedBlackSet::len(self)
    }

    fn memory_usage(&self) -> usize {
        RedBlackSet::memory_usage(self)
    }

    fn validate(&self) -> Result<()> {
        RedBlackSet::validate(self)
    }
}
