use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use crate::red_black_tree::node::{Color, Node, Side};
use log::trace;
use std::borrow::Borrow;
use std::cmp::{self, Ordering};

// Where a key is, or where it would be attached if it is absent.
enum Slot {
    Occupied(Handle),
    Vacant(Option<(Handle, Side)>),
}

/// The arena-backed red black tree behind `RedBlackSet<T>`.
pub struct Tree<T> {
    pub arena: TypedArena<Node<T>>,
    pub root: Option<Handle>,
}

impl<T> Tree<T> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    fn is_red(&self, node: Option<Handle>) -> bool {
        match node {
            None => false,
            Some(handle) => self.arena[handle].color == Color::Red,
        }
    }

    fn set_color(&mut self, node: Option<Handle>, color: Color) {
        if let Some(handle) = node {
            self.arena[handle].color = color;
        }
    }

    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn expect_child(&self, node: Handle, side: Side) -> Handle {
        self.arena[node]
            .child(side)
            .expect("Expected child node to be `Some`.")
    }

    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                self.arena[parent].set_child(side, new);
            },
        }
    }

    // Puts the subtree rooted at `new` in the place of the subtree rooted at `old`.
    fn transplant(&mut self, old: Handle, new: Option<Handle>) {
        let parent = self.arena[old].parent;
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.arena[new].parent = parent;
        }
    }

    // Moves `node` down towards `side`, promoting its child on the opposite side.
    fn rotate(&mut self, node: Handle, side: Side) {
        trace!("red black rotate {:?}", side);
        let child = self.expect_child(node, side.opposite());
        let inner = self.arena[child].child(side);

        self.arena[node].set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(node);
        }

        let parent = self.arena[node].parent;
        self.replace_child(parent, node, Some(child));
        self.arena[child].parent = parent;

        self.arena[child].set_child(side, Some(node));
        self.arena[node].parent = Some(child);
    }

    fn minimum(&self, mut node: Handle) -> Handle {
        while let Some(left) = self.arena[node].left {
            node = left;
        }
        node
    }

    fn maximum(&self, mut node: Handle) -> Handle {
        while let Some(right) = self.arena[node].right {
            node = right;
        }
        node
    }

    fn locate<V>(&self, key: &V) -> Slot
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut slot = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            let side = match key.cmp(node.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Slot::Occupied(handle),
            };
            slot = Some((handle, side));
            curr = node.child(side);
        }
        Slot::Vacant(slot)
    }

    fn attach(&mut self, node: Handle, slot: Option<(Handle, Side)>) {
        match slot {
            None => self.root = Some(node),
            Some((parent, side)) => self.arena[parent].set_child(side, Some(node)),
        }
        self.insert_fixup(node);
    }

    /// Inserts `key` as a red leaf and restores the coloring. Returns `false` without allocating
    /// if an equal key is already present.
    pub fn insert(&mut self, key: T) -> bool
    where
        T: Ord,
    {
        let slot = match self.locate(&key) {
            Slot::Occupied(_) => return false,
            Slot::Vacant(slot) => slot,
        };
        let node = self.arena.allocate(Node::new(key, slot.map(|(parent, _)| parent)));
        self.attach(node, slot);
        true
    }

    /// Same as `insert`, but reports a failure to grow the arena instead of aborting.
    pub fn try_insert(&mut self, key: T) -> Result<bool>
    where
        T: Ord,
    {
        let slot = match self.locate(&key) {
            Slot::Occupied(_) => return Ok(false),
            Slot::Vacant(slot) => slot,
        };
        let node = self
            .arena
            .try_allocate(Node::new(key, slot.map(|(parent, _)| parent)))?;
        self.attach(node, slot);
        Ok(true)
    }

    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(mut parent) = self.arena[node].parent {
            if self.arena[parent].color == Color::Black {
                break;
            }
            let grandparent = match self.arena[parent].parent {
                Some(grandparent) => grandparent,
                None => break,
            };

            let side = self.side_of(grandparent, parent);
            let uncle = self.arena[grandparent].child(side.opposite());
            if self.is_red(uncle) {
                self.arena[parent].color = Color::Black;
                self.set_color(uncle, Color::Black);
                self.arena[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            if self.arena[parent].child(side.opposite()) == Some(node) {
                self.rotate(parent, side);
                let straightened = node;
                node = parent;
                parent = straightened;
            }

            trace!("red black insert restructure");
            self.arena[parent].color = Color::Black;
            self.arena[grandparent].color = Color::Red;
            self.rotate(grandparent, side.opposite());
            break;
        }

        self.set_color(self.root, Color::Black);
    }

    /// Removes the key equal to `key` and returns it.
    pub fn remove<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let node = match self.locate(key) {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => return None,
        };

        let (left, right) = (self.arena[node].left, self.arena[node].right);
        let color = self.arena[node].color;
        let mut removed_color = color;

        // `x` takes the structural position that lost a node; `x_parent` is tracked separately
        // since `x` may be absent.
        let (x, x_parent) = match (left, right) {
            (None, _) => {
                let parent = self.arena[node].parent;
                self.transplant(node, right);
                (right, parent)
            },
            (_, None) => {
                let parent = self.arena[node].parent;
                self.transplant(node, left);
                (left, parent)
            },
            (Some(left), Some(right)) => {
                let successor = self.minimum(right);
                removed_color = self.arena[successor].color;
                let x = self.arena[successor].right;

                let x_parent = if self.arena[successor].parent == Some(node) {
                    Some(successor)
                } else {
                    let parent = self.arena[successor].parent;
                    self.transplant(successor, x);
                    self.arena[successor].right = Some(right);
                    self.arena[right].parent = Some(successor);
                    parent
                };

                self.transplant(node, Some(successor));
                self.arena[successor].left = Some(left);
                self.arena[left].parent = Some(successor);
                self.arena[successor].color = color;
                (x, x_parent)
            },
        };

        let Node { key, .. } = self.arena.free(&node);

        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        Some(key)
    }

    fn delete_fixup(&mut self, mut x: Option<Handle>, mut parent: Option<Handle>) {
        while x != self.root && !self.is_red(x) {
            let curr_parent = match parent {
                Some(curr_parent) => curr_parent,
                None => break,
            };

            // A doubly black position always has a sibling, so an absent `x` matching the left
            // slot means it is the left child.
            let side = if self.arena[curr_parent].left == x {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();

            let mut sibling = self.expect_child(curr_parent, far);
            if self.arena[sibling].color == Color::Red {
                self.arena[sibling].color = Color::Black;
                self.arena[curr_parent].color = Color::Red;
                self.rotate(curr_parent, side);
                sibling = self.expect_child(curr_parent, far);
            }

            let near_child = self.arena[sibling].child(side);
            let far_child = self.arena[sibling].child(far);
            if !self.is_red(near_child) && !self.is_red(far_child) {
                self.arena[sibling].color = Color::Red;
                x = Some(curr_parent);
                parent = self.arena[curr_parent].parent;
                continue;
            }

            if !self.is_red(far_child) {
                self.set_color(near_child, Color::Black);
                self.arena[sibling].color = Color::Red;
                self.rotate(sibling, far);
                sibling = self.expect_child(curr_parent, far);
            }

            trace!("red black delete restructure");
            let parent_color = self.arena[curr_parent].color;
            self.arena[sibling].color = parent_color;
            self.arena[curr_parent].color = Color::Black;
            let far_child = self.arena[sibling].child(far);
            self.set_color(far_child, Color::Black);
            self.rotate(curr_parent, side);
            x = self.root;
            parent = None;
        }

        self.set_color(x, Color::Black);
    }

    pub fn get<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.locate(key) {
            Slot::Occupied(handle) => Some(&self.arena[handle].key),
            Slot::Vacant(_) => None,
        }
    }

    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut ret = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            match key.cmp(node.key.borrow()) {
                Ordering::Greater => curr = node.right,
                Ordering::Less => {
                    ret = Some(&node.key);
                    curr = node.left;
                },
                Ordering::Equal => return Some(&node.key),
            }
        }
        ret
    }

    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut ret = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => curr = node.left,
                Ordering::Greater => {
                    ret = Some(&node.key);
                    curr = node.right;
                },
                Ordering::Equal => return Some(&node.key),
            }
        }
        ret
    }

    pub fn min(&self) -> Option<&T> {
        self.root.map(|root| &self.arena[self.minimum(root)].key)
    }

    pub fn max(&self) -> Option<&T> {
        self.root.map(|root| &self.arena[self.maximum(root)].key)
    }

    pub fn height(&self) -> usize {
        fn subtree_height<T>(tree: &Tree<T>, node: Option<Handle>) -> usize {
            match node {
                None => 0,
                Some(handle) => {
                    let node = &tree.arena[handle];
                    1 + cmp::max(
                        subtree_height(tree, node.left),
                        subtree_height(tree, node.right),
                    )
                },
            }
        }

        subtree_height(self, self.root)
    }

    /// Number of black nodes on the leftmost path from the root.
    pub fn black_height(&self) -> usize {
        let mut ret = 0;
        let mut curr = self.root;
        while let Some(handle) = curr {
            if self.arena[handle].color == Color::Black {
                ret += 1;
            }
            curr = self.arena[handle].left;
        }
        ret
    }

    /// Handles of every node in key order.
    pub fn in_order_handles(&self) -> Vec<Handle> {
        let mut ret = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut curr = self.root;
        loop {
            while let Some(handle) = curr {
                stack.push(handle);
                curr = self.arena[handle].left;
            }
            match stack.pop() {
                Some(handle) => {
                    ret.push(handle);
                    curr = self.arena[handle].right;
                },
                None => return ret,
            }
        }
    }

    /// Checks the root color, the red rule, uniform black height, and parent links. Returns the
    /// number of reachable nodes.
    pub fn validate(&self) -> Result<usize> {
        fn check<T>(tree: &Tree<T>, handle: Option<Handle>) -> Result<(usize, usize)> {
            let handle = match handle {
                None => return Ok((0, 0)),
                Some(handle) => handle,
            };
            let node = &tree.arena[handle];

            for child in node.left.iter().chain(node.right.iter()) {
                let child = &tree.arena[*child];
                if child.parent != Some(handle) {
                    return Err(Error::BrokenParentLink);
                }
                if node.color == Color::Red && child.color == Color::Red {
                    return Err(Error::RedViolation);
                }
            }

            let (left_black_height, left_count) = check(tree, node.left)?;
            let (right_black_height, right_count) = check(tree, node.right)?;
            if left_black_height != right_black_height {
                return Err(Error::BlackHeightMismatch {
                    left: left_black_height,
                    right: right_black_height,
                });
            }

            let black_height = match node.color {
                Color::Black => left_black_height + 1,
                Color::Red => left_black_height,
            };
            Ok((black_height, left_count + right_count + 1))
        }

        if let Some(root) = self.root {
            let root = &self.arena[root];
            if root.parent.is_some() {
                return Err(Error::BrokenParentLink);
            }
            if root.color == Color::Red {
                return Err(Error::RedRoot);
            }
        }

        check(self, self.root).map(|(_, count)| count)
    }
}

#[cfg(test)]
mod tests {
    use super::{Slot, Tree};
    use crate::error::Error;
    use crate::red_black_tree::node::Color;

    fn build(keys: &[u32]) -> Tree<u32> {
        let mut tree = Tree::new(4);
        for key in keys {
            assert!(tree.insert(*key));
            assert!(tree.validate().is_ok());
        }
        tree
    }

    fn root_key(tree: &Tree<u32>) -> Option<u32> {
        tree.root.map(|root| tree.arena[root].key)
    }

    fn color(tree: &Tree<u32>, key: u32) -> Color {
        match tree.locate(&key) {
            Slot::Occupied(handle) => tree.arena[handle].color,
            Slot::Vacant(_) => panic!("missing key {}", key),
        }
    }

    fn keys(tree: &Tree<u32>) -> Vec<u32> {
        tree.in_order_handles()
            .into_iter()
            .map(|handle| tree.arena[handle].key)
            .collect()
    }

    #[test]
    fn test_insert_line() {
        let tree = build(&[1, 2, 3]);
        assert_eq!(root_key(&tree), Some(2));
        assert_eq!(color(&tree, 2), Color::Black);
        assert_eq!(color(&tree, 1), Color::Red);
        assert_eq!(color(&tree, 3), Color::Red);
    }

    #[test]
    fn test_insert_zig_zag() {
        let tree = build(&[3, 1, 2]);
        assert_eq!(root_key(&tree), Some(2));
        assert_eq!(keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_insert_red_uncle() {
        let tree = build(&[2, 1, 3, 4]);
        assert_eq!(root_key(&tree), Some(2));
        assert_eq!(color(&tree, 1), Color::Black);
        assert_eq!(color(&tree, 3), Color::Black);
        assert_eq!(color(&tree, 4), Color::Red);
        assert_eq!(tree.black_height(), 2);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut tree = build(&[1, 2]);
        assert!(!tree.insert(2));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_black_leaf() {
        let mut tree = build(&[2, 1, 3, 4]);
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(root_key(&tree), Some(3));
        assert_eq!(color(&tree, 2), Color::Black);
        assert_eq!(color(&tree, 4), Color::Black);
        assert_eq!(tree.validate(), Ok(3));
    }

    #[test]
    fn test_remove_red_sibling() {
        let mut tree = build(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(color(&tree, 4), Color::Red);
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(keys(&tree), vec![2, 3, 4, 5, 6]);
        assert_eq!(tree.validate(), Ok(5));
    }

    #[test]
    fn test_remove_two_children() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(tree.remove(&4), Some(4));
        assert_eq!(root_key(&tree), Some(5));
        assert_eq!(keys(&tree), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(tree.validate(), Ok(6));
    }

    #[test]
    fn test_remove_root() {
        let mut tree = build(&[1]);
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(tree.root, None);
        assert_eq!(tree.validate(), Ok(0));
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = build(&[1, 2]);
        assert_eq!(tree.remove(&3), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_reuses_arena_block() {
        let mut tree = build(&[1, 2, 3, 4]);
        let capacity = tree.arena.capacity();
        tree.remove(&2);
        assert!(tree.insert(5));
        assert_eq!(tree.arena.capacity(), capacity);
    }

    #[test]
    fn test_validate_red_root() {
        let mut tree = build(&[1]);
        let root = tree.root.unwrap();
        tree.arena[root].color = Color::Red;
        assert_eq!(tree.validate(), Err(Error::RedRoot));
    }

    #[test]
    fn test_validate_red_violation() {
        let mut tree = build(&[2, 1, 3, 4]);
        match tree.locate(&3) {
            Slot::Occupied(handle) => tree.arena[handle].color = Color::Red,
            Slot::Vacant(_) => unreachable!(),
        }
        assert_eq!(tree.validate(), Err(Error::RedViolation));
    }

    #[test]
    fn test_validate_black_height_mismatch() {
        let mut tree = build(&[2, 1, 3]);
        match tree.locate(&1) {
            Slot::Occupied(handle) => tree.arena[handle].color = Color::Black,
            Slot::Vacant(_) => unreachable!(),
        }
        assert_eq!(
            tree.validate(),
            Err(Error::BlackHeightMismatch { left: 1, right: 0 }),
        );
    }

    #[test]
    fn test_validate_broken_parent_link() {
        let mut tree = build(&[2, 1]);
        match tree.locate(&1) {
            Slot::Occupied(handle) => tree.arena[handle].parent = None,
            Slot::Vacant(_) => unreachable!(),
        }
        assert_eq!(tree.validate(), Err(Error::BrokenParentLink));
    }
}
