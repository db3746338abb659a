use crate::avl_tree::tree;
use std::cmp;

/// A struct representing an internal node of an avl tree.
pub struct Node<T> {
    pub key: T,
    pub height: usize,
    pub left: tree::Tree<T>,
    pub right: tree::Tree<T>,
}

impl<T> Node<T> {
    pub fn new(key: T) -> Self {
        Node {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }

    pub fn update(&mut self) {
        let Node { ref mut height, ref left, ref right, .. } = self;
        *height = cmp::max(tree::height(left), tree::height(right)) + 1;
    }

    pub fn balance(&self) -> i64 {
        (tree::height(&self.left) as i64) - (tree::height(&self.right) as i64)
    }
}
