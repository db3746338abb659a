use crate::arena::Handle;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// An enum representing which child slot of a node is meant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A struct representing an internal node of a red black tree. Links are arena handles; the
/// parent link does not own anything.
pub struct Node<T> {
    pub key: T,
    pub color: Color,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<T> Node<T> {
    pub fn new(key: T, parent: Option<Handle>) -> Self {
        Node {
            key,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}
