use crate::avl_tree::node::Node;
use crate::error::{Error, Result};
use log::trace;
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

pub type Tree<T> = Option<Box<Node<T>>>;

pub fn height<T>(tree: &Tree<T>) -> usize {
    match tree {
        None => 0,
        Some(ref node) => node.height,
    }
}

fn balance<T>(tree: &Tree<T>) -> i64 {
    match tree {
        None => 0,
        Some(ref node) => node.balance(),
    }
}

fn rotate_left<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    trace!("avl rotate left at height {}", node.height);
    let mut child = match node.right.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.right = child.left.take();
    node.update();
    child.left = Some(node);
    child.update();
    child
}

fn rotate_right<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    trace!("avl rotate right at height {}", node.height);
    let mut child = match node.left.take() {
        Some(child) => child,
        None => unreachable!(),
    };
    node.left = child.right.take();
    node.update();
    child.right = Some(node);
    child.update();
    child
}

// The direction an insertion took when leaving a node, or `Leaf` if the node was just created.
#[derive(Clone, Copy, PartialEq)]
enum Descent {
    Leaf,
    Left,
    Right,
}

// Rebalances after an insertion. The shape of the violation is given by the side the new key
// landed on below the heavy child.
fn rebalance_insertion<T>(tree: &mut Tree<T>, landed: Descent) {
    let mut node = match tree.take() {
        Some(node) => node,
        None => return,
    };

    node.update();

    if node.balance() > 1 {
        if landed == Descent::Right {
            node.left = node.left.take().map(rotate_left);
        }
        node = rotate_right(node);
    } else if node.balance() < -1 {
        if landed == Descent::Left {
            node.right = node.right.take().map(rotate_right);
        }
        node = rotate_left(node);
    }

    *tree = Some(node);
}

// Rebalances after a removal. Any ancestor on the removal path may be unbalanced, so the shape
// is read from the balance factor of the heavy child rather than from the removed key.
fn rebalance_removal<T>(tree: &mut Tree<T>) {
    let mut node = match tree.take() {
        Some(node) => node,
        None => return,
    };

    node.update();

    if node.balance() > 1 {
        if balance(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        node = rotate_right(node);
    } else if node.balance() < -1 {
        if balance(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        node = rotate_left(node);
    }

    *tree = Some(node);
}

fn insert_descend<T>(tree: &mut Tree<T>, key: T) -> Option<Descent>
where
    T: Ord,
{
    let (descent, landed) = match tree {
        Some(ref mut node) => match key.cmp(&node.key) {
            Ordering::Less => (Descent::Left, insert_descend(&mut node.left, key)?),
            Ordering::Greater => (Descent::Right, insert_descend(&mut node.right, key)?),
            Ordering::Equal => return None,
        },
        None => {
            *tree = Some(Box::new(Node::new(key)));
            return Some(Descent::Leaf);
        },
    };

    rebalance_insertion(tree, landed);
    Some(descent)
}

/// Inserts `key` into the tree. Returns `false` and leaves the tree untouched if an equal key is
/// already present.
pub fn insert<T>(tree: &mut Tree<T>, key: T) -> bool
where
    T: Ord,
{
    insert_descend(tree, key).is_some()
}

// precondition: there exists a minimum node in the tree
fn remove_min<T>(tree: &mut Tree<T>) -> T {
    if let Some(ref mut node) = tree {
        if node.left.is_some() {
            let key = remove_min(&mut node.left);
            rebalance_removal(tree);
            return key;
        }
    }

    let mut node = tree.take().expect("Expected a non-empty tree.");
    *tree = node.right.take();
    node.key
}

// precondition: the tree is non-empty
fn remove_root<T>(tree: &mut Tree<T>) -> T {
    let mut node = tree.take().expect("Expected a non-empty tree.");
    match (node.left.take(), node.right.take()) {
        (None, None) => node.key,
        (Some(child), None) | (None, Some(child)) => {
            *tree = Some(child);
            node.key
        },
        (left, right) => {
            node.left = left;
            node.right = right;
            let successor = remove_min(&mut node.right);
            let key = mem::replace(&mut node.key, successor);
            *tree = Some(node);
            rebalance_removal(tree);
            key
        },
    }
}

/// Removes the key equal to `key` from the tree and returns it, rebalancing every node on the
/// path back to the root.
pub fn remove<T, V>(tree: &mut Tree<T>, key: &V) -> Option<T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let node = tree.as_mut()?;
    let ret = match key.cmp(node.key.borrow()) {
        Ordering::Less => remove(&mut node.left, key)?,
        Ordering::Greater => remove(&mut node.right, key)?,
        Ordering::Equal => return Some(remove_root(tree)),
    };

    rebalance_removal(tree);
    Some(ret)
}

pub fn get<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    while let Some(ref node) = curr {
        match key.cmp(node.key.borrow()) {
            Ordering::Less => curr = &node.left,
            Ordering::Greater => curr = &node.right,
            Ordering::Equal => return Some(&node.key),
        }
    }
    None
}

pub fn ceil<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.key.borrow()) {
            Ordering::Greater => ceil(&node.right, key),
            Ordering::Less => {
                match ceil(&node.left, key) {
                    None => Some(&node.key),
                    res => res,
                }
            },
            Ordering::Equal => Some(&node.key),
        }
    })
}

pub fn floor<'a, T, V>(tree: &'a Tree<T>, key: &V) -> Option<&'a T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.key.borrow()) {
            Ordering::Less => floor(&node.left, key),
            Ordering::Greater => {
                match floor(&node.right, key) {
                    None => Some(&node.key),
                    res => res,
                }
            },
            Ordering::Equal => Some(&node.key),
        }
    })
}

pub fn min<T>(tree: &Tree<T>) -> Option<&T> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.key
    })
}

pub fn max<T>(tree: &Tree<T>) -> Option<&T> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.key
    })
}

/// Checks the cached heights and the balance of every node. Returns the number of nodes.
pub fn validate<T>(tree: &Tree<T>) -> Result<usize> {
    fn check<T>(tree: &Tree<T>) -> Result<(usize, usize)> {
        let node = match tree {
            None => return Ok((0, 0)),
            Some(ref node) => node,
        };
        let (left_height, left_count) = check(&node.left)?;
        let (right_height, right_count) = check(&node.right)?;

        let computed = cmp::max(left_height, right_height) + 1;
        if node.height != computed {
            return Err(Error::HeightMismatch {
                stored: node.height,
                computed,
            });
        }

        let balance = left_height as i64 - right_height as i64;
        if balance.abs() > 1 {
            return Err(Error::Unbalanced { balance });
        }

        Ok((computed, left_count + right_count + 1))
    }

    check(tree).map(|(_, count)| count)
}

#[cfg(test)]
mod tests {
    use super::{height, insert, remove, validate, Tree};
    use crate::avl_tree::node::Node;
    use crate::error::Error;

    fn key<T: Copy>(tree: &Tree<T>) -> Option<T> {
        tree.as_ref().map(|node| node.key)
    }

    fn build(keys: &[u32]) -> Tree<u32> {
        let mut tree = None;
        for key in keys {
            assert!(insert(&mut tree, *key));
        }
        tree
    }

    fn children(tree: &Tree<u32>) -> (Option<u32>, Option<u32>) {
        let node = tree.as_ref().unwrap();
        (key(&node.left), key(&node.right))
    }

    #[test]
    fn test_insert_left_left() {
        let tree = build(&[3, 2, 1]);
        assert_eq!(key(&tree), Some(2));
        assert_eq!(children(&tree), (Some(1), Some(3)));
        assert_eq!(height(&tree), 2);
    }

    #[test]
    fn test_insert_left_right() {
        let tree = build(&[3, 1, 2]);
        assert_eq!(key(&tree), Some(2));
        assert_eq!(children(&tree), (Some(1), Some(3)));
    }

    #[test]
    fn test_insert_right_right() {
        let tree = build(&[1, 2, 3]);
        assert_eq!(key(&tree), Some(2));
        assert_eq!(children(&tree), (Some(1), Some(3)));
    }

    #[test]
    fn test_insert_right_left() {
        let tree = build(&[1, 3, 2]);
        assert_eq!(key(&tree), Some(2));
        assert_eq!(children(&tree), (Some(1), Some(3)));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut tree = build(&[2, 1]);
        assert!(!insert(&mut tree, 2));
        assert_eq!(validate(&tree), Ok(2));
    }

    #[test]
    fn test_remove_leaf_single_rotation() {
        let mut tree = build(&[2, 1, 3, 4]);
        assert_eq!(remove(&mut tree, &1), Some(1));
        assert_eq!(key(&tree), Some(3));
        assert_eq!(children(&tree), (Some(2), Some(4)));
        assert_eq!(validate(&tree), Ok(3));
    }

    #[test]
    fn test_remove_balanced_child_single_rotation() {
        let mut tree = build(&[2, 1, 4, 3, 5]);
        assert_eq!(remove(&mut tree, &1), Some(1));
        assert_eq!(key(&tree), Some(4));
        assert_eq!(children(&tree), (Some(2), Some(5)));
        assert_eq!(height(&tree), 3);
        assert_eq!(validate(&tree), Ok(4));
    }

    #[test]
    fn test_remove_double_rotation() {
        let mut tree = build(&[2, 1, 4, 3]);
        assert_eq!(remove(&mut tree, &1), Some(1));
        assert_eq!(key(&tree), Some(3));
        assert_eq!(children(&tree), (Some(2), Some(4)));
    }

    #[test]
    fn test_remove_two_children() {
        let mut tree = build(&[2, 1, 3]);
        assert_eq!(remove(&mut tree, &2), Some(2));
        assert_eq!(key(&tree), Some(3));
        assert_eq!(children(&tree), (Some(1), None));
        assert_eq!(validate(&tree), Ok(2));
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = build(&[2, 1, 3]);
        assert_eq!(remove(&mut tree, &4), None);
        assert_eq!(validate(&tree), Ok(3));
    }

    #[test]
    fn test_validate_unbalanced() {
        let mut root = Node::new(3);
        let mut child = Node::new(2);
        child.left = Some(Box::new(Node::new(1)));
        child.update();
        root.left = Some(Box::new(child));
        root.update();
        assert_eq!(validate(&Some(Box::new(root))), Err(Error::Unbalanced { balance: 2 }));
    }

    #[test]
    fn test_validate_height_mismatch() {
        let mut root = Node::new(1);
        root.height = 2;
        assert_eq!(
            validate(&Some(Box::new(root))),
            Err(Error::HeightMismatch {
                stored: 2,
                computed: 1,
            }),
        );
    }
}
