//! Balancing strategies for the tree engine.
//!
//! [`Unbalanced`] is a plain binary search tree insert. [`Avl`] performs
//! the same descent and then restores the AVL height invariant on the way
//! back up with single or double rotations.

use super::node::{Link, Node};
use crate::types::BackendKind;
use std::cmp::Ordering;

/// Insertion policy plugged into [`Tree`](super::Tree).
pub trait Balance {
    /// Backend reported by trees using this strategy.
    const KIND: BackendKind;

    /// Whether nodes carry an up-to-date cached height.
    const TRACKS_HEIGHT: bool;

    /// Inserts `value` under `key` into the subtree at `root`.
    ///
    /// An existing key gets the value appended (duplicates included).
    /// Returns true when a new node was created.
    fn insert<V>(root: &mut Link<V>, key: &str, value: V) -> bool;
}

/// Plain binary search tree insertion, no rebalancing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbalanced;

impl Balance for Unbalanced {
    const KIND: BackendKind = BackendKind::Bst;
    const TRACKS_HEIGHT: bool = false;

    fn insert<V>(root: &mut Link<V>, key: &str, value: V) -> bool {
        // Iterative so sorted input (a degenerate chain) cannot exhaust the stack.
        let mut slot = root;
        while let Some(node) = slot {
            match key.cmp(node.key.as_str()) {
                Ordering::Less => slot = &mut node.left,
                Ordering::Greater => slot = &mut node.right,
                Ordering::Equal => {
                    node.values.push(value);
                    return false;
                }
            }
        }
        *slot = Some(Node::leaf(key, value));
        true
    }
}

/// AVL insertion: height bookkeeping plus rotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avl;

impl Balance for Avl {
    const KIND: BackendKind = BackendKind::Avl;
    const TRACKS_HEIGHT: bool = true;

    fn insert<V>(root: &mut Link<V>, key: &str, value: V) -> bool {
        let (node, created) = insert_balanced(root.take(), key, value);
        *root = Some(node);
        created
    }
}

fn insert_balanced<V>(link: Link<V>, key: &str, value: V) -> (Box<Node<V>>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(key, value), true);
    };

    let created = match key.cmp(node.key.as_str()) {
        Ordering::Less => {
            let (child, created) = insert_balanced(node.left.take(), key, value);
            node.left = Some(child);
            created
        }
        Ordering::Greater => {
            let (child, created) = insert_balanced(node.right.take(), key, value);
            node.right = Some(child);
            created
        }
        Ordering::Equal => {
            // Appending never changes shape.
            node.values.push(value);
            return (node, false);
        }
    };

    node.update_height();
    (rebalance(node, key), created)
}

/// Restores balance at `node` after `key` was inserted below it.
fn rebalance<V>(mut node: Box<Node<V>>, key: &str) -> Box<Node<V>> {
    let balance = node.balance_factor();

    if balance >= 2 {
        let left_left = node
            .left
            .as_ref()
            .is_some_and(|left| key < left.key.as_str());
        if !left_left {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance <= -2 {
        let right_right = node
            .right
            .as_ref()
            .is_some_and(|right| key > right.key.as_str());
        if !right_right {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Rotates `y` right; its left child becomes the subtree root.
pub(crate) fn rotate_right<V>(mut y: Box<Node<V>>) -> Box<Node<V>> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    // Child first: x's height depends on y's.
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

/// Rotates `x` left; its right child becomes the subtree root.
pub(crate) fn rotate_left<V>(mut x: Box<Node<V>>) -> Box<Node<V>> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}
