//! Binary search tree engine shared by the BST and AVL backends.
//!
//! Both backends are the same [`Tree`] type parameterized by a
//! [`Balance`] strategy; search, traversal and introspection are shared.

mod balance;
mod node;

pub use balance::{Avl, Balance, Unbalanced};
pub(crate) use node::{Link, Node};

use crate::index::stats::IndexStats;
use crate::index::traits::{Entry, Index, IndexValue};
use crate::types::BackendKind;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Unbalanced binary search tree index.
pub type BstIndex<V> = Tree<V, Unbalanced>;

/// Self-balancing AVL tree index.
pub type AvlIndex<V> = Tree<V, Avl>;

/// Ordered map from string keys to value lists, stored as a binary tree.
///
/// Reinserting an existing key appends to its value list without
/// de-duplication, so `search` returns every value in insertion order.
///
/// # Example
///
/// ```rust
/// use newsidx_core::{AvlIndex, Index};
///
/// let mut index: AvlIndex<u64> = AvlIndex::new();
/// index.insert("d", 4);
/// index.insert("e", 5);
/// index.insert("f", 6);
///
/// assert_eq!(index.tree_height(), 2);
/// assert_eq!(index.leaf_keys(), vec!["d", "f"]);
/// ```
pub struct Tree<V, B> {
    root: Link<V>,
    len: usize,
    _balance: PhantomData<B>,
}

impl<V, B> Tree<V, B> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            _balance: PhantomData,
        }
    }

    /// Rebuilds a tree from an already linked root.
    pub(crate) fn from_root(root: Link<V>, len: usize) -> Self {
        Self {
            root,
            len,
            _balance: PhantomData,
        }
    }

    pub(crate) fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    /// Finds the node holding `key`.
    fn find(&self, key: &str) -> Option<&Node<V>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Iterates `(key, values)` in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: InOrder::new(self.root.as_deref()),
        }
    }

    /// Counts nodes by walking the tree.
    pub fn count_nodes(&self) -> usize {
        InOrder::new(self.root.as_deref()).count()
    }

    /// Number of nodes on the longest root-to-leaf path.
    ///
    /// An empty tree has height 0 and a single node has height 1.
    pub fn tree_height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node<V>, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        deepest
    }

    /// Keys of childless nodes, in ascending order.
    pub fn leaf_keys(&self) -> Vec<&str> {
        InOrder::new(self.root.as_deref())
            .filter(|node| node.is_leaf())
            .map(|node| node.key.as_str())
            .collect()
    }

    /// Checks the AVL property at every node using measured heights.
    ///
    /// Recursive; intended for balanced trees and tests.
    pub fn is_balanced(&self) -> bool {
        fn measured<V>(link: &Link<V>) -> Option<usize> {
            match link {
                None => Some(0),
                Some(node) => {
                    let left = measured(&node.left)?;
                    let right = measured(&node.right)?;
                    (left.abs_diff(right) <= 1).then_some(1 + left.max(right))
                }
            }
        }
        measured(&self.root).is_some()
    }
}

#[cfg(test)]
impl<V, B: Balance> Tree<V, B> {
    /// Counts nodes whose cached height disagrees with their subtree.
    pub(crate) fn stale_heights(&self) -> usize {
        if !B::TRACKS_HEIGHT {
            return 0;
        }
        fn check<V>(link: &Link<V>, stale: &mut usize) -> usize {
            match link {
                None => 0,
                Some(node) => {
                    let h = 1 + check(&node.left, stale).max(check(&node.right, stale));
                    if h != node.height {
                        *stale += 1;
                    }
                    h
                }
            }
        }
        let mut stale = 0;
        check(&self.root, &mut stale);
        stale
    }
}

impl<V, B> Default for Tree<V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, B> fmt::Debug for Tree<V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, B> Drop for Tree<V, B> {
    fn drop(&mut self) {
        // Unlink iteratively; the default recursive drop overflows on long chains.
        let mut stack: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<V: IndexValue, B: Balance> Index<V> for Tree<V, B> {
    fn kind(&self) -> BackendKind {
        B::KIND
    }

    fn insert(&mut self, key: &str, value: V) {
        if B::insert(&mut self.root, key, value) {
            self.len += 1;
        }
    }

    fn search(&self, key: &str) -> &[V] {
        self.find(key)
            .map(|node| node.values.as_slice())
            .unwrap_or_default()
    }

    fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    fn keys_in_order(&self) -> Vec<&str> {
        self.iter().map(|(key, _)| key).collect()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_, V>> + '_> {
        Box::new(self.iter())
    }

    fn len(&self) -> usize {
        self.len
    }

    fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::new(
            B::KIND,
            self.len,
            self.iter().map(|(_, values)| values.len()).sum(),
        );
        stats.node_count = Some(self.count_nodes());
        stats.height = Some(self.tree_height());
        stats.leaf_count = Some(self.leaf_keys().len());
        stats
    }
}

impl<'a, V, B> IntoIterator for &'a Tree<V, B> {
    type Item = Entry<'a, V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order node walk with an explicit stack.
pub(crate) struct InOrder<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> InOrder<'a, V> {
    fn new(root: Option<&'a Node<V>>) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_left_spine(root);
        walk
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for InOrder<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(node)
    }
}

/// Ascending iterator over a tree's entries.
pub struct Iter<'a, V> {
    nodes: InOrder<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = Entry<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes
            .next()
            .map(|node| (node.key.as_str(), node.values.as_slice()))
    }
}
