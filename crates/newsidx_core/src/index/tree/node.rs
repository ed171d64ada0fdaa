//! Tree node shared by the BST and AVL backends.

/// Owned, optional child pointer.
pub(crate) type Link<V> = Option<Box<Node<V>>>;

/// A single tree node: one key and every value inserted under it.
#[derive(Debug)]
pub(crate) struct Node<V> {
    pub(crate) key: String,
    pub(crate) values: Vec<V>,
    /// Cached subtree height, maintained only by balancing strategies
    /// that track it. Always at least 1.
    pub(crate) height: usize,
    pub(crate) left: Link<V>,
    pub(crate) right: Link<V>,
}

impl<V> Node<V> {
    /// Creates a leaf holding a single value.
    pub(crate) fn leaf(key: &str, value: V) -> Box<Self> {
        Box::new(Self {
            key: key.to_owned(),
            values: vec![value],
            height: 1,
            left: None,
            right: None,
        })
    }

    /// Creates a childless node with an existing value list.
    pub(crate) fn with_values(key: String, values: Vec<V>, height: usize) -> Box<Self> {
        Box::new(Self {
            key,
            values,
            height: height.max(1),
            left: None,
            right: None,
        })
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Recomputes the cached height from the children's cached heights.
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Left height minus right height.
    pub(crate) fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

/// Cached height of a possibly empty subtree.
pub(crate) fn height<V>(link: &Link<V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}
