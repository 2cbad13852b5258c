//! Hierarchical tree over a flat entry collection.
//!
//! Routes are slash-separated, so the tree is a trie keyed on route
//! segments. An entry whose ancestors have no entry of their own (a route
//! `a/b/c` without an `a/b` entry) gets synthetic structural nodes: route
//! and children only, no payload. The tree borrows the collection it was
//! built from and never mutates it.

use crate::collection::EntryCollection;
use crate::entry::MenuEntry;
use crate::iter::{Dfs, TreeCursor};

/// One tree node: an optional entry payload plus ordered children.
#[derive(Debug)]
pub struct TreeNode<'a> {
    route: String,
    entry: Option<&'a MenuEntry>,
    children: Vec<TreeNode<'a>>,
}

impl<'a> TreeNode<'a> {
    /// Full route of this node.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Final route segment of this node.
    #[must_use]
    pub fn segment(&self) -> &str {
        self.route.rsplit('/').next().unwrap_or(&self.route)
    }

    /// Entry payload; `None` for synthetic structural nodes.
    #[must_use]
    pub fn entry(&self) -> Option<&'a MenuEntry> {
        self.entry
    }

    /// Ordered child nodes.
    #[must_use]
    pub fn children(&self) -> &[TreeNode<'a>] {
        &self.children
    }

    /// Whether the node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Cursor over this node's children.
    #[must_use]
    pub fn cursor(&self) -> TreeCursor<'_, 'a> {
        TreeCursor::new(&self.children)
    }

    /// Sort key: the flat collection's `(order, route)` ordering, with
    /// synthetic nodes after all entries.
    fn order_key(&self) -> (i64, &str) {
        (self.entry.map_or(i64::MAX, |e| e.order), &self.route)
    }
}

/// Tree of menu entries grouped by route segments.
#[derive(Debug)]
pub struct Tree<'a> {
    root: TreeNode<'a>,
}

impl<'a> Tree<'a> {
    /// Build a tree from a collection.
    ///
    /// The result is deterministic: building twice from the same
    /// collection yields structurally identical trees.
    #[must_use]
    pub fn build(collection: &'a EntryCollection) -> Self {
        let mut root = TreeNode {
            route: String::new(),
            entry: None,
            children: Vec::new(),
        };

        for entry in collection.iter() {
            if entry.route.is_empty() {
                root.entry = Some(entry);
            } else {
                insert(&mut root, entry);
            }
        }

        sort_children(&mut root);
        Self { root }
    }

    /// Root node; synthetic unless the collection has a root-route entry.
    #[must_use]
    pub fn root(&self) -> &TreeNode<'a> {
        &self.root
    }

    /// Node with the exact route, if any.
    #[must_use]
    pub fn find(&self, route: &str) -> Option<&TreeNode<'a>> {
        if route.is_empty() {
            return Some(&self.root);
        }
        let mut node = &self.root;
        for segment in route.split('/') {
            node = node.children.iter().find(|c| c.segment() == segment)?;
        }
        Some(node)
    }

    /// Depth-first pre-order traversal over all nodes, root first.
    #[must_use]
    pub fn walk(&self) -> Dfs<'_, 'a> {
        Dfs::new(&self.root)
    }
}

fn insert<'a>(root: &mut TreeNode<'a>, entry: &'a MenuEntry) {
    let mut node = root;
    let mut prefix = String::new();

    for segment in entry.route.split('/') {
        if prefix.is_empty() {
            prefix.push_str(segment);
        } else {
            prefix.push('/');
            prefix.push_str(segment);
        }
        let idx = match node.children.iter().position(|c| c.route == prefix) {
            Some(i) => i,
            None => {
                node.children.push(TreeNode {
                    route: prefix.clone(),
                    entry: None,
                    children: Vec::new(),
                });
                node.children.len() - 1
            }
        };
        node = &mut node.children[idx];
    }

    node.entry = Some(entry);
}

fn sort_children(node: &mut TreeNode<'_>) {
    node.children.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    for child in &mut node.children {
        sort_children(child);
    }
}
