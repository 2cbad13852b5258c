//! Root path (breadcrumb) resolution.

use crate::entry::MenuEntry;
use crate::tree::Tree;

/// Ordered ancestor chain from the site root to a resolved entry.
///
/// Recomputed per request. When the target route does not exist, the
/// chain covers the longest existing prefix instead — a short breadcrumb
/// is display-only degradation, never an error.
#[derive(Debug)]
pub struct RootPath<'a> {
    entries: Vec<&'a MenuEntry>,
}

impl<'a> RootPath<'a> {
    /// Walk the tree from its root toward `route`, collecting every
    /// entry-bearing node along the way.
    ///
    /// Synthetic structural nodes are skipped; the walk stops at the
    /// first segment that has no matching child.
    #[must_use]
    pub fn resolve(tree: &Tree<'a>, route: &str) -> Self {
        let mut entries = Vec::new();
        let mut node = tree.root();
        if let Some(entry) = node.entry() {
            entries.push(entry);
        }

        if !route.is_empty() {
            for segment in route.split('/') {
                let Some(next) = node.children().iter().find(|c| c.segment() == segment)
                else {
                    break;
                };
                node = next;
                if let Some(entry) = node.entry() {
                    entries.push(entry);
                }
            }
        }

        Self { entries }
    }

    /// Entries in root-to-target order.
    #[must_use]
    pub fn entries(&self) -> &[&'a MenuEntry] {
        &self.entries
    }

    /// Iterate entries in root-to-target order.
    pub fn iter(&self) -> impl Iterator<Item = &'a MenuEntry> {
        self.entries.iter().copied()
    }

    /// Number of entries in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'p, 'a> IntoIterator for &'p RootPath<'a> {
    type Item = &'a MenuEntry;
    type IntoIter = std::vec::IntoIter<&'a MenuEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.clone().into_iter()
    }
}
