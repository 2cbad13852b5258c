//! Ordered, lookup-capable collection of menu entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entry::MenuEntry;

/// Recovered per-entry scan failure.
///
/// The offending file is excluded from the route index; the rest of the
/// scan continues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    /// Alias-prefixed storage path of the offending file.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

/// Cache snapshot of a collection.
///
/// The fingerprint rides inside the payload, so the cache store stays an
/// opaque byte store and validation happens on rehydration.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    fingerprint: String,
    entries: Vec<MenuEntry>,
    #[serde(default)]
    errors: Vec<EntryError>,
}

/// Ordered sequence of menu entries with O(1) route lookup.
///
/// Entries keep scan order stable-sorted by `(order, route)` (posts use
/// their own chronological sort). The collection is the single writer of
/// its entries: downstream components (tree, matcher, root path) borrow.
#[derive(Debug)]
pub struct EntryCollection {
    entries: Vec<MenuEntry>,
    errors: Vec<EntryError>,
    fingerprint: String,
    route_index: HashMap<String, usize>,
}

impl EntryCollection {
    /// Assemble a collection from already-sorted entries.
    ///
    /// Callers guarantee route uniqueness (the builders abort on
    /// duplicates before constructing a collection).
    pub(crate) fn new(
        entries: Vec<MenuEntry>,
        errors: Vec<EntryError>,
        fingerprint: String,
    ) -> Self {
        let route_index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.route.clone(), i))
            .collect();
        Self {
            entries,
            errors,
            fingerprint,
            route_index,
        }
    }

    /// Entry with the exact route, if any.
    #[must_use]
    pub fn get(&self, route: &str) -> Option<&MenuEntry> {
        self.route_index.get(route).map(|&i| &self.entries[i])
    }

    /// All entries in collection order.
    #[must_use]
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Iterate entries in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries.iter()
    }

    /// Routes in collection order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.route.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-entry errors recovered during the scan.
    #[must_use]
    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// Fingerprint of the filesystem state this collection was built from.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Serialize for the cache store.
    pub(crate) fn to_snapshot(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&Snapshot {
            fingerprint: self.fingerprint.clone(),
            entries: self.entries.clone(),
            errors: self.errors.clone(),
        })
    }

    /// Rehydrate a cached snapshot, rejecting fingerprint mismatches.
    ///
    /// Returns `None` for unparseable payloads (treated as a cache miss)
    /// and for snapshots built from a different filesystem state.
    pub(crate) fn from_snapshot(bytes: &[u8], expected_fingerprint: &str) -> Option<Self> {
        let snapshot: Snapshot = match serde_json::from_slice(bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "discarding unparseable collection snapshot");
                return None;
            }
        };
        if snapshot.fingerprint != expected_fingerprint {
            return None;
        }
        Some(Self::new(
            snapshot.entries,
            snapshot.errors,
            snapshot.fingerprint,
        ))
    }
}

impl PartialEq for EntryCollection {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
            && self.errors == other.errors
            && self.fingerprint == other.fingerprint
    }
}
