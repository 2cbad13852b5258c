//! Menu entry: one content item's metadata record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata record for one content item.
///
/// Built by the scanners, immutable once part of a collection. The typed
/// fields hold resolved values (filename conventions plus front matter
/// overrides); the full front matter stays queryable through `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Alias-prefixed storage path of the backing file
    /// (e.g. `@page/guide/01-setup.md`). Unique within a collection.
    pub path: String,
    /// Logical route (e.g. `guide/setup`, `""` for the site root).
    /// Unique within a collection.
    pub route: String,
    /// Display title (front matter override or humanized filename stem).
    pub title: String,
    /// Sort key: numeric filename prefix, front matter override, or the
    /// entry's position in the lexically-sorted scan.
    #[serde(default)]
    pub order: i64,
    /// ISO date (`YYYY-MM-DD`), from the filename for posts or front
    /// matter otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// True when the backing file is a directory index file.
    #[serde(default)]
    pub is_index: bool,
    /// Full front matter mapping; arbitrary keys stay queryable here.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl MenuEntry {
    /// Route of the parent entry, or `None` for the site root.
    ///
    /// Top-level entries report the empty (root) route as their parent.
    #[must_use]
    pub fn parent_route(&self) -> Option<&str> {
        if self.route.is_empty() {
            return None;
        }
        Some(self.route.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    /// Whether the entry is flagged `hidden: true` in front matter.
    ///
    /// Hidden entries stay routable; navigation consumers skip them.
    #[must_use]
    pub fn hidden(&self) -> bool {
        matches!(self.data.get("hidden"), Some(Value::Bool(true)))
    }

    /// String value of an arbitrary front matter key.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
pub(crate) fn make_entry(route: &str, order: i64) -> MenuEntry {
    MenuEntry {
        path: format!("@page/{route}.md"),
        route: route.to_owned(),
        title: route.to_owned(),
        order,
        date: None,
        is_index: false,
        data: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_route_nested() {
        let entry = make_entry("guide/setup/linux", 0);

        assert_eq!(entry.parent_route(), Some("guide/setup"));
    }

    #[test]
    fn test_parent_route_top_level_is_root() {
        let entry = make_entry("guide", 0);

        assert_eq!(entry.parent_route(), Some(""));
    }

    #[test]
    fn test_parent_route_of_root_is_none() {
        let entry = make_entry("", 0);

        assert_eq!(entry.parent_route(), None);
    }

    #[test]
    fn test_hidden_flag() {
        let mut entry = make_entry("drafts", 0);
        assert!(!entry.hidden());

        entry
            .data
            .insert("hidden".to_owned(), serde_json::json!(true));
        assert!(entry.hidden());

        // Non-boolean values do not hide the entry
        entry
            .data
            .insert("hidden".to_owned(), serde_json::json!("yes"));
        assert!(!entry.hidden());
    }

    #[test]
    fn test_data_str() {
        let mut entry = make_entry("about", 0);
        entry
            .data
            .insert("author".to_owned(), serde_json::json!("jo"));
        entry.data.insert("count".to_owned(), serde_json::json!(3));

        assert_eq!(entry.data_str("author"), Some("jo"));
        assert_eq!(entry.data_str("count"), None);
        assert_eq!(entry.data_str("missing"), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut entry = make_entry("guide", 2);
        entry.date = Some("2024-03-15".to_owned());
        entry
            .data
            .insert("tags".to_owned(), serde_json::json!(["a", "b"]));

        let json = serde_json::to_string(&entry).unwrap();
        let restored: MenuEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, entry);
    }
}
