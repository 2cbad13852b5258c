//! Alias resolution for storage paths.
//!
//! Menu entries store their backing file as an alias-prefixed path such as
//! `@page/guide/01-setup.md`. [`Alias`] maps each `@alias` token to a
//! physical root directory and resolves those paths back to real locations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Error resolving an alias-prefixed path.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    /// The path starts with an alias token that is not registered.
    #[error("unknown alias in path '{path}'")]
    UnknownAlias {
        /// The path that failed to resolve.
        path: String,
    },
}

/// Map of `@alias` tokens to physical root directories.
///
/// Iteration order is the alias name order (`BTreeMap`), which keeps scans
/// over multiple roots deterministic.
#[derive(Clone, Debug, Default)]
pub struct Alias {
    map: BTreeMap<String, PathBuf>,
}

impl Alias {
    /// Create an empty alias map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an alias.
    pub fn set(&mut self, alias: String, path: PathBuf) {
        debug_assert!(alias.starts_with('@'), "alias must start with '@'");
        self.map.insert(alias, path);
    }

    /// Physical directory registered for `alias`, if any.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&Path> {
        self.map.get(alias).map(PathBuf::as_path)
    }

    /// Iterate over `(alias, root)` pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.map.iter().map(|(a, p)| (a.as_str(), p.as_path()))
    }

    /// Resolve an alias-prefixed path to a physical path.
    ///
    /// `@page/guide.md` becomes `{root}/guide.md`. A path without a leading
    /// `@` token is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::UnknownAlias`] if the path starts with an
    /// unregistered alias.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AliasError> {
        if !path.starts_with('@') {
            return Ok(PathBuf::from(path));
        }

        let (alias, rest) = path.split_once('/').unwrap_or((path, ""));
        let root = self.map.get(alias).ok_or_else(|| AliasError::UnknownAlias {
            path: path.to_owned(),
        })?;

        if rest.is_empty() {
            Ok(root.clone())
        } else {
            Ok(root.join(rest))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_alias() -> Alias {
        let mut alias = Alias::new();
        alias.set("@page".to_owned(), PathBuf::from("site/pages"));
        alias.set("@post".to_owned(), PathBuf::from("site/posts"));
        alias
    }

    #[test]
    fn test_resolve_aliased_path() {
        let alias = make_alias();

        let resolved = alias.resolve("@page/guide/01-setup.md").unwrap();

        assert_eq!(resolved, PathBuf::from("site/pages/guide/01-setup.md"));
    }

    #[test]
    fn test_resolve_bare_alias_returns_root() {
        let alias = make_alias();

        assert_eq!(alias.resolve("@post").unwrap(), PathBuf::from("site/posts"));
    }

    #[test]
    fn test_resolve_plain_path_passes_through() {
        let alias = make_alias();

        let resolved = alias.resolve("docs/readme.md").unwrap();

        assert_eq!(resolved, PathBuf::from("docs/readme.md"));
    }

    #[test]
    fn test_resolve_unknown_alias_errors() {
        let alias = make_alias();

        let err = alias.resolve("@media/logo.png").unwrap_err();

        assert!(matches!(err, AliasError::UnknownAlias { .. }));
    }

    #[test]
    fn test_iter_is_ordered_by_alias() {
        let alias = make_alias();

        let names: Vec<_> = alias.iter().map(|(a, _)| a).collect();

        assert_eq!(names, vec!["@page", "@post"]);
    }
}
