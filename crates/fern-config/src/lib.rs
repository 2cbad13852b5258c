//! Configuration value objects for the fern content engine.
//!
//! The engine core never reads configuration files itself. Hosts construct a
//! [`Config`] directly (or deserialize one from TOML with serde) and pass it
//! to the builders and loaders that need it.
//!
//! Storage paths inside the engine are *aliased*: they start with an `@alias`
//! token (e.g. `@page/01-about.md`) that [`Alias`] resolves to a physical
//! directory. This keeps menu entries portable across machines and lets a
//! site pull pages from more than one root directory.

mod alias;

pub use alias::{Alias, AliasError};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the content engine core.
///
/// All sections have defaults, so `Config::default()` yields a working
/// configuration rooted at `site/pages` and `site/posts`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page scanning configuration.
    pub pages: PagesConfig,
    /// Post scanning configuration.
    pub posts: PostsConfig,
    /// Content file format conventions.
    pub content: ContentConfig,
    /// Route the empty incoming route resolves to.
    ///
    /// The root index file derives the empty route, so the default empty
    /// string points the site root at that entry. Hosts can redirect the
    /// root to any other route (e.g. `"blog"`).
    pub home_route: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages: PagesConfig::default(),
            posts: PostsConfig::default(),
            content: ContentConfig::default(),
            home_route: String::new(),
        }
    }
}

impl Config {
    /// Build the alias map covering all configured roots.
    #[must_use]
    pub fn alias(&self) -> Alias {
        let mut alias = Alias::new();
        for (name, path) in &self.pages.paths {
            alias.set(name.clone(), path.clone());
        }
        alias.set(self.posts.alias.clone(), self.posts.path.clone());
        alias
    }
}

/// Page scanning configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Root directories to scan, keyed by alias (e.g. `@page`).
    ///
    /// Every scanned entry's storage path keeps its alias prefix.
    pub paths: BTreeMap<String, PathBuf>,
    /// Recognized file extensions (without leading dot).
    pub extensions: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            paths: BTreeMap::from([("@page".to_owned(), PathBuf::from("site/pages"))]),
            extensions: default_extensions(),
        }
    }
}

/// Post scanning configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Alias registered for the posts root.
    pub alias: String,
    /// Directory containing post files.
    pub path: PathBuf,
    /// Route prefix post routes are published under.
    pub blog_route: String,
    /// Recognized file extensions (without leading dot).
    pub extensions: Vec<String>,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            alias: "@post".to_owned(),
            path: PathBuf::from("site/posts"),
            blog_route: "blog".to_owned(),
            extensions: default_extensions(),
        }
    }
}

/// Content file format conventions.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Filename stem that marks a directory index file.
    ///
    /// An index file collapses its own route segment, so `guide/index.md`
    /// maps to the route `guide`.
    pub index: String,
    /// Delimiter token for front matter fences and segment separators.
    ///
    /// A file starts with an optional front matter block between two
    /// delimiter lines; `{delimiter} name {delimiter}` lines inside the
    /// body start a named segment.
    pub delimiter: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            index: "index".to_owned(),
            delimiter: "---".to_owned(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned(), "markdown".to_owned(), "textile".to_owned()]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(
            config.pages.paths.get("@page"),
            Some(&PathBuf::from("site/pages"))
        );
        assert_eq!(config.posts.alias, "@post");
        assert_eq!(config.posts.blog_route, "blog");
        assert_eq!(config.content.index, "index");
        assert_eq!(config.content.delimiter, "---");
        assert_eq!(config.home_route, "");
    }

    #[test]
    fn test_alias_covers_pages_and_posts() {
        let config = Config::default();
        let alias = config.alias();

        assert_eq!(alias.get("@page"), Some(PathBuf::from("site/pages")).as_deref());
        assert_eq!(alias.get("@post"), Some(PathBuf::from("site/posts")).as_deref());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
home_route = "welcome"

[pages]
extensions = ["md"]

[pages.paths]
"@page" = "content/pages"
"@extra" = "content/extra"

[posts]
path = "content/posts"
blog_route = "news"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.home_route, "welcome");
        assert_eq!(config.pages.paths.len(), 2);
        assert_eq!(
            config.pages.paths.get("@extra"),
            Some(&PathBuf::from("content/extra"))
        );
        assert_eq!(config.pages.extensions, vec!["md".to_owned()]);
        assert_eq!(config.posts.blog_route, "news");
        // Unspecified sections keep their defaults
        assert_eq!(config.posts.alias, "@post");
        assert_eq!(config.content.index, "index");
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.pages.paths.len(), 1);
        assert_eq!(config.posts.blog_route, "blog");
    }
}
