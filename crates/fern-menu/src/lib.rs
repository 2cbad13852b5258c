//! Content tree and route resolution for the fern content engine.
//!
//! This crate provides:
//! - [`Builder`] / [`PostBuilder`]: scan content roots into ordered
//!   [`EntryCollection`]s, optionally through a [`CacheStore`](fern_cache::CacheStore)
//! - [`Tree`]: hierarchical view over a collection, with [`TreeCursor`]
//!   and depth-first traversal
//! - [`RootPath`]: breadcrumb chain from the root to a resolved entry
//! - [`UrlMatcher`]: deterministic route-to-entry resolution
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fern_config::Config;
//! use fern_menu::{Builder, PostBuilder, RootPath, Tree, UrlMatcher};
//!
//! let config = Config::default();
//! let pages = Builder::new(&config).build()?;
//! let posts = PostBuilder::new(&config).build()?;
//!
//! let matcher = UrlMatcher::new(&pages, &posts, &config);
//! let entry = matcher.match_route("/guide/setup")?;
//!
//! let tree = Tree::build(&pages);
//! let breadcrumb = RootPath::resolve(&tree, &entry.route);
//! # Ok(())
//! # }
//! ```

mod builder;
mod collection;
mod entry;
mod error;
mod iter;
mod matcher;
mod posts;
mod root_path;
mod tree;

pub use builder::Builder;
pub use collection::{EntryCollection, EntryError};
pub use entry::MenuEntry;
pub use error::{BuildError, NotFoundError};
pub use iter::{Dfs, TreeCursor};
pub use matcher::UrlMatcher;
pub use posts::PostBuilder;
pub use root_path::RootPath;
pub use tree::{Tree, TreeNode};
