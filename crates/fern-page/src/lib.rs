//! Page content parsing for the fern content engine.
//!
//! A page file is a front matter block followed by one or more named body
//! segments:
//!
//! ```text
//! ---
//! title: About
//! ---
//! Intro text, becomes the segment named `default`.
//!
//! --- sidebar ---
//! Sidebar text.
//! ```
//!
//! This crate provides:
//! - [`front_matter`]: splitting and parsing the leading YAML block
//! - [`PageContent`]: the immutable result of loading one page file
//! - [`PageLoader`]: reads an alias-prefixed storage path and assembles a
//!   [`PageContent`], degrading to an error page instead of failing the
//!   resolution pipeline
//!
//! Loading is a pure transform from bytes to structured segments: no
//! template rendering, no HTML escaping.

pub mod front_matter;

mod content;
mod loader;

pub use content::{DEFAULT_SEGMENT, ErrorInfo, Format, PageContent};
pub use front_matter::FrontMatterError;
pub use loader::{LoadError, PageLoader};
