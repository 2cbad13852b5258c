//! Page loading from storage paths.
//!
//! [`PageLoader`] turns an alias-prefixed storage path into a
//! [`PageContent`]: read the file, split off front matter, cut the body
//! into named segments, resolve the rendering format. Each load is a pure,
//! side-effect-free read of one file, so independent loads can run
//! concurrently.

use std::collections::BTreeMap;
use std::fs;

use serde_json::Value;

use fern_config::{Alias, AliasError, ContentConfig};

use crate::content::{DEFAULT_SEGMENT, Format, PageContent};
use crate::front_matter::{self, FrontMatterError};

/// Error loading one page file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The storage path's alias is not registered.
    #[error("cannot resolve storage path '{path}': {source}")]
    Path {
        /// Alias-prefixed storage path.
        path: String,
        #[source]
        source: AliasError,
    },
    /// The backing file is missing or unreadable.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Alias-prefixed storage path.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The front matter block is malformed.
    #[error("front matter error in '{path}': {source}")]
    FrontMatter {
        /// Alias-prefixed storage path.
        path: String,
        #[source]
        source: FrontMatterError,
    },
    /// Two segments in one file share a name.
    #[error("duplicate segment '{name}' in '{path}'")]
    DuplicateSegment {
        /// Alias-prefixed storage path.
        path: String,
        /// The repeated segment name.
        name: String,
    },
}

impl LoadError {
    /// Storage path of the file the error originates from.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Path { path, .. }
            | Self::Io { path, .. }
            | Self::FrontMatter { path, .. }
            | Self::DuplicateSegment { path, .. } => path,
        }
    }

    /// Line within the file the error originates from, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::FrontMatter { source, .. } => source.line(),
            _ => None,
        }
    }
}

/// Loads page files from alias-prefixed storage paths.
pub struct PageLoader {
    alias: Alias,
    delimiter: String,
}

impl PageLoader {
    /// Create a loader resolving paths through `alias`, using the content
    /// conventions from `content`.
    #[must_use]
    pub fn new(alias: Alias, content: &ContentConfig) -> Self {
        Self {
            alias,
            delimiter: content.delimiter.clone(),
        }
    }

    /// Load the page content behind a storage path.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the path cannot be resolved or read, the
    /// front matter is malformed, or a segment name repeats.
    pub fn load(&self, path: &str) -> Result<PageContent, LoadError> {
        let resolved = self.alias.resolve(path).map_err(|source| LoadError::Path {
            path: path.to_owned(),
            source,
        })?;

        let raw = fs::read_to_string(&resolved).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;

        let (data, body) = front_matter::parse_document(&raw, &self.delimiter).map_err(
            |source| LoadError::FrontMatter {
                path: path.to_owned(),
                source,
            },
        )?;

        let segments = split_segments(body, &self.delimiter, path)?;
        let format = resolve_format(&data, &resolved);

        Ok(PageContent::new(data, segments, format))
    }

    /// Load a page, degrading to an error page instead of failing.
    ///
    /// The failure is logged and wrapped into [`PageContent::error_page`] so
    /// the resolution pipeline can still serve a best-effort response.
    #[must_use]
    pub fn load_or_error_page(&self, path: &str) -> PageContent {
        match self.load(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path, error = %e, "page load failed, serving error page");
                PageContent::error_page(&e)
            }
        }
    }
}

/// Resolve the rendering format from front matter or the file extension.
fn resolve_format(data: &BTreeMap<String, Value>, resolved: &std::path::Path) -> Format {
    if let Some(name) = data.get("format").and_then(Value::as_str) {
        return Format::from_name(name);
    }
    let ext = resolved
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Format::from_name(&ext.to_lowercase())
}

/// Cut a body into named segments on `{delimiter} name {delimiter}` lines.
///
/// Content before the first fence becomes the `default` segment.
fn split_segments(
    body: &str,
    delimiter: &str,
    path: &str,
) -> Result<BTreeMap<String, String>, LoadError> {
    let mut segments = BTreeMap::new();
    let mut current = DEFAULT_SEGMENT.to_owned();
    let mut buffer = String::new();

    for line in body.split_inclusive('\n') {
        if let Some(id) = segment_id(line, delimiter) {
            insert_segment(&mut segments, current, buffer, path)?;
            current = id;
            buffer = String::new();
        } else {
            buffer.push_str(line);
        }
    }
    insert_segment(&mut segments, current, buffer, path)?;

    Ok(segments)
}

fn insert_segment(
    segments: &mut BTreeMap<String, String>,
    name: String,
    text: String,
    path: &str,
) -> Result<(), LoadError> {
    if segments.contains_key(&name) {
        return Err(LoadError::DuplicateSegment {
            path: path.to_owned(),
            name,
        });
    }
    segments.insert(name, text);
    Ok(())
}

/// Segment name of a fence line, or `None` for ordinary body lines.
///
/// A fence is `{delimiter} name {delimiter}` on its own line; the name must
/// be a single whitespace-free token.
fn segment_id(line: &str, delimiter: &str) -> Option<String> {
    let inner = line
        .trim()
        .strip_prefix(delimiter)?
        .strip_suffix(delimiter)?;
    if !inner.starts_with(' ') || !inner.ends_with(' ') {
        return None;
    }
    let id = inner.trim();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    Some(id.to_owned())
}
