//! Loaded page content.
//!
//! [`PageContent`] is the immutable result of loading one page file: the
//! front matter mapping, the named body segments, and the rendering format.
//! Load failures are represented as degraded content via
//! [`PageContent::error_page`] so the resolution pipeline never crashes on a
//! broken file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::loader::LoadError;

/// Segment every page content carries, holding the body text before the
/// first segment fence.
pub const DEFAULT_SEGMENT: &str = "default";

/// Rendering format of a page body.
///
/// Resolved from the explicit front matter `format` field when present,
/// else from the file extension. The mapping is total: anything unknown is
/// [`Format::Raw`], never an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Markdown source (`md`, `markdown`).
    Markdown,
    /// Textile source (`textile`).
    Textile,
    /// Anything else; passed through untouched.
    #[default]
    Raw,
}

impl Format {
    /// Resolve a format name or file extension.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "md" | "markdown" => Self::Markdown,
            "textile" => Self::Textile,
            _ => Self::Raw,
        }
    }

    /// Canonical name of the format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Textile => "textile",
            Self::Raw => "raw",
        }
    }
}

/// Diagnostic payload of a degraded page content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable failure description.
    pub message: String,
    /// Status semantics for the surrounding layer (404 not found, 500 load
    /// failure).
    pub code: u16,
    /// Storage path of the file that failed to load, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line within the file, when the failure has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Immutable result of loading one page file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    data: BTreeMap<String, Value>,
    segments: BTreeMap<String, String>,
    format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

impl PageContent {
    /// Create page content from parsed parts.
    ///
    /// The `default` segment is added (empty) when missing, so every content
    /// value satisfies the at-least-one-segment invariant.
    #[must_use]
    pub fn new(
        data: BTreeMap<String, Value>,
        mut segments: BTreeMap<String, String>,
        format: Format,
    ) -> Self {
        segments
            .entry(DEFAULT_SEGMENT.to_owned())
            .or_insert_with(String::new);
        Self {
            data,
            segments,
            format,
            error: None,
        }
    }

    /// Degraded content standing in for a page that failed to load.
    ///
    /// Carries the failure diagnostics and the `error` layout marker; the
    /// surrounding layer decides how to render it.
    #[must_use]
    pub fn error_page(error: &LoadError) -> Self {
        let message = error.to_string();
        let info = ErrorInfo {
            message: message.clone(),
            code: 500,
            file: Some(error.path().to_owned()),
            line: error.line(),
        };
        Self::degraded(info, message)
    }

    /// Degraded content standing in for a route that matched nothing.
    #[must_use]
    pub fn not_found(route: &str) -> Self {
        let message = format!("no entry found for route '{route}'");
        let info = ErrorInfo {
            message: message.clone(),
            code: 404,
            file: None,
            line: None,
        };
        Self::degraded(info, message)
    }

    fn degraded(info: ErrorInfo, message: String) -> Self {
        Self {
            data: BTreeMap::new(),
            segments: BTreeMap::from([(DEFAULT_SEGMENT.to_owned(), message)]),
            format: Format::Raw,
            error: Some(info),
        }
    }

    /// Front matter mapping.
    #[must_use]
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// All named segments.
    #[must_use]
    pub fn segments(&self) -> &BTreeMap<String, String> {
        &self.segments
    }

    /// Raw text of one segment.
    #[must_use]
    pub fn segment(&self, id: &str) -> Option<&str> {
        self.segments.get(id).map(String::as_str)
    }

    /// Raw text of the `default` segment.
    #[must_use]
    pub fn default_segment(&self) -> &str {
        self.segment(DEFAULT_SEGMENT).unwrap_or("")
    }

    /// Rendering format of the body segments.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Front matter `title`, if present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(Value::as_str)
    }

    /// Layout the surrounding layer should render with.
    ///
    /// Degraded content always reports the `error` layout; otherwise the
    /// front matter `layout` field applies, falling back to `default`.
    #[must_use]
    pub fn layout(&self) -> &str {
        if self.error.is_some() {
            return "error";
        }
        self.data
            .get("layout")
            .and_then(Value::as_str)
            .unwrap_or("default")
    }

    /// Failure diagnostics for degraded content.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Status semantics: 200 for ordinary content, the error code otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.error.as_ref().map_or(200, |e| e.code)
    }
}
