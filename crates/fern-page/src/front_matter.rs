//! Front matter splitting and parsing.
//!
//! A front matter block is a YAML mapping between two delimiter lines at the
//! very top of a file. Absence of the block is not an error — the file is
//! then pure body. Parsed values are kept as [`serde_json::Value`] so
//! arbitrary keys stay queryable without widening the typed surface.

use std::collections::BTreeMap;

use serde_json::Value;

/// Error produced while splitting or parsing a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// An opening delimiter line was never closed.
    #[error("unterminated front matter block")]
    Unterminated,
    /// The block is not a valid YAML mapping.
    #[error("invalid front matter: {message}")]
    Invalid {
        /// Parser message, including position when available.
        message: String,
        /// Line of the failure within the block, when the parser knows it.
        line: Option<usize>,
    },
}

impl FrontMatterError {
    /// Line of the failure within the front matter block, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Unterminated => None,
            Self::Invalid { line, .. } => *line,
        }
    }
}

/// Split a leading front matter block from the body.
///
/// Returns `(block, body)` where `block` is the raw YAML between the
/// delimiter lines, or `None` when the file does not start with a delimiter
/// line.
///
/// # Errors
///
/// Returns [`FrontMatterError::Unterminated`] when an opening delimiter is
/// never closed.
pub fn split<'c>(
    content: &'c str,
    delimiter: &str,
) -> Result<(Option<&'c str>, &'c str), FrontMatterError> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((None, content));
    };
    if first.trim_end() != delimiter {
        return Ok((None, content));
    }

    let block_start = first.len();
    let mut pos = block_start;
    for line in lines {
        if line.trim_end() == delimiter {
            let block = &content[block_start..pos];
            let body = &content[pos + line.len()..];
            return Ok((Some(block), body));
        }
        pos += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

/// Parse a front matter block into a key/value mapping.
///
/// Empty or whitespace-only content yields an empty mapping.
///
/// # Errors
///
/// Returns [`FrontMatterError::Invalid`] when the content is not a YAML
/// mapping.
pub fn parse(block: &str) -> Result<BTreeMap<String, Value>, FrontMatterError> {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_yaml::from_str(trimmed).map_err(|e| FrontMatterError::Invalid {
        message: e.to_string(),
        line: e.location().map(|l| l.line()),
    })
}

/// Split and parse in one step, returning `(data, body)`.
///
/// # Errors
///
/// Propagates errors from [`split`] and [`parse`].
pub fn parse_document<'c>(
    content: &'c str,
    delimiter: &str,
) -> Result<(BTreeMap<String, Value>, &'c str), FrontMatterError> {
    let (block, body) = split(content, delimiter)?;
    let data = match block {
        Some(block) => parse(block)?,
        None => BTreeMap::new(),
    };
    Ok((data, body))
}
