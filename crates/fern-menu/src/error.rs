//! Build and matching error types.

use std::path::PathBuf;

/// Error that aborts a collection build.
///
/// A failed build never publishes a partial collection: serving half a tree
/// would silently drop routes.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A root or nested directory could not be read.
    #[error("failed to scan '{}': {source}", path.display())]
    Scan {
        /// Directory or file that failed to stat/read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Two files derived the same route.
    #[error("duplicate route '{route}' derived from '{path}'")]
    DuplicateRoute {
        /// The ambiguous route.
        route: String,
        /// Storage path of the second file claiming the route.
        path: String,
    },
}

/// Typed miss from the URL matcher.
///
/// A result value rather than an unwound error: callers branch on it to
/// serve not-found content without aborting the request.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("no entry found for route '{route}'")]
pub struct NotFoundError {
    /// The normalized route that matched nothing.
    pub route: String,
}
