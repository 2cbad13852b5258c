//! File-backed cache store.
//!
//! [`FileCache`] keeps one file per key under a root directory. Keys are
//! arbitrary strings (they commonly contain `:` and alias tokens), so each
//! key is hashed to a fixed-width hex filename rather than mapped onto a
//! directory structure.

use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::CacheStore;

/// File-backed [`CacheStore`] rooted at a directory on disk.
///
/// The directory is created lazily on the first `set`. Read and write
/// failures are logged at debug level and otherwise ignored.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a file-backed cache rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path of the file backing `key`.
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(hex::encode(digest))
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        if let Err(e) = fs::create_dir_all(&self.root) {
            tracing::debug!(error = %e, "failed to create cache directory");
            return;
        }
        if let Err(e) = fs::write(self.entry_path(key), value) {
            tracing::debug!(error = %e, key, "failed to write cache entry");
        }
    }
}
