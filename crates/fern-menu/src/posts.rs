//! Post collection building.
//!
//! Posts are a second, chronologically ordered entry store. Filenames
//! carry a date prefix (`2024-03-15-launch.md`); the date becomes the
//! entry's `date` and the full stem stays in the route under the
//! configured blog route, so `blog/2024-03-15-launch` is the canonical
//! route. The URL matcher additionally resolves the date-stripped form
//! (`blog/launch`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use fern_cache::CacheStore;
use fern_config::Config;

use crate::builder::{FileRecord, humanize, read_entry_data, scan_root};
use crate::collection::EntryCollection;
use crate::entry::MenuEntry;
use crate::error::BuildError;

/// Pattern of a date-prefixed post filename stem.
pub(crate) const DATE_PREFIX: &str = r"^([0-9]{4}-[0-9]{2}-[0-9]{2})[-_](.+)$";

/// Builds the post [`EntryCollection`] from the configured posts root.
pub struct PostBuilder {
    alias: String,
    path: PathBuf,
    blog_route: String,
    extensions: Vec<String>,
    delimiter: String,
    date_regex: Regex,
    cache_lock: Mutex<()>,
}

impl PostBuilder {
    /// Create a builder for the posts root in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            alias: config.posts.alias.clone(),
            path: config.posts.path.clone(),
            blog_route: config.posts.blog_route.clone(),
            extensions: config.posts.extensions.clone(),
            delimiter: config.content.delimiter.clone(),
            date_regex: Regex::new(DATE_PREFIX).unwrap(),
            cache_lock: Mutex::new(()),
        }
    }

    /// Scan the posts directory and build a fresh collection.
    ///
    /// Entries are ordered date-descending (undated posts last), then by
    /// route.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Scan`] when the posts directory is
    /// unreadable and [`BuildError::DuplicateRoute`] on route collisions.
    pub fn build(&self) -> Result<EntryCollection, BuildError> {
        let records = self.scan()?;
        let fingerprint = self.fingerprint_of(&records);
        self.build_from(&records, fingerprint)
    }

    /// Build through the cache store, mirroring
    /// [`Builder::build_cached`](crate::Builder::build_cached) semantics:
    /// fingerprint validation on rehydration, single-flight rebuilds, and
    /// the same coarse-mtime consistency window.
    ///
    /// # Errors
    ///
    /// Same as [`PostBuilder::build`]; cache failures degrade to a fresh
    /// build.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn build_cached(&self, cache: &dyn CacheStore) -> Result<EntryCollection, BuildError> {
        let _guard = self.cache_lock.lock().unwrap();

        let records = self.scan()?;
        let fingerprint = self.fingerprint_of(&records);
        let key = format!("posts:{}", self.alias);

        if let Some(bytes) = cache.get(&key) {
            if let Some(collection) = EntryCollection::from_snapshot(&bytes, &fingerprint) {
                tracing::debug!(%key, "post collection cache hit");
                return Ok(collection);
            }
            tracing::debug!(%key, "post collection cache stale, rebuilding");
        }

        let collection = self.build_from(&records, fingerprint)?;
        match collection.to_snapshot() {
            Ok(bytes) => cache.set(&key, &bytes),
            Err(e) => tracing::debug!(error = %e, "failed to serialize post collection"),
        }
        Ok(collection)
    }

    fn scan(&self) -> Result<Vec<FileRecord>, BuildError> {
        scan_root(&self.alias, &self.path, &self.extensions, false)
    }

    fn build_from(
        &self,
        records: &[FileRecord],
        fingerprint: String,
    ) -> Result<EntryCollection, BuildError> {
        let mut entries: Vec<MenuEntry> = Vec::with_capacity(records.len());
        let mut errors = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let data = match read_entry_data(record, &self.delimiter) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(path = %e.path, error = %e.message, "skipping post entry");
                    errors.push(e);
                    continue;
                }
            };

            let stem = record
                .rel
                .rsplit_once('.')
                .map_or(record.rel.as_str(), |(stem, _ext)| stem);
            let (file_date, slug) = match self.date_regex.captures(stem) {
                Some(caps) => (
                    caps.get(1).map(|m| m.as_str().to_owned()),
                    caps.get(2).map_or(stem, |m| m.as_str()),
                ),
                None => (None, stem),
            };

            let route = if self.blog_route.is_empty() {
                stem.to_owned()
            } else {
                format!("{}/{stem}", self.blog_route)
            };
            if seen
                .insert(route.clone(), record.alias_path.clone())
                .is_some()
            {
                return Err(BuildError::DuplicateRoute {
                    route,
                    path: record.alias_path.clone(),
                });
            }

            let title = data
                .get("title")
                .and_then(Value::as_str)
                .map_or_else(|| humanize(slug), str::to_owned);
            let date = file_date
                .or_else(|| data.get("date").and_then(Value::as_str).map(str::to_owned));

            entries.push(MenuEntry {
                path: record.alias_path.clone(),
                route,
                title,
                order: i64::try_from(position).unwrap_or(i64::MAX),
                date,
                is_index: false,
                data,
            });
        }

        // Newest first; undated posts sort last
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.route.cmp(&b.route)));
        Ok(EntryCollection::new(entries, errors, fingerprint))
    }

    fn fingerprint_of(&self, records: &[FileRecord]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.alias.as_bytes());
        hasher.update([0]);
        hasher.update(self.path.to_string_lossy().as_bytes());
        hasher.update([0]);
        for ext in &self.extensions {
            hasher.update(ext.as_bytes());
            hasher.update([0]);
        }
        hasher.update(self.blog_route.as_bytes());
        hasher.update([0]);
        hasher.update(u64::try_from(records.len()).unwrap_or(u64::MAX).to_le_bytes());
        let max_mtime = records.iter().map(|r| r.mtime).max().unwrap_or(0);
        hasher.update(max_mtime.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use fern_cache::FileCache;

    use super::*;

    fn make_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.posts.path = root.to_path_buf();
        config
    }

    fn write_post(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_date_prefix_extracted() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "2024-03-15-launch.md", "We launched\n");

        let collection = PostBuilder::new(&make_config(tmp.path())).build().unwrap();

        let entry = collection.get("blog/2024-03-15-launch").unwrap();
        assert_eq!(entry.date.as_deref(), Some("2024-03-15"));
        assert_eq!(entry.title, "Launch");
        assert_eq!(entry.path, "@post/2024-03-15-launch.md");
    }

    #[test]
    fn test_posts_sorted_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "2023-01-01-old.md", "Old\n");
        write_post(tmp.path(), "2024-06-01-new.md", "New\n");
        write_post(tmp.path(), "undated.md", "Undated\n");

        let collection = PostBuilder::new(&make_config(tmp.path())).build().unwrap();

        let routes: Vec<_> = collection.routes().collect();
        assert_eq!(
            routes,
            vec!["blog/2024-06-01-new", "blog/2023-01-01-old", "blog/undated"]
        );
    }

    #[test]
    fn test_undated_post_takes_front_matter_date() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "notes.md", "---\ndate: 2022-12-24\n---\nNotes\n");

        let collection = PostBuilder::new(&make_config(tmp.path())).build().unwrap();

        let entry = collection.get("blog/notes").unwrap();
        assert_eq!(entry.date.as_deref(), Some("2022-12-24"));
    }

    #[test]
    fn test_custom_blog_route() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "2024-01-01-hello.md", "Hi\n");

        let mut config = make_config(tmp.path());
        config.posts.blog_route = "news".to_owned();
        let collection = PostBuilder::new(&config).build().unwrap();

        assert!(collection.get("news/2024-01-01-hello").is_some());
    }

    #[test]
    fn test_missing_posts_dir_aborts_build() {
        let config = make_config(Path::new("/nonexistent/fern-posts"));

        let err = PostBuilder::new(&config).build().unwrap_err();

        assert!(matches!(err, BuildError::Scan { .. }));
    }

    #[test]
    fn test_malformed_front_matter_is_recovered() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "2024-01-01-bad.md", "---\nx: [oops\n---\n");
        write_post(tmp.path(), "2024-01-02-good.md", "Fine\n");

        let collection = PostBuilder::new(&make_config(tmp.path())).build().unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.errors().len(), 1);
    }

    #[test]
    fn test_nested_directories_are_not_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        write_post(tmp.path(), "2024-01-01-top.md", "Top\n");
        let nested = tmp.path().join("archive");
        fs::create_dir(&nested).unwrap();
        write_post(&nested, "2020-01-01-deep.md", "Deep\n");

        let collection = PostBuilder::new(&make_config(tmp.path())).build().unwrap();

        assert_eq!(collection.len(), 1);
        assert!(collection.get("blog/2024-01-01-top").is_some());
    }

    #[test]
    fn test_build_cached_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let posts = tmp.path().join("posts");
        fs::create_dir(&posts).unwrap();
        write_post(&posts, "2024-03-15-launch.md", "We launched\n");

        let builder = PostBuilder::new(&make_config(&posts));
        let cache = FileCache::new(tmp.path().join("cache"));

        let first = builder.build_cached(&cache).unwrap();
        let second = builder.build_cached(&cache).unwrap();
        let fresh = builder.build().unwrap();

        assert_eq!(second, first);
        assert_eq!(second, fresh);
    }
}
