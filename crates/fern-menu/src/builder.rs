//! Menu entry building from filesystem scans.
//!
//! The scan and build phases are separate: [`scan_root`] walks a root
//! directory and returns lightweight file records (no content is read),
//! then [`Builder`] turns records into [`MenuEntry`] values by applying
//! filename conventions and front matter overrides.
//!
//! Route derivation, per path segment:
//! - strip the file extension
//! - strip a leading numeric order prefix (`01-about.md` -> `about`,
//!   order 1)
//! - collapse the configured index stem (`guide/index.md` -> `guide`,
//!   the root index file -> the empty route)

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

use fern_cache::CacheStore;
use fern_config::Config;
use fern_page::front_matter;

use crate::collection::{EntryCollection, EntryError};
use crate::entry::MenuEntry;
use crate::error::BuildError;

/// Reference to one scanned content file.
///
/// Contains only locations and the modification time; content is read
/// during the build phase.
#[derive(Debug, Clone)]
pub(crate) struct FileRecord {
    /// Alias-prefixed storage path (e.g. `@page/guide/01-setup.md`).
    pub alias_path: String,
    /// Physical location of the file.
    pub abs: PathBuf,
    /// Path relative to the scanned root, slash-separated.
    pub rel: String,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u64,
}

/// Walk a root directory and collect file records.
///
/// Directory entries are visited in filename order, so the scan order is
/// deterministic. Dotfiles and hidden directories are skipped; only files
/// with a recognized extension are collected.
///
/// # Errors
///
/// Any unreadable directory or file stat aborts the scan with
/// [`BuildError::Scan`] — a partial tree is unsafe to serve.
pub(crate) fn scan_root(
    alias: &str,
    root: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<FileRecord>, BuildError> {
    let mut records = Vec::new();
    scan_dir(alias, root, root, extensions, recursive, &mut records)?;
    Ok(records)
}

fn scan_dir(
    alias: &str,
    root: &Path,
    dir: &Path,
    extensions: &[String],
    recursive: bool,
    records: &mut Vec<FileRecord>,
) -> Result<(), BuildError> {
    let scan_err = |source| BuildError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let mut dir_entries = fs::read_dir(dir)
        .map_err(scan_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(scan_err)?;
    dir_entries.sort_by_key(std::fs::DirEntry::file_name);

    for dir_entry in dir_entries {
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = dir_entry.path();
        let file_type = dir_entry.file_type().map_err(|source| BuildError::Scan {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            if recursive {
                scan_dir(alias, root, &path, extensions, recursive, records)?;
            }
        } else if has_recognized_extension(&path, extensions) {
            let mtime = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(|source| BuildError::Scan {
                    path: path.clone(),
                    source,
                })?
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs());

            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            records.push(FileRecord {
                alias_path: format!("{alias}/{rel}"),
                abs: path,
                rel,
                mtime,
            });
        }
    }
    Ok(())
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

/// Read and parse a record's front matter, discarding the body.
///
/// Failures are per-entry: the record is reported back as an
/// [`EntryError`] instead of aborting the scan.
pub(crate) fn read_entry_data(
    record: &FileRecord,
    delimiter: &str,
) -> Result<BTreeMap<String, Value>, EntryError> {
    let raw = fs::read_to_string(&record.abs).map_err(|e| EntryError {
        path: record.alias_path.clone(),
        message: format!("failed to read: {e}"),
    })?;
    let (data, _body) = front_matter::parse_document(&raw, delimiter).map_err(|e| EntryError {
        path: record.alias_path.clone(),
        message: e.to_string(),
    })?;
    Ok(data)
}

/// Convert a filename stem to a display title.
///
/// Replaces `-`/`_` with spaces and capitalizes each word.
pub(crate) fn humanize(stem: &str) -> String {
    let mut result = String::with_capacity(stem.len());
    for word in stem.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Title fallback when front matter has none.
///
/// Index files take their directory's name; the root index keeps its own
/// stem.
fn default_title(derived: &Derived) -> String {
    if derived.is_index {
        if let Some(last) = derived.route.rsplit('/').next().filter(|s| !s.is_empty()) {
            return humanize(last);
        }
    }
    humanize(&derived.stem)
}

/// Route, order, and title attributes derived from a relative file path.
struct Derived {
    route: String,
    order: Option<i64>,
    stem: String,
    is_index: bool,
}

/// Builds the page [`EntryCollection`] from the configured roots.
///
/// `build()` always rescans; `build_cached()` consults a [`CacheStore`]
/// first, keyed by a fingerprint of the filesystem state.
pub struct Builder {
    paths: BTreeMap<String, PathBuf>,
    extensions: Vec<String>,
    index: String,
    delimiter: String,
    order_regex: Regex,
    cache_lock: Mutex<()>,
}

impl Builder {
    /// Create a builder for the page roots in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            paths: config.pages.paths.clone(),
            extensions: config.pages.extensions.clone(),
            index: config.content.index.clone(),
            delimiter: config.content.delimiter.clone(),
            order_regex: Regex::new(r"^([0-9]+)[-_](.*)$").unwrap(),
            cache_lock: Mutex::new(()),
        }
    }

    /// Scan all roots and build a fresh collection.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Scan`] for unreadable directories and
    /// [`BuildError::DuplicateRoute`] when two files derive the same
    /// route. No partial collection is published on failure.
    pub fn build(&self) -> Result<EntryCollection, BuildError> {
        let records = self.scan()?;
        let fingerprint = self.fingerprint_of(&records);
        self.build_from(&records, fingerprint)
    }

    /// Build through the cache store.
    ///
    /// Computes the filesystem fingerprint, returns a cached collection
    /// verbatim when its fingerprint matches, and otherwise builds and
    /// stores a new snapshot. The build-then-store sequence runs under a
    /// lock, so at most one rebuild happens concurrently per builder.
    ///
    /// Known consistency window: the fingerprint tracks file count and the
    /// maximum modification time in whole seconds, so an edit landing in
    /// the same second as the previous build can serve a stale collection
    /// until the next mtime tick.
    ///
    /// # Errors
    ///
    /// Same as [`Builder::build`]; cache read/write failures degrade to a
    /// fresh build and are never fatal.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn build_cached(&self, cache: &dyn CacheStore) -> Result<EntryCollection, BuildError> {
        let _guard = self.cache_lock.lock().unwrap();

        let records = self.scan()?;
        let fingerprint = self.fingerprint_of(&records);
        let key = self.cache_key();

        if let Some(bytes) = cache.get(&key) {
            if let Some(collection) = EntryCollection::from_snapshot(&bytes, &fingerprint) {
                tracing::debug!(%key, "menu collection cache hit");
                return Ok(collection);
            }
            tracing::debug!(%key, "menu collection cache stale, rebuilding");
        }

        let collection = self.build_from(&records, fingerprint)?;
        match collection.to_snapshot() {
            Ok(bytes) => cache.set(&key, &bytes),
            Err(e) => tracing::debug!(error = %e, "failed to serialize menu collection"),
        }
        Ok(collection)
    }

    fn scan(&self) -> Result<Vec<FileRecord>, BuildError> {
        let mut records = Vec::new();
        for (alias, root) in &self.paths {
            records.extend(scan_root(alias, root, &self.extensions, true)?);
        }
        Ok(records)
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
            match self.build_entry(record, position) {
                Ok(entry) => {
                    if seen
                        .insert(entry.route.clone(), entry.path.clone())
                        .is_some()
                    {
                        return Err(BuildError::DuplicateRoute {
                            route: entry.route,
                            path: entry.path,
                        });
                    }
                    entries.push(entry);
                }
                Err(e) => {
                    tracing::warn!(path = %e.path, error = %e.message, "skipping menu entry");
                    errors.push(e);
                }
            }
        }

        entries.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.route.cmp(&b.route)));
        Ok(EntryCollection::new(entries, errors, fingerprint))
    }

    fn build_entry(&self, record: &FileRecord, position: usize) -> Result<MenuEntry, EntryError> {
        let data = read_entry_data(record, &self.delimiter)?;
        let derived = self.derive(&record.rel);

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .map_or_else(|| default_title(&derived), str::to_owned);
        let order = data
            .get("order")
            .and_then(Value::as_i64)
            .or(derived.order)
            .unwrap_or_else(|| i64::try_from(position).unwrap_or(i64::MAX));
        let date = data.get("date").and_then(Value::as_str).map(str::to_owned);

        Ok(MenuEntry {
            path: record.alias_path.clone(),
            route: derived.route,
            title,
            order,
            date,
            is_index: derived.is_index,
            data,
        })
    }

    fn derive(&self, rel: &str) -> Derived {
        let mut segments: Vec<&str> = rel.split('/').collect();
        let file = segments.pop().unwrap_or(rel);
        let stem_raw = file.rsplit_once('.').map_or(file, |(stem, _ext)| stem);

        let mut cleaned: Vec<&str> = segments
            .into_iter()
            .map(|seg| self.strip_order(seg).1)
            .collect();
        let (order, stem) = self.strip_order(stem_raw);

        let is_index = stem == self.index;
        if !is_index {
            cleaned.push(stem);
        }

        Derived {
            route: cleaned.join("/"),
            order,
            stem: stem.to_owned(),
            is_index,
        }
    }

    fn strip_order<'s>(&self, segment: &'s str) -> (Option<i64>, &'s str) {
        match self.order_regex.captures(segment) {
            Some(caps) => {
                let order = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let rest = caps.get(2).map_or(segment, |m| m.as_str());
                (order, rest)
            }
            None => (None, segment),
        }
    }

    fn cache_key(&self) -> String {
        let aliases: Vec<&str> = self.paths.keys().map(String::as_str).collect();
        format!("menu:{}", aliases.join("+"))
    }

    /// Fingerprint of the filesystem state behind `records`.
    ///
    /// Covers the configured roots and conventions plus a coarse
    /// modification signal (file count and maximum mtime).
    fn fingerprint_of(&self, records: &[FileRecord]) -> String {
        let mut hasher = Sha256::new();
        for (alias, root) in &self.paths {
            hasher.update(alias.as_bytes());
            hasher.update([0]);
            hasher.update(root.to_string_lossy().as_bytes());
            hasher.update([0]);
        }
        for ext in &self.extensions {
            hasher.update(ext.as_bytes());
            hasher.update([0]);
        }
        hasher.update(self.index.as_bytes());
        hasher.update([0]);
        hasher.update(u64::try_from(records.len()).unwrap_or(u64::MAX).to_le_bytes());
        let max_mtime = records.iter().map(|r| r.mtime).max().unwrap_or(0);
        hasher.update(max_mtime.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use fern_cache::{FileCache, NullCache};

    use super::*;

    fn make_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.pages.paths = BTreeMap::from([("@page".to_owned(), root.to_path_buf())]);
        config
    }

    fn make_builder(root: &Path) -> Builder {
        Builder::new(&make_config(root))
    }

    fn write_page(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_build_flat_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "about.md", "About\n");
        write_page(tmp.path(), "contact.md", "Contact\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        assert_eq!(collection.len(), 2);
        assert!(collection.get("about").is_some());
        assert!(collection.get("contact").is_some());
    }

    #[test]
    fn test_order_prefix_drives_route_and_order() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "01-about.md", "About\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        let entry = collection.get("about").unwrap();
        assert_eq!(entry.order, 1);
        assert_eq!(entry.path, "@page/01-about.md");
        assert_eq!(entry.title, "About");
    }

    #[test]
    fn test_order_prefix_stripped_from_directory_segments() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("2-company");
        fs::create_dir(&dir).unwrap();
        write_page(&dir, "3-team.md", "Team\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        let entry = collection.get("company/team").unwrap();
        assert_eq!(entry.order, 3);
    }

    #[test]
    fn test_index_file_collapses_to_directory_route() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("guide");
        fs::create_dir(&dir).unwrap();
        write_page(&dir, "index.md", "Guide\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        let entry = collection.get("guide").unwrap();
        assert!(entry.is_index);
        assert_eq!(entry.title, "Guide");
    }

    #[test]
    fn test_root_index_file_derives_empty_route() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "index.md", "Home\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        let entry = collection.get("").unwrap();
        assert!(entry.is_index);
        assert_eq!(entry.path, "@page/index.md");
    }

    #[test]
    fn test_dotfiles_and_hidden_dirs_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), ".draft.md", "Draft\n");
        write_page(tmp.path(), "visible.md", "Visible\n");
        let hidden = tmp.path().join(".git");
        fs::create_dir(&hidden).unwrap();
        write_page(&hidden, "page.md", "Sneaky\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        assert_eq!(collection.len(), 1);
        assert!(collection.get("visible").is_some());
    }

    #[test]
    fn test_unrecognized_extensions_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "page.md", "Page\n");
        write_page(tmp.path(), "image.png", "not a page");
        write_page(tmp.path(), "noext", "bare");

        let collection = make_builder(tmp.path()).build().unwrap();

        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_front_matter_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(
            tmp.path(),
            "05-misc.md",
            "---\ntitle: Miscellany\norder: 1\ndate: 2024-01-02\ncolor: red\n---\nBody\n",
        );

        let collection = make_builder(tmp.path()).build().unwrap();

        let entry = collection.get("misc").unwrap();
        assert_eq!(entry.title, "Miscellany");
        assert_eq!(entry.order, 1);
        assert_eq!(entry.date.as_deref(), Some("2024-01-02"));
        assert_eq!(entry.data_str("color"), Some("red"));
        // The full front matter stays queryable
        assert_eq!(entry.data_str("title"), Some("Miscellany"));
    }

    #[test]
    fn test_title_humanizes_filename_stem() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "getting-started.md", "Body\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        assert_eq!(collection.get("getting-started").unwrap().title, "Getting Started");
    }

    #[test]
    fn test_malformed_front_matter_is_recovered() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "broken.md", "---\ntitle: [unclosed\n---\nBody\n");
        write_page(tmp.path(), "fine.md", "Body\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        // The broken entry is excluded from the route index but recorded
        assert_eq!(collection.len(), 1);
        assert!(collection.get("broken").is_none());
        assert_eq!(collection.errors().len(), 1);
        assert_eq!(collection.errors()[0].path, "@page/broken.md");
    }

    #[test]
    fn test_duplicate_route_aborts_build() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "01-about.md", "One\n");
        write_page(tmp.path(), "02-about.md", "Two\n");

        let err = make_builder(tmp.path()).build().unwrap_err();

        assert!(matches!(err, BuildError::DuplicateRoute { ref route, .. } if route == "about"));
    }

    #[test]
    fn test_missing_root_aborts_build() {
        let err = make_builder(Path::new("/nonexistent/fern-pages"))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Scan { .. }));
    }

    #[test]
    fn test_multiple_roots_share_one_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("main");
        let extra = tmp.path().join("extra");
        fs::create_dir_all(&main).unwrap();
        fs::create_dir_all(&extra).unwrap();
        write_page(&main, "home.md", "Home\n");
        write_page(&extra, "legal.md", "Legal\n");

        let mut config = Config::default();
        config.pages.paths = BTreeMap::from([
            ("@extra".to_owned(), extra),
            ("@page".to_owned(), main),
        ]);
        let collection = Builder::new(&config).build().unwrap();

        assert_eq!(collection.get("home").unwrap().path, "@page/home.md");
        assert_eq!(collection.get("legal").unwrap().path, "@extra/legal.md");
    }

    #[test]
    fn test_entries_sorted_by_order_then_route() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "02-beta.md", "B\n");
        write_page(tmp.path(), "01-zulu.md", "Z\n");
        write_page(tmp.path(), "01-alpha.md", "A\n");

        let collection = make_builder(tmp.path()).build().unwrap();

        let routes: Vec<_> = collection.routes().collect();
        assert_eq!(routes, vec!["alpha", "zulu", "beta"]);
    }

    #[test]
    fn test_build_cached_round_trip_matches_fresh_build() {
        let tmp = tempfile::tempdir().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        write_page(&pages, "01-about.md", "---\ntitle: About\n---\nBody\n");
        write_page(&pages, "guide.md", "Guide\n");

        let builder = make_builder(&pages);
        let cache = FileCache::new(tmp.path().join("cache"));

        let first = builder.build_cached(&cache).unwrap();
        let second = builder.build_cached(&cache).unwrap();
        let fresh = builder.build().unwrap();

        // Cache hit is observably equivalent to a fresh build
        assert_eq!(second, first);
        assert_eq!(second, fresh);
    }

    #[test]
    fn test_build_cached_rebuilds_when_files_change() {
        let tmp = tempfile::tempdir().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        write_page(&pages, "one.md", "One\n");

        let builder = make_builder(&pages);
        let cache = FileCache::new(tmp.path().join("cache"));

        let first = builder.build_cached(&cache).unwrap();
        assert_eq!(first.len(), 1);

        // Adding a file changes the fingerprint (file count)
        write_page(&pages, "two.md", "Two\n");
        let second = builder.build_cached(&cache).unwrap();

        assert_eq!(second.len(), 2);
        assert!(second.get("two").is_some());
    }

    #[test]
    fn test_build_cached_ignores_corrupt_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        write_page(&pages, "one.md", "One\n");

        let builder = make_builder(&pages);
        let cache = FileCache::new(tmp.path().join("cache"));
        cache.set(&builder.cache_key(), b"not a snapshot");

        let collection = builder.build_cached(&cache).unwrap();

        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_build_cached_with_null_cache_always_rebuilds() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "one.md", "One\n");

        let builder = make_builder(tmp.path());

        let collection = builder.build_cached(&NullCache).unwrap();

        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("getting-started"), "Getting Started");
        assert_eq!(humanize("my_page"), "My Page");
        assert_eq!(humanize("about"), "About");
        assert_eq!(humanize(""), "");
    }
}
