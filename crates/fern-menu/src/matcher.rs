//! Route matching against the page and post collections.

use std::collections::HashMap;

use regex::Regex;

use fern_config::Config;

use crate::collection::EntryCollection;
use crate::entry::MenuEntry;
use crate::error::NotFoundError;
use crate::posts::DATE_PREFIX;

/// Maps one route string to exactly one entry.
///
/// Matching policy, first match wins:
/// 1. normalize (trim slashes; empty route becomes the home route)
/// 2. exact match in the page collection
/// 3. exact match in the post collection
/// 4. date-stripped match in the post collection (post links are commonly
///    requested without the date segment)
///
/// Anything else is a typed [`NotFoundError`] — no fuzzy matching, no
/// redirects, so routing stays deterministic.
pub struct UrlMatcher<'a> {
    pages: &'a EntryCollection,
    posts: &'a EntryCollection,
    home_route: String,
    stripped: HashMap<String, usize>,
}

impl<'a> UrlMatcher<'a> {
    /// Create a matcher over both collections.
    ///
    /// The date-stripped route index is precomputed here; when two posts
    /// would share a stripped route, the first in collection order (the
    /// newest) keeps it and later ones stay reachable through their
    /// literal dated route.
    #[must_use]
    pub fn new(pages: &'a EntryCollection, posts: &'a EntryCollection, config: &Config) -> Self {
        let date_regex = Regex::new(DATE_PREFIX).unwrap();
        let mut stripped = HashMap::new();

        for (i, entry) in posts.entries().iter().enumerate() {
            let (parent, last) = entry
                .route
                .rsplit_once('/')
                .map_or(("", entry.route.as_str()), |(parent, last)| (parent, last));
            let Some(caps) = date_regex.captures(last) else {
                continue;
            };
            let Some(slug) = caps.get(2).map(|m| m.as_str()) else {
                continue;
            };
            let route = if parent.is_empty() {
                slug.to_owned()
            } else {
                format!("{parent}/{slug}")
            };
            stripped.entry(route).or_insert(i);
        }

        Self {
            pages,
            posts,
            home_route: config.home_route.clone(),
            stripped,
        }
    }

    /// Resolve a route to its entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the normalized route matches
    /// neither collection.
    pub fn match_route(&self, route: &str) -> Result<&'a MenuEntry, NotFoundError> {
        let trimmed = route.trim_matches('/');
        let route = if trimmed.is_empty() {
            self.home_route.as_str()
        } else {
            trimmed
        };

        if let Some(entry) = self.pages.get(route) {
            return Ok(entry);
        }
        if let Some(entry) = self.posts.get(route) {
            return Ok(entry);
        }
        if let Some(&i) = self.stripped.get(route) {
            return Ok(&self.posts.entries()[i]);
        }

        Err(NotFoundError {
            route: route.to_owned(),
        })
    }
}
