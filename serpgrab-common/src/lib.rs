//! Common types and utilities shared across serpgrab crates.
//!
//! This crate holds the collected-result model passed between the collector,
//! the exporters, and the presentation shells, plus the observability helpers
//! every binary uses. It stays dependency-minimal so that all crates can depend
//! on it without pulling in the HTTP or parsing stack.
//!
//! # Overview
//!
//! - [`ResultItem`]: one (title, link) pair scraped from a results page
//! - [`ResultSet`]: ordered accumulation of items across pages
//! - [`ARTICLE_FALLBACK_TEXT`]: body text used when no known container matches
//! - [`MIN_PAGES`], [`MAX_PAGES`], [`DEFAULT_PAGES`]: page-count bounds shared by
//!   configuration and the shells
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use serpgrab_common::{ResultItem, ResultSet};
//!
//! let mut set = ResultSet::default();
//! set.extend(vec![ResultItem::new("headline", "https://news.example.com/1")]);
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.items()[0].title, "headline");
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Body text returned when an article page has none of the known containers.
pub const ARTICLE_FALLBACK_TEXT: &str = "본문을 추출할 수 없습니다.";

/// Smallest number of result pages a collection may request.
pub const MIN_PAGES: u32 = 1;
/// Largest number of result pages a collection may request.
pub const MAX_PAGES: u32 = 100;
/// Page count offered when the user has not chosen one.
pub const DEFAULT_PAGES: u32 = 10;

/// A single scraped search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Text content of the matched title node, verbatim.
    pub title: String,
    /// The node's `href` attribute, verbatim.
    pub link: String,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Ordered results accumulated over one collection run.
///
/// Items keep document order within a page and pages keep request order.
/// Duplicates are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    items: Vec<ResultItem>,
}

impl ResultSet {
    /// Append one page worth of items.
    pub fn extend(&mut self, page: Vec<ResultItem>) {
        self.items.extend(page);
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn get(&self, idx: usize) -> Option<&ResultItem> {
        self.items.get(idx)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultItem> {
        self.items.iter()
    }
}

impl From<Vec<ResultItem>> for ResultSet {
    fn from(items: Vec<ResultItem>) -> Self {
        Self { items }
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultItem;
    type IntoIter = std::slice::Iter<'a, ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_keeps_page_order_and_duplicates() {
        let mut set = ResultSet::default();
        set.extend(vec![
            ResultItem::new("a", "https://a"),
            ResultItem::new("b", "https://b"),
        ]);
        set.extend(vec![ResultItem::new("a", "https://a")]);

        let titles: Vec<&str> = set.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "a"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn serializes_as_plain_item_list() {
        let set = ResultSet::from(vec![ResultItem::new("t", "https://l")]);
        let v = serde_json::to_value(&set).unwrap();
        assert_eq!(v["items"][0]["title"], "t");
        assert_eq!(v["items"][0]["link"], "https://l");
    }
}
