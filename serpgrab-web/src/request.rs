//! Validation of what the user typed before a collection starts, and the
//! messages shells show afterwards.
use serpgrab_common::{MAX_PAGES, MIN_PAGES, ResultSet};
use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query.";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Please enter a query.")]
    EmptyQuery,
    #[error("Page count must be between {MIN_PAGES} and {MAX_PAGES}, got {0}.")]
    PageCount(u32),
}

/// Accept `pages` only within the supported page-count range.
pub fn validate_pages(pages: u32) -> Result<u32, RequestError> {
    if (MIN_PAGES..=MAX_PAGES).contains(&pages) {
        Ok(pages)
    } else {
        Err(RequestError::PageCount(pages))
    }
}

/// A query and page count that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    pages: u32,
}

impl SearchRequest {
    /// Trim `query` and check both inputs.
    ///
    /// ```
    /// use serpgrab_web::{RequestError, SearchRequest};
    ///
    /// let req = SearchRequest::new("  weather ", 3).unwrap();
    /// assert_eq!(req.query(), "weather");
    ///
    /// assert_eq!(SearchRequest::new("   ", 3), Err(RequestError::EmptyQuery));
    /// assert_eq!(SearchRequest::new("x", 0), Err(RequestError::PageCount(0)));
    /// ```
    pub fn new(query: &str, pages: u32) -> Result<Self, RequestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RequestError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            pages: validate_pages(pages)?,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }
}

/// Summary line shown once a collection finishes.
pub fn outcome_message(results: &ResultSet) -> String {
    if results.is_empty() {
        NO_RESULTS_MESSAGE.to_string()
    } else {
        format!("Found {} results", results.len())
    }
}
