//! Fetching seam and search URL construction.
use async_trait::async_trait;
use serpgrab_http::{HttpClient, HttpError};
use url::Url;

use crate::{Result, WebError};

/// Results the remote engine shows per page; drives the `start` offset.
pub const RESULTS_PER_PAGE: u32 = 10;

/// Retrieves raw markup for a fully formed URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> std::result::Result<String, HttpError>;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &Url) -> std::result::Result<String, HttpError> {
        self.get_text(url).await
    }
}

/// 1-based result offset the engine expects for zero-based page `page`.
///
/// ```
/// use serpgrab_web::fetch::start_offset;
///
/// assert_eq!(start_offset(0), 1);
/// assert_eq!(start_offset(2), 21);
/// ```
pub fn start_offset(page: u32) -> u32 {
    page.saturating_mul(RESULTS_PER_PAGE).saturating_add(1)
}

/// Results-page URL that per-page requests are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    base: Url,
}

impl SearchEndpoint {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let base = Url::parse(raw)
            .map_err(|e| WebError::Parse(format!("search endpoint `{raw}`: {e}")))?;
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>?query=<query>&start=<page*10+1>`, query form-encoded.
    ///
    /// Query parameters already on the base are kept, except `query` and
    /// `start`, which are always replaced.
    ///
    /// ```
    /// use serpgrab_web::SearchEndpoint;
    ///
    /// let ep = SearchEndpoint::parse("https://search.example.com/search").unwrap();
    /// let url = ep.page_url("rust lang", 1);
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://search.example.com/search?query=rust+lang&start=11"
    /// );
    /// ```
    pub fn page_url(&self, query: &str, page: u32) -> Url {
        let kept: Vec<(String, String)> = self
            .base
            .query_pairs()
            .filter(|(k, _)| k != "query" && k != "start")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = self.base.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(kept)
            .append_pair("query", query)
            .append_pair("start", &start_offset(page).to_string());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_ten_per_page() {
        let got: Vec<u32> = (0..4).map(start_offset).collect();
        assert_eq!(got, vec![1, 11, 21, 31]);
    }

    #[test]
    fn page_url_percent_encodes_query() {
        let ep = SearchEndpoint::parse("https://search.example.com/search").unwrap();
        let url = ep.page_url("날씨 & 뉴스", 0);

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "날씨 & 뉴스".to_string()),
                ("start".to_string(), "1".to_string()),
            ]
        );
        assert!(!url.as_str().contains(' '));
        assert!(url.as_str().contains("%EB%82%A0%EC%94%A8"));
    }

    #[test]
    fn page_url_keeps_base_params_and_replaces_paging() {
        let ep = SearchEndpoint::parse("https://search.example.com/search?where=news&start=99")
            .unwrap();
        let url = ep.page_url("x", 2);
        assert_eq!(
            url.as_str(),
            "https://search.example.com/search?where=news&query=x&start=21"
        );
    }

    #[test]
    fn rejects_relative_endpoint() {
        let err = SearchEndpoint::parse("/search").unwrap_err();
        assert!(matches!(err, WebError::Parse(_)));
    }
}
