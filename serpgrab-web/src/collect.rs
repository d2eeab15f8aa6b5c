//! Bounded pagination over the results pages, plus on-demand article retrieval.
use serpgrab_common::ResultSet;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::extract::{extract_article, extract_results};
use crate::fetch::{PageFetcher, SearchEndpoint, start_offset};
use crate::request::{SearchRequest, validate_pages};
use crate::{Result, WebError};

/// Drives a [`PageFetcher`] across result pages of one [`SearchEndpoint`].
#[derive(Clone)]
pub struct Collector {
    fetcher: Arc<dyn PageFetcher>,
    endpoint: SearchEndpoint,
}

impl Collector {
    pub fn new(fetcher: Arc<dyn PageFetcher>, endpoint: SearchEndpoint) -> Self {
        Self { fetcher, endpoint }
    }

    pub fn endpoint(&self) -> &SearchEndpoint {
        &self.endpoint
    }

    /// Fetch pages `0..max_pages` in order, stopping at the first page that
    /// yields no results.
    ///
    /// Any fetch or extraction failure aborts the whole collection; items from
    /// earlier pages are discarded with it.
    pub async fn collect(&self, query: &str, max_pages: u32) -> Result<ResultSet> {
        let max_pages = validate_pages(max_pages)?;
        let started = Instant::now();
        tracing::info!(
            target: "web.collect",
            query = %query,
            max_pages,
            "web.collect.start"
        );

        let mut results = ResultSet::default();
        let mut fetched = 0u32;
        for page in 0..max_pages {
            let url = self.endpoint.page_url(query, page);
            let markup = self.fetcher.fetch(&url).await.inspect_err(|e| {
                tracing::warn!(target: "web.collect", page, error = %e, "web.collect.fetch_failed");
            })?;
            fetched += 1;

            let items = extract_results(&markup)?;
            tracing::debug!(
                target: "web.collect",
                page,
                start = start_offset(page),
                hit_count = items.len(),
                "web.collect.page"
            );
            if items.is_empty() {
                break;
            }
            results.extend(items);
        }

        tracing::info!(
            target: "web.collect",
            total = results.len(),
            pages_fetched = fetched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "web.collect.done"
        );
        Ok(results)
    }

    /// [`Collector::collect`] for an already validated request.
    pub async fn run(&self, request: &SearchRequest) -> Result<ResultSet> {
        self.collect(request.query(), request.pages()).await
    }

    /// Fetch one linked page and extract its body text. Never cached.
    pub async fn article_text(&self, link: &str) -> Result<String> {
        let url = Url::parse(link)
            .map_err(|e| WebError::Parse(format!("link `{link}` is not an absolute URL: {e}")))?;
        let markup = self.fetcher.fetch(&url).await?;
        let text = extract_article(&markup);
        tracing::debug!(
            target: "web.article",
            host = url.host_str().unwrap_or("-"),
            chars = text.chars().count(),
            "web.article.extracted"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestError;
    use async_trait::async_trait;
    use serpgrab_common::ARTICLE_FALLBACK_TEXT;
    use serpgrab_http::{HttpError, StatusCode};
    use std::sync::Mutex;

    /// Serves canned markup in request order and records every URL asked for.
    struct ScriptedFetcher {
        pages: Vec<std::result::Result<String, u16>>,
        seen: Mutex<Vec<Url>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<std::result::Result<String, u16>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn starts(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .filter_map(|u| {
                    u.query_pairs()
                        .find(|(k, _)| k == "start")
                        .map(|(_, v)| v.into_owned())
                })
                .collect()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> std::result::Result<String, HttpError> {
            let mut seen = self.seen.lock().unwrap();
            let idx = seen.len();
            seen.push(url.clone());
            match self.pages.get(idx) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(code)) => Err(HttpError::Api {
                    status: StatusCode::from_u16(*code).unwrap(),
                    message: "scripted".into(),
                    request_id: "-".into(),
                }),
                None => Ok(String::new()),
            }
        }
    }

    fn news_page(n: usize, tag: &str) -> String {
        let anchors: String = (0..n)
            .map(|i| format!(r#"<a class="news_tit" href="https://n/{tag}/{i}">{tag}-{i}</a>"#))
            .collect();
        format!("<html><body>{anchors}</body></html>")
    }

    fn collector(fetcher: Arc<ScriptedFetcher>) -> Collector {
        let endpoint = SearchEndpoint::parse("https://search.example.com/search").unwrap();
        Collector::new(fetcher, endpoint)
    }

    #[tokio::test]
    async fn stops_at_first_empty_page() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(news_page(2, "p0")),
            Ok(news_page(0, "p1")),
            Ok(news_page(3, "p2")),
        ]);
        let got = collector(fetcher.clone()).collect("x", 3).await.unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(fetcher.starts(), vec!["1", "11"]);
    }

    #[tokio::test]
    async fn fetches_every_page_when_none_is_empty() {
        let pages = (0..5).map(|p| Ok(news_page(1, &format!("p{p}")))).collect();
        let fetcher = ScriptedFetcher::new(pages);
        let got = collector(fetcher.clone()).collect("x", 5).await.unwrap();

        assert_eq!(got.len(), 5);
        assert_eq!(fetcher.starts(), vec!["1", "11", "21", "31", "41"]);
        let titles: Vec<&str> = got.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["p0-0", "p1-0", "p2-0", "p3-0", "p4-0"]);
    }

    #[tokio::test]
    async fn empty_first_page_returns_empty_set() {
        let fetcher = ScriptedFetcher::new(vec![Ok(news_page(0, "p0"))]);
        let got = collector(fetcher.clone()).collect("x", 10).await.unwrap();

        assert!(got.is_empty());
        assert_eq!(fetcher.starts(), vec!["1"]);
    }

    #[tokio::test]
    async fn network_failure_aborts_collection() {
        let fetcher = ScriptedFetcher::new(vec![Ok(news_page(2, "p0")), Err(500)]);
        let err = collector(fetcher.clone()).collect("x", 4).await.unwrap_err();

        assert!(matches!(err, WebError::Network(_)));
        assert_eq!(fetcher.starts(), vec!["1", "11"]);
    }

    #[tokio::test]
    async fn missing_href_aborts_collection() {
        let fetcher = ScriptedFetcher::new(vec![Ok(
            r#"<a class="sh_blog_title">no link</a>"#.to_string()
        )]);
        let err = collector(fetcher).collect("x", 2).await.unwrap_err();

        assert!(matches!(err, WebError::MissingAttribute { .. }));
    }

    #[tokio::test]
    async fn out_of_range_page_count_is_rejected_before_fetching() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let err = collector(fetcher.clone()).collect("x", 0).await.unwrap_err();

        assert!(matches!(
            err,
            WebError::Request(RequestError::PageCount(0))
        ));
        assert!(fetcher.starts().is_empty());
    }

    #[tokio::test]
    async fn article_text_refetches_every_time() {
        let body = r#"<div class="news_end">body</div>"#.to_string();
        let fetcher = ScriptedFetcher::new(vec![Ok(body.clone()), Ok(body)]);
        let c = collector(fetcher.clone());

        assert_eq!(c.article_text("https://n/a/1").await.unwrap(), "body");
        assert_eq!(c.article_text("https://n/a/1").await.unwrap(), "body");
        assert_eq!(fetcher.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn article_without_container_gets_fallback() {
        let fetcher = ScriptedFetcher::new(vec![Ok("<p>nothing</p>".to_string())]);
        let text = collector(fetcher).article_text("https://n/a/1").await.unwrap();
        assert_eq!(text, ARTICLE_FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn relative_article_link_is_a_parse_error() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let err = collector(fetcher.clone())
            .article_text("/news/1")
            .await
            .unwrap_err();
        assert!(matches!(err, WebError::Parse(_)));
        assert!(fetcher.seen.lock().unwrap().is_empty());
    }
}
