//! Minimal HTTP client for fetching result and article markup.
//!
//! - One GET per call, a fixed browser-identifying `User-Agent`, nothing else
//! - No retries and no timeout unless one is configured with [`HttpClient::with_timeout`]
//! - Non-success statuses become [`HttpError::Api`] carrying status and a body snippet
//! - Optional *raw* request/response logging via `SERPGRAB_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), serpgrab_http::HttpError> {
//! let client = serpgrab_http::HttpClient::new(serpgrab_http::DEFAULT_USER_AGENT)?;
//! let url = url::Url::parse("https://search.naver.com/search.naver?query=rust").unwrap();
//! let html: String = client.get_text(&url).await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `SERPGRAB_HTTP_RAW=1`.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Client;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub use reqwest::StatusCode;

/// Desktop Chrome on Windows; enough to get past trivial bot blocking.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SERPGRAB_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secret query params redacted.
fn make_curl(url: &Url, user_agent: &str) -> String {
    let mut shown = url.clone();
    let (_, redacted) = redact_query(url);
    if !redacted.is_empty() {
        shown.query_pairs_mut().clear().extend_pairs(redacted.iter());
    }
    format!(
        "curl -XGET -H 'User-Agent: {}' '{}'",
        user_agent.replace('\'', r"'\''"),
        shown.as_str().replace('\'', r"'\''")
    )
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("set-cookie") {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("client build failed: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], `None` for transport failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpClient {
    /// Construct a client that identifies itself with `user_agent`.
    ///
    /// ```no_run
    /// use serpgrab_http::{DEFAULT_USER_AGENT, HttpClient, HttpError};
    ///
    /// let client = HttpClient::new(DEFAULT_USER_AGENT)?;
    /// assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
    /// assert!(client.timeout.is_none());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let ua = user_agent.trim();
        HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent header: {e}")))?;
        let inner = Client::builder()
            .user_agent(ua)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            user_agent: ua.to_string(),
            timeout: None,
        })
    }

    /// Apply a per-request timeout. Without one the transport defaults apply.
    ///
    /// ```no_run
    /// use serpgrab_http::{DEFAULT_USER_AGENT, HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new(DEFAULT_USER_AGENT)?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.timeout, Some(Duration::from_secs(2)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// GET `url` and return the decoded body text.
    ///
    /// The body is decoded using the response charset (UTF-8 when absent).
    pub async fn get_text(&self, url: &Url) -> Result<String, HttpError> {
        let req_id = Uuid::new_v4().simple().to_string();
        let (host_path, redacted_q) = redact_query(url);

        let mut rb = self.inner.get(url.clone());
        if let Some(t) = self.timeout {
            rb = rb.timeout(t);
        }

        tracing::debug!(
            req_id=%req_id,
            method="GET",
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=?self.timeout.map(|t| t.as_millis() as u64),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(url, &self.user_agent);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = match rb.send().await {
            Ok(resp) => resp,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(
                    req_id=%req_id,
                    host_path=%host_path,
                    timeout=err.is_timeout(),
                    message=%message,
                    "http.network_error.send"
                );
                return Err(if err.is_timeout() {
                    HttpError::Timeout(message)
                } else {
                    HttpError::Network(message)
                });
            }
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    message=%message,
                    "http.network_error.body"
                );
                return Err(HttpError::Network(message));
            }
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        // Response header diagnostics
        let server_req_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            x_request_id=%server_req_id,
            content_type=%content_type,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = body.len() > RAW_MAX_BODY;
            let text = truncate_on_char_boundary(&body, RAW_MAX_BODY);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&body);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        if status.is_success() {
            return Ok(body);
        }

        tracing::warn!(
            req_id=%req_id,
            %status,
            host_path=%host_path,
            x_request_id=%server_req_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message: snippet,
            request_id: server_req_id.to_string(),
        })
    }
}

// ==============================
// Helpers
// ==============================

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn snip_body(body: &str) -> String {
    let trimmed = body.trim();
    let mut snip = truncate_on_char_boundary(trimmed, SNIPPET_MAX).to_string();
    if snip.len() < trimmed.len() {
        snip.push_str("...");
    }
    snip
}

/// Return "host + path" and the query pairs with secret-looking values redacted.
fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let is_secret = matches!(
                k.to_ascii_lowercase().as_str(),
                "access_token" | "auth" | "key" | "api_key" | "token" | "secret" | "session"
            );
            let v = if is_secret {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}
