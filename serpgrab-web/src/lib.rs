//! Search-result collection and export.
//!
//! - Page fetching seam ([`fetch::PageFetcher`]) and per-page URL building (`fetch`)
//! - HTML selection of result titles and article bodies (`extract`)
//! - Bounded pagination with an empty-page stop (`collect`)
//! - Spreadsheet and plain-text downloads (`export`)
//! - Query/page-count validation and user-facing messages (`request`)
//!
//! Everything here is invoked on demand by a shell; nothing is cached and no
//! state outlives a call except what the caller keeps.

pub mod collect;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod request;

pub use collect::Collector;
pub use export::{Download, ExportError};
pub use fetch::{PageFetcher, SearchEndpoint};
pub use request::{RequestError, SearchRequest};

use serpgrab_http::HttpError;

/// Failures that abort a collection or a single article download.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Transport failure or non-success status.
    #[error(transparent)]
    Network(#[from] HttpError),

    /// Markup, selector, or URL input could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// A matched result-title node carries no `href`.
    #[error("result node #{index} matched by `{selector}` has no href attribute")]
    MissingAttribute {
        selector: &'static str,
        index: usize,
    },

    /// The query or page count was rejected before any request was made.
    #[error(transparent)]
    Request(#[from] RequestError),
}

pub type Result<T> = std::result::Result<T, WebError>;
