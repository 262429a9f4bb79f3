//! Page-source trait and the decoded page envelope.

use crate::EndpointKind;

use super::error::FetchError;

/// A single upstream record, kept as loosely typed JSON until transformed.
pub type RawRecord = serde_json::Value;

/// One decoded page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records on this page, in response order.
    pub results: Vec<RawRecord>,
    /// Absolute URL of the next page, or `None` on the last page.
    pub next: Option<String>,
    /// Total record count reported by the upstream, when present.
    pub total: Option<u64>,
}

impl Page {
    /// Build a page without a reported total.
    #[must_use]
    pub fn new(results: Vec<RawRecord>, next: Option<String>) -> Self {
        Self {
            results,
            next,
            total: None,
        }
    }

    /// Attach the total record count advertised by the upstream.
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Retrieve pages of raw records from the upstream API.
///
/// Implementations perform exactly one request per call and never retry.
pub trait PageSource {
    /// Canonical URL of the first page for `kind`.
    fn first_page_url(&self, kind: EndpointKind) -> String;

    /// Fetch and decode the page at `url`.
    ///
    /// `url` is either a value returned by [`first_page_url`](Self::first_page_url)
    /// or a `next` link taken verbatim from a previous page.
    fn fetch_page(&self, url: &str) -> Result<Page, FetchError>;
}
