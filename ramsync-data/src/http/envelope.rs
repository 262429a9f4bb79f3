//! Response shapes served by the Rick and Morty API.
//!
//! Every list endpoint answers with the same envelope:
//!
//! ```json
//! { "info": { "count": 826, "pages": 42, "next": "...?page=2", "prev": null },
//!   "results": [ ... ] }
//! ```
//!
//! Failures carry a single `error` message instead.

use ramsync_core::{Page, RawRecord};
use serde::Deserialize;

/// A successful list response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    info: Info,
    results: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct Info {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next: Option<String>,
}

impl Envelope {
    pub(crate) fn into_page(self) -> Page {
        let page = Page::new(self.results, self.info.next);
        match self.info.count {
            Some(count) => page.with_total(count),
            None => page,
        }
    }
}

/// Body returned alongside a non-success status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}
