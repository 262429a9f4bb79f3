//! Paginated retrieval of raw records.
//!
//! The [`PageSource`] trait abstracts a single page request; [`fetch_all`]
//! walks the `info.next` chain from the first page of an endpoint until the
//! upstream reports no further page, accumulating results in response order.
//!
//! Any transport or envelope failure aborts the walk. There is no retry.

mod error;
mod source;

use std::collections::HashSet;

use log::{debug, warn};

use crate::EndpointKind;

pub use error::FetchError;
pub use source::{Page, PageSource, RawRecord};

/// Fetch every record for `kind`, following pagination links to the end.
///
/// The returned records keep the upstream pagination order. A `next` link
/// that is empty is treated the same as `null`. Revisiting a page already
/// seen during the same walk is reported as [`FetchError::PaginationCycle`]
/// rather than looping forever.
///
/// # Examples
///
/// ```
/// use ramsync_core::{EndpointKind, FetchError, Page, PageSource, fetch_all};
/// use serde_json::json;
///
/// struct SinglePage;
///
/// impl PageSource for SinglePage {
///     fn first_page_url(&self, kind: EndpointKind) -> String {
///         format!("https://api.test/{kind}")
///     }
///
///     fn fetch_page(&self, _url: &str) -> Result<Page, FetchError> {
///         Ok(Page::new(vec![json!({ "id": 1 })], None))
///     }
/// }
///
/// let records = fetch_all(&SinglePage, EndpointKind::Episode)?;
/// assert_eq!(records.len(), 1);
/// # Ok::<(), FetchError>(())
/// ```
pub fn fetch_all<S>(source: &S, kind: EndpointKind) -> Result<Vec<RawRecord>, FetchError>
where
    S: PageSource + ?Sized,
{
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    let mut reported_total = None;
    let mut next = Some(source.first_page_url(kind));

    while let Some(url) = next {
        if !visited.insert(url.clone()) {
            return Err(FetchError::PaginationCycle { url });
        }
        let page = source.fetch_page(&url)?;
        debug!(
            "fetched {} {kind} records from {url} (page {})",
            page.results.len(),
            visited.len()
        );
        reported_total = page.total.or(reported_total);
        records.extend(page.results);
        next = page.next.filter(|link| !link.trim().is_empty());
    }

    if let Some(total) = reported_total {
        if usize::try_from(total).ok() != Some(records.len()) {
            warn!(
                "upstream reported {total} {kind} records but {} were retrieved",
                records.len()
            );
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests;
