use thiserror::Error;

/// Errors from [`crate::fetch::PageSource::fetch_page`] and
/// [`crate::fetch::fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The upstream answered with a non-success status.
    #[error("request to {url} returned HTTP {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The body was not a valid pagination envelope.
    #[error("malformed page envelope from {url}: {message}")]
    MalformedEnvelope {
        /// Requested URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
    /// A `next` link pointed back at a page already fetched.
    #[error("pagination revisited {url}")]
    PaginationCycle {
        /// The repeated page URL.
        url: String,
    },
}
