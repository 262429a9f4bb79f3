//! Blocking HTTP page source built on `reqwest`.

use std::time::Duration;

use log::debug;
use ramsync_core::{EndpointKind, FetchError, Page, PageSource};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::envelope::{Envelope, ErrorBody};

/// Public Rick and Morty API root.
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Default user agent for API requests.
pub const DEFAULT_USER_AGENT: &str = "ramsync/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an [`HttpPageSource`].
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// The configured base URL is not an absolute HTTP(S) URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpPageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPageSourceConfig {
    /// API root, e.g. `"https://rickandmortyapi.com/api"`.
    pub base_url: String,
    /// Connect and whole-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpPageSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpPageSourceConfig {
    /// Create a configuration rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`PageSource`] that fetches pages from the live API.
///
/// The source owns a current-thread Tokio runtime reused across requests.
/// When called from inside a multi-threaded runtime it borrows that runtime
/// through [`tokio::task::block_in_place`] instead, which avoids nesting
/// runtimes.
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("client", &self.client)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpPageSource {
    /// Create a source for `base_url` with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpPageSourceConfig::new(base_url))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpPageSourceConfig) -> Result<Self, SourceBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            runtime,
        })
    }

    async fn fetch_page_async(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        debug!("GET {url} -> {status} ({} bytes)", body.len());

        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_slice::<Envelope>(&body)
            .map(Envelope::into_page)
            .map_err(|err| FetchError::MalformedEnvelope {
                url: url.to_owned(),
                message: err.to_string(),
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

impl PageSource for HttpPageSource {
    fn first_page_url(&self, kind: EndpointKind) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            kind.path()
        )
    }

    fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let future = self.fetch_page_async(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SourceBuildError> {
    let invalid = |reason: String| SourceBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed".to_owned()));
    }
    Ok(url)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body).map_or_else(
        |_| status.canonical_reason().unwrap_or("unexpected status").to_owned(),
        |parsed| parsed.error,
    )
}
