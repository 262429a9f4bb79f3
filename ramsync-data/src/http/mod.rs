//! HTTP [`PageSource`](ramsync_core::PageSource) for the Rick and Morty API.
//!
//! [`HttpPageSource`] issues one GET per page and decodes the shared list
//! envelope. The core pipeline is synchronous, so the source blocks on a
//! Tokio runtime it owns.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use ramsync_core::{EndpointKind, fetch_all};
//! use ramsync_data::http::{HttpPageSource, HttpPageSourceConfig};
//!
//! let config = HttpPageSourceConfig::default().with_timeout(Duration::from_secs(10));
//! let source = HttpPageSource::with_config(config)?;
//!
//! let episodes = fetch_all(&source, EndpointKind::Episode)?;
//! println!("fetched {} episodes", episodes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod envelope;
mod source;

pub use source::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpPageSource,
    HttpPageSourceConfig, SourceBuildError,
};
