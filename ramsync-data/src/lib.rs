//! Adapters connecting the ramsync pipeline to the outside world.
//!
//! Responsibilities:
//! - Fetch API pages over HTTP ([`http::HttpPageSource`]).
//! - Create the destination tables and bulk-insert rows into SQLite
//!   ([`store::SqliteStore`]).
//!
//! Boundaries:
//! - Do not encode mapping rules (live in `ramsync-core`).
//! - Block only on runtimes owned by this crate; callers stay synchronous.
//!
//! Invariants:
//! - Each adapter owns its resources explicitly; no global handles.

#![forbid(unsafe_code)]

pub mod http;
pub mod store;

pub use http::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPageSource, HttpPageSourceConfig, SourceBuildError};
pub use store::{OpenStoreError, SchemaError, SqliteStore, TIMESTAMP_FORMAT, initialise_schema, reset_schema};
