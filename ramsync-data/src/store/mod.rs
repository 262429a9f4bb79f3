//! SQLite persistence for the four destination tables.
//!
//! The module is split into two focused submodules:
//! - `schema` creates (or drops and recreates) the tables.
//! - `sqlite` implements [`RowStore`](ramsync_core::RowStore) with one
//!   transaction per batch.
#![forbid(unsafe_code)]

mod schema;
mod sqlite;

pub use schema::{SchemaError, initialise_schema, reset_schema};
pub use sqlite::{OpenStoreError, SqliteStore, TIMESTAMP_FORMAT};
