//! Core domain types and pipeline for the ramsync synchroniser.
//!
//! Responsibilities:
//! - Describe the upstream endpoint kinds and the typed rows of the four
//!   destination tables.
//! - Map raw, loosely typed API records into those rows.
//! - Drive the fetch-then-load sequence in referential-integrity order.
//!
//! Boundaries:
//! - Transport and storage live behind the [`PageSource`] and [`RowStore`]
//!   traits; concrete HTTP and SQLite adapters are in `ramsync-data`.
//! - No global mutable state: the pipeline receives its collaborators
//!   explicitly.

#![forbid(unsafe_code)]

pub mod endpoint;
pub mod fetch;
pub mod pipeline;
pub mod rows;
pub mod store;
pub mod transform;

#[doc(hidden)]
pub mod test_support;

pub use endpoint::EndpointKind;
pub use fetch::{FetchError, Page, PageSource, RawRecord, fetch_all};
pub use pipeline::{FetchedRecords, PipelineError, SyncReport, fetch_records, load_records, run_pipeline};
pub use rows::{
    Appearance, CharacterRow, EpisodeCharacterRow, EpisodeRow, LocationRow, SqlValue, Table,
    TableRow,
};
pub use store::{LoadError, RowStore};
pub use transform::{
    TransformError, number_appearances, to_character_row, to_episode_character_rows,
    to_episode_row, to_location_row,
};
