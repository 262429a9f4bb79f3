//! Facade crate for the ramsync synchroniser.
//!
//! This crate re-exports the core pipeline and row types and, behind the
//! `store-sqlite` feature, the HTTP source and SQLite store adapters.
//!
//! # Example
//!
//! ```no_run
//! use ramsync::{HttpPageSource, SqliteStore, run_pipeline};
//!
//! let source = HttpPageSource::new("https://rickandmortyapi.com/api")?;
//! let mut store = SqliteStore::open("ram.db")?;
//! store.initialise_schema()?;
//!
//! let report = run_pipeline(&source, &mut store)?;
//! println!("loaded {} episodes", report.episodes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub use ramsync_core::{
    Appearance, CharacterRow, EndpointKind, EpisodeCharacterRow, EpisodeRow, FetchError,
    LoadError, LocationRow, Page, PageSource, PipelineError, RawRecord, RowStore, SyncReport,
    Table, TableRow, TransformError, fetch_all, run_pipeline,
};

#[cfg(feature = "store-sqlite")]
pub use ramsync_data::{
    HttpPageSource, HttpPageSourceConfig, OpenStoreError, SchemaError, SourceBuildError,
    SqliteStore,
};
