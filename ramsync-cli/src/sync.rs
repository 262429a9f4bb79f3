//! Wiring of the HTTP source and SQLite store around the core pipeline.

use camino::Utf8Path;
use log::info;
use ramsync_core::{PageSource, SyncReport, run_pipeline};
use ramsync_data::{HttpPageSource, SqliteStore};

use crate::{CliError, SyncConfig};

/// Synchronise from the live API described by `config`.
pub(crate) fn sync_from_api(config: &SyncConfig) -> Result<SyncReport, CliError> {
    let source = HttpPageSource::with_config(config.source.clone())?;
    info!("synchronising {} into {}", config.source.base_url, config.database);
    execute_sync(config, &source)
}

/// Prepare the database named in `config` and run the pipeline from `source`.
///
/// The tables are created when missing, or dropped and recreated first when
/// `config.reset` is set. The HTTP settings in `config` are ignored; `source`
/// supplies the pages.
pub fn execute_sync<S>(config: &SyncConfig, source: &S) -> Result<SyncReport, CliError>
where
    S: PageSource + ?Sized,
{
    let mut store = prepare_store(&config.database, config.reset)?;
    Ok(run_pipeline(source, &mut store)?)
}

/// Create the destination tables in `database`, optionally dropping them
/// first.
pub fn initialise_database(database: &Utf8Path, reset: bool) -> Result<(), CliError> {
    prepare_store(database, reset)?;
    info!("schema ready in {database}");
    Ok(())
}

fn prepare_store(database: &Utf8Path, reset: bool) -> Result<SqliteStore, CliError> {
    let mut store = SqliteStore::open(database)?;
    if reset {
        info!("dropping existing tables in {database}");
        store.reset_schema()?;
    } else {
        store.initialise_schema()?;
    }
    Ok(store)
}
