//! Behavioural coverage for the `sync` command against an on-disk database.

use super::helpers::{count_rows, small_upstream};
use super::*;
use ramsync_core::test_support::StaticPageSource;
use ramsync_core::{LoadError, PipelineError, SyncReport, Table};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct SyncWorld {
    _workspace: TempDir,
    database: Utf8PathBuf,
    upstream: RefCell<Option<StaticPageSource>>,
    outcome: RefCell<Option<Result<SyncReport, CliError>>>,
}

impl SyncWorld {
    fn new() -> Self {
        let workspace = TempDir::new().expect("create workspace");
        let root = Utf8PathBuf::from_path_buf(workspace.path().to_path_buf())
            .expect("utf-8 workspace path");
        Self {
            database: root.join("data/ram.db"),
            _workspace: workspace,
            upstream: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    fn sync(&self, reset: bool) -> Result<SyncReport, CliError> {
        let config = SyncConfig {
            database: self.database.clone(),
            source: HttpPageSourceConfig::default(),
            reset,
        };
        let upstream = self.upstream.borrow();
        let source = upstream.as_ref().expect("upstream should be initialised");
        execute_sync(&config, source)
    }
}

#[fixture]
fn sync_world() -> SyncWorld {
    SyncWorld::new()
}

#[given("an upstream with one episode featuring two characters")]
fn small_universe(#[from(sync_world)] world: &SyncWorld) {
    world.upstream.replace(Some(small_upstream()));
}

#[given("the database was already synchronised")]
fn already_synchronised(#[from(sync_world)] world: &SyncWorld) {
    world.sync(false).expect("initial sync should succeed");
}

#[when("I sync into a new database")]
fn sync_new(#[from(sync_world)] world: &SyncWorld) {
    world.outcome.replace(Some(world.sync(false)));
}

#[when("I sync into the same database")]
fn sync_again(#[from(sync_world)] world: &SyncWorld) {
    world.outcome.replace(Some(world.sync(false)));
}

#[when("I sync into the same database with a reset")]
fn sync_with_reset(#[from(sync_world)] world: &SyncWorld) {
    world.outcome.replace(Some(world.sync(true)));
}

#[then("every table holds the upstream rows")]
fn tables_populated(#[from(sync_world)] world: &SyncWorld) {
    let outcome = world.outcome.borrow();
    let report = outcome
        .as_ref()
        .expect("outcome should exist")
        .as_ref()
        .expect("sync should succeed");
    assert_eq!(
        *report,
        SyncReport {
            locations: 1,
            characters: 2,
            episodes: 1,
            appearances: 2,
        }
    );
    assert_eq!(count_rows(&world.database, Table::Locations), 1);
    assert_eq!(count_rows(&world.database, Table::Characters), 2);
    assert_eq!(count_rows(&world.database, Table::Episodes), 1);
    assert_eq!(count_rows(&world.database, Table::EpisodesCharacters), 2);
}

#[then("the sync fails on a duplicate location")]
fn duplicate_location(#[from(sync_world)] world: &SyncWorld) {
    let outcome = world.outcome.borrow();
    let error = outcome
        .as_ref()
        .expect("outcome should exist")
        .as_ref()
        .expect_err("sync should fail");
    match error {
        CliError::Pipeline(PipelineError::Load(LoadError::ConstraintViolation {
            table, ..
        })) => assert_eq!(*table, Table::Locations),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(count_rows(&world.database, Table::Locations), 1);
}

#[scenario(
    path = "tests/features/sync_command.feature",
    name = "syncing into a fresh database"
)]
fn fresh_database(#[from(sync_world)] world: SyncWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sync_command.feature",
    name = "syncing twice without a reset"
)]
fn repeat_without_reset(#[from(sync_world)] world: SyncWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sync_command.feature",
    name = "resetting before a repeat sync"
)]
fn repeat_with_reset(#[from(sync_world)] world: SyncWorld) {
    let _ = world;
}
