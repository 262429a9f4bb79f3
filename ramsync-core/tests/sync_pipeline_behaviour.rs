//! Behavioural tests for the synchronisation driver.
//!
//! These tests use [`StaticPageSource`] and [`MemoryRowStore`] so the fixed
//! load order can be checked without network or database access.

use ramsync_core::test_support::fixtures::{
    character_json, character_url, episode_json, location_json, location_url,
};
use ramsync_core::test_support::{MemoryRowStore, STUB_BASE_URL, StaticPageSource};
use ramsync_core::{
    EndpointKind, FetchError, LoadError, PipelineError, SyncReport, Table, run_pipeline,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Outcome of a run together with the store it wrote into.
type RunCell = RefCell<Option<(Result<SyncReport, PipelineError>, MemoryRowStore)>>;

#[fixture]
fn source() -> RefCell<Option<StaticPageSource>> {
    RefCell::new(None)
}

#[fixture]
fn run() -> RunCell {
    RefCell::new(None)
}

fn small_universe() -> StaticPageSource {
    let locations = vec![
        location_json(1, "Planet", "Dimension C-137"),
        location_json(3, "Space station", "unknown"),
    ];
    let characters = vec![
        character_json(1, &location_url(1), &location_url(3)),
        character_json(2, "", &location_url(3)),
        character_json(3, "", ""),
    ];
    let episodes = vec![
        episode_json(1, &[character_url(1).as_str(), character_url(2).as_str()]),
        episode_json(2, &[character_url(3).as_str()]),
    ];
    StaticPageSource::default()
        .paginate(EndpointKind::Character, characters, 2)
        .paginate(EndpointKind::Location, locations, 1)
        .paginate(EndpointKind::Episode, episodes, 20)
}

fn run_into(
    source: &RefCell<Option<StaticPageSource>>,
    run: &RunCell,
    mut store: MemoryRowStore,
) {
    let guard = source.borrow();
    let upstream = guard.as_ref().expect("source must be initialised");
    let outcome = run_pipeline(upstream, &mut store);
    *run.borrow_mut() = Some((outcome, store));
}

// --- Given steps ---

#[given("an upstream with two locations, three characters and two episodes")]
fn upstream_small(#[from(source)] source: &RefCell<Option<StaticPageSource>>) {
    *source.borrow_mut() = Some(small_universe());
}

#[given("an upstream whose episode endpoint fails")]
fn upstream_episode_failure(#[from(source)] source: &RefCell<Option<StaticPageSource>>) {
    let url = format!("{STUB_BASE_URL}/episode");
    let upstream = StaticPageSource::default()
        .paginate(EndpointKind::Character, Vec::new(), 20)
        .paginate(EndpointKind::Location, Vec::new(), 20)
        .with_error(
            url.clone(),
            FetchError::Http {
                url,
                status: 500,
                message: "internal server error".to_string(),
            },
        );
    *source.borrow_mut() = Some(upstream);
}

// --- When steps ---

#[when("I run the synchronisation into an empty store")]
fn run_empty(
    #[from(source)] source: &RefCell<Option<StaticPageSource>>,
    #[from(run)] run: &RunCell,
) {
    run_into(source, run, MemoryRowStore::new());
}

#[when("I run the synchronisation into a store rejecting join rows")]
fn run_rejecting(
    #[from(source)] source: &RefCell<Option<StaticPageSource>>,
    #[from(run)] run: &RunCell,
) {
    run_into(
        source,
        run,
        MemoryRowStore::new().failing_on(Table::EpisodesCharacters),
    );
}

// --- Then steps ---

#[then("every table is loaded with locations first and join rows last")]
fn then_loaded_in_order(#[from(run)] run: &RunCell) {
    let borrowed = run.borrow();
    let (outcome, store) = borrowed.as_ref().expect("run must be recorded");
    let report = outcome.as_ref().expect("expected a successful run");
    assert_eq!(
        *report,
        SyncReport {
            locations: 2,
            characters: 3,
            episodes: 2,
            appearances: 3,
        }
    );
    let order: Vec<Table> = store.loads().iter().map(|(table, _)| *table).collect();
    assert_eq!(order, Table::LOAD_ORDER.to_vec());
}

#[then("the run fails naming the episode endpoint")]
fn then_episode_failure(#[from(run)] run: &RunCell) {
    let borrowed = run.borrow();
    let (outcome, _) = borrowed.as_ref().expect("run must be recorded");
    assert!(
        matches!(
            outcome,
            Err(PipelineError::Fetch {
                kind: EndpointKind::Episode,
                source: FetchError::Http { status: 500, .. },
            })
        ),
        "expected an episode fetch error, got {outcome:?}"
    );
}

#[then("nothing is loaded")]
fn then_nothing_loaded(#[from(run)] run: &RunCell) {
    let borrowed = run.borrow();
    let (_, store) = borrowed.as_ref().expect("run must be recorded");
    assert!(store.loads().is_empty(), "expected no committed batches");
}

#[then("the run fails naming the episodes_characters table")]
fn then_join_failure(#[from(run)] run: &RunCell) {
    let borrowed = run.borrow();
    let (outcome, _) = borrowed.as_ref().expect("run must be recorded");
    match outcome {
        Err(PipelineError::Load(err)) => assert_eq!(err.table(), Table::EpisodesCharacters),
        other => panic!("expected a join load error, got {other:?}"),
    }
    assert!(matches!(
        outcome,
        Err(PipelineError::Load(LoadError::Storage { .. }))
    ));
}

#[then("locations, characters and episodes remain loaded")]
fn then_parents_kept(#[from(run)] run: &RunCell) {
    let borrowed = run.borrow();
    let (_, store) = borrowed.as_ref().expect("run must be recorded");
    assert_eq!(store.row_count(Table::Locations), 2);
    assert_eq!(store.row_count(Table::Characters), 3);
    assert_eq!(store.row_count(Table::Episodes), 2);
    assert_eq!(store.row_count(Table::EpisodesCharacters), 0);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/sync_pipeline.feature", name = $title)]
        fn $fn_name(source: RefCell<Option<StaticPageSource>>, run: RunCell) {
            let _ = (source, run);
        }
    };
}

register_scenario!(
    loading_small_universe,
    "loading a small universe in dependency order"
);
register_scenario!(
    aborting_on_unreachable_endpoint,
    "aborting when the episode endpoint is unreachable"
);
register_scenario!(
    keeping_tables_after_join_failure,
    "keeping earlier tables when the join load fails"
);
