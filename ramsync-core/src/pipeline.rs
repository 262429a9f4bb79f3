//! Fetch-then-load driver.
//!
//! The sequence is fixed:
//!
//! 1. fetch characters, locations and episodes;
//! 2. load locations;
//! 3. load characters, which reference locations;
//! 4. load episodes;
//! 5. load the episode/character join rows, which reference both.
//!
//! Each load commits on its own. A failure in a later step leaves the
//! earlier tables committed; the run is not transactional end to end.

use log::info;
use thiserror::Error;

use crate::{
    EndpointKind,
    fetch::{FetchError, PageSource, RawRecord, fetch_all},
    rows::{Table, TableRow},
    store::{LoadError, RowStore},
    transform::{
        TransformError, number_appearances, to_character_row, to_episode_character_rows,
        to_episode_row, to_location_row,
    },
};

/// Raw records for every endpoint kind, in upstream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedRecords {
    /// Records from the `character` endpoint.
    pub characters: Vec<RawRecord>,
    /// Records from the `location` endpoint.
    pub locations: Vec<RawRecord>,
    /// Records from the `episode` endpoint.
    pub episodes: Vec<RawRecord>,
}

/// Row counts committed by a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows inserted into `locations`.
    pub locations: usize,
    /// Rows inserted into `characters`.
    pub characters: usize,
    /// Rows inserted into `episodes`.
    pub episodes: usize,
    /// Rows inserted into `episodes_characters`.
    pub appearances: usize,
}

/// Errors that abort a run, tagged with the failing step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Retrieving an endpoint failed.
    #[error("failed to fetch {kind} records: {source}")]
    Fetch {
        /// Endpoint being fetched.
        kind: EndpointKind,
        /// Underlying fetch error.
        #[source]
        source: FetchError,
    },
    /// A record could not be mapped into a row.
    #[error("failed to prepare {table} rows: {source}")]
    Transform {
        /// Table the rows were destined for.
        table: Table,
        /// Underlying transform error.
        #[source]
        source: TransformError,
    },
    /// A batch insert failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Fetch all three endpoint kinds.
pub fn fetch_records<S>(source: &S) -> Result<FetchedRecords, PipelineError>
where
    S: PageSource + ?Sized,
{
    let fetch = |kind: EndpointKind| -> Result<Vec<RawRecord>, PipelineError> {
        let records =
            fetch_all(source, kind).map_err(|err| PipelineError::Fetch { kind, source: err })?;
        info!("fetched {} {kind} records", records.len());
        Ok(records)
    };
    Ok(FetchedRecords {
        characters: fetch(EndpointKind::Character)?,
        locations: fetch(EndpointKind::Location)?,
        episodes: fetch(EndpointKind::Episode)?,
    })
}

/// Transform and load previously fetched records in dependency order.
pub fn load_records<L>(store: &mut L, records: FetchedRecords) -> Result<SyncReport, PipelineError>
where
    L: RowStore,
{
    let FetchedRecords {
        characters,
        locations,
        episodes,
    } = records;

    let locations = load_table(store, &transform_all(&locations, to_location_row)?)?;
    let characters = load_table(store, &transform_all(&characters, to_character_row)?)?;
    let episode_count = load_table(store, &transform_all(&episodes, to_episode_row)?)?;

    let appearances = episodes
        .iter()
        .map(to_episode_character_rows)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| PipelineError::Transform {
            table: Table::EpisodesCharacters,
            source,
        })?;
    let appearances = load_table(store, &number_appearances(appearances.into_iter().flatten()))?;

    Ok(SyncReport {
        locations,
        characters,
        episodes: episode_count,
        appearances,
    })
}

/// Run the complete synchronisation: fetch everything, then load.
///
/// # Examples
///
/// ```
/// use ramsync_core::test_support::{MemoryRowStore, StaticPageSource};
/// use ramsync_core::{EndpointKind, Table, run_pipeline};
///
/// let source = StaticPageSource::default()
///     .paginate(EndpointKind::Character, Vec::new(), 20)
///     .paginate(EndpointKind::Location, Vec::new(), 20)
///     .paginate(EndpointKind::Episode, Vec::new(), 20);
/// let mut store = MemoryRowStore::new();
///
/// let report = run_pipeline(&source, &mut store)?;
/// assert_eq!(report.episodes, 0);
/// assert_eq!(store.row_count(Table::Episodes), 0);
/// # Ok::<(), ramsync_core::PipelineError>(())
/// ```
pub fn run_pipeline<S, L>(source: &S, store: &mut L) -> Result<SyncReport, PipelineError>
where
    S: PageSource + ?Sized,
    L: RowStore,
{
    let records = fetch_records(source)?;
    let report = load_records(store, records)?;
    info!(
        "sync complete: {} locations, {} characters, {} episodes, {} appearances",
        report.locations, report.characters, report.episodes, report.appearances
    );
    Ok(report)
}

fn transform_all<R>(
    records: &[RawRecord],
    transform: fn(&RawRecord) -> Result<R, TransformError>,
) -> Result<Vec<R>, PipelineError>
where
    R: TableRow,
{
    records
        .iter()
        .map(transform)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| PipelineError::Transform {
            table: R::TABLE,
            source,
        })
}

fn load_table<L, R>(store: &mut L, rows: &[R]) -> Result<usize, PipelineError>
where
    L: RowStore,
    R: TableRow,
{
    let inserted = store.load(rows)?;
    info!("loaded {inserted} rows into {}", R::TABLE);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        MemoryRowStore, StaticPageSource,
        fixtures::{character_json, character_url, episode_json, location_json, location_url},
    };
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn universe() -> StaticPageSource {
        let locations = vec![
            location_json(1, "Planet", "Dimension C-137"),
            location_json(3, "Space station", ""),
        ];
        let characters = vec![
            character_json(1, &location_url(1), &location_url(3)),
            character_json(2, "", &location_url(3)),
            character_json(3, "", ""),
        ];
        let episodes = vec![
            episode_json(1, &[character_url(1).as_str(), character_url(2).as_str()]),
            episode_json(2, &[character_url(1).as_str(), character_url(3).as_str()]),
        ];
        StaticPageSource::default()
            .paginate(EndpointKind::Character, characters, 2)
            .paginate(EndpointKind::Location, locations, 2)
            .paginate(EndpointKind::Episode, episodes, 2)
    }

    #[rstest]
    fn loads_tables_in_dependency_order(universe: StaticPageSource) {
        let mut store = MemoryRowStore::new();

        let report = run_pipeline(&universe, &mut store).expect("pipeline should succeed");

        assert_eq!(
            report,
            SyncReport {
                locations: 2,
                characters: 3,
                episodes: 2,
                appearances: 4,
            }
        );
        let order: Vec<Table> = store.loads().iter().map(|(table, _)| *table).collect();
        assert_eq!(order, Table::LOAD_ORDER.to_vec());
    }

    #[rstest]
    fn fetches_every_endpoint_before_loading(universe: StaticPageSource) {
        let records = fetch_records(&universe).expect("fetch should succeed");

        assert_eq!(records.characters.len(), 3);
        assert_eq!(records.locations.len(), 2);
        assert_eq!(records.episodes.len(), 2);
    }

    #[rstest]
    fn fetch_failure_names_the_endpoint() {
        let source = StaticPageSource::default()
            .paginate(EndpointKind::Character, Vec::new(), 20)
            .paginate(EndpointKind::Episode, Vec::new(), 20);
        let mut store = MemoryRowStore::new();

        let err = run_pipeline(&source, &mut store).expect_err("missing endpoint should fail");

        assert!(
            matches!(
                err,
                PipelineError::Fetch {
                    kind: EndpointKind::Location,
                    source: FetchError::Http { status: 404, .. },
                }
            ),
            "unexpected error {err:?}"
        );
        assert!(store.loads().is_empty(), "nothing loads after a fetch error");
    }

    #[rstest]
    fn transform_failure_stops_before_dependent_tables() {
        let records = FetchedRecords {
            locations: vec![location_json(1, "Planet", "")],
            characters: vec![character_json(1, "https://rickandmortyapi.com/api/location/x", "")],
            episodes: Vec::new(),
        };
        let mut store = MemoryRowStore::new();

        let err = load_records(&mut store, records).expect_err("bad reference should fail");

        assert!(matches!(
            err,
            PipelineError::Transform {
                table: Table::Characters,
                ..
            }
        ));
        assert_eq!(store.loads(), &[(Table::Locations, 1)]);
    }

    #[rstest]
    fn join_failure_keeps_earlier_tables_committed(universe: StaticPageSource) {
        let mut store = MemoryRowStore::new().failing_on(Table::EpisodesCharacters);

        let err = run_pipeline(&universe, &mut store).expect_err("join load should fail");

        assert!(err.to_string().contains("episodes_characters"));
        assert_eq!(store.row_count(Table::Locations), 2);
        assert_eq!(store.row_count(Table::Characters), 3);
        assert_eq!(store.row_count(Table::Episodes), 2);
        assert_eq!(store.row_count(Table::EpisodesCharacters), 0);
    }

    #[rstest]
    fn dangling_character_reference_is_a_load_error() {
        let records = FetchedRecords {
            locations: vec![location_json(1, "Planet", "")],
            characters: vec![character_json(1, "", &location_url(99))],
            episodes: Vec::new(),
        };
        let mut store = MemoryRowStore::new();

        let err = load_records(&mut store, records).expect_err("missing parent should fail");

        assert!(
            matches!(
                err,
                PipelineError::Load(LoadError::ConstraintViolation {
                    table: Table::Characters,
                    ..
                })
            ),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    fn episode_without_characters_loads_no_join_rows() {
        let records = FetchedRecords {
            episodes: vec![json!({
                "id": 51,
                "name": "Rickmurai Jack",
                "air_date": "September 5, 2021",
                "episode": "S05E10",
                "characters": [],
                "url": "https://rickandmortyapi.com/api/episode/51",
                "created": "2021-10-15T17:00:24.105Z"
            })],
            ..FetchedRecords::default()
        };
        let mut store = MemoryRowStore::new();

        let report = load_records(&mut store, records).expect("load should succeed");

        assert_eq!(report.episodes, 1);
        assert_eq!(report.appearances, 0);
    }
}
