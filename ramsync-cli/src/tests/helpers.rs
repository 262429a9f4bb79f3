//! Fixtures shared by the pipeline tests and behaviour steps.

use camino::Utf8Path;
use ramsync_core::EndpointKind;
use ramsync_core::Table;
use ramsync_core::test_support::StaticPageSource;
use ramsync_core::test_support::fixtures::{
    character_json, character_url, episode_json, location_json, location_url,
};
use rusqlite::Connection;

/// One location, two characters (one homeless) and one episode featuring both.
pub(super) fn small_upstream() -> StaticPageSource {
    StaticPageSource::default()
        .paginate(
            EndpointKind::Location,
            vec![location_json(1, "Planet", "Dimension C-137")],
            20,
        )
        .paginate(
            EndpointKind::Character,
            vec![
                character_json(1, &location_url(1), &location_url(1)),
                character_json(2, "", ""),
            ],
            1,
        )
        .paginate(
            EndpointKind::Episode,
            vec![episode_json(
                1,
                &[character_url(1).as_str(), character_url(2).as_str()],
            )],
            20,
        )
}

pub(super) fn count_rows(database: &Utf8Path, table: Table) -> i64 {
    let conn = Connection::open(database.as_std_path()).expect("open database");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .expect("count rows")
}
