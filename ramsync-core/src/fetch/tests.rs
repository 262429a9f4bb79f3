//! Unit tests for the pagination walk.

use super::*;
use crate::test_support::{STUB_BASE_URL, StaticPageSource};
use rstest::{fixture, rstest};
use serde_json::json;

fn numbered(range: std::ops::RangeInclusive<i64>) -> Vec<RawRecord> {
    range.map(|id| json!({ "id": id })).collect()
}

fn ids(records: &[RawRecord]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(serde_json::Value::as_i64))
        .collect()
}

#[fixture]
fn three_pages() -> StaticPageSource {
    let first = format!("{STUB_BASE_URL}/character");
    StaticPageSource::default()
        .with_page(
            first.clone(),
            Page::new(numbered(1..=2), Some(format!("{first}?page=2"))).with_total(5),
        )
        .with_page(
            format!("{first}?page=2"),
            Page::new(numbered(3..=4), Some(format!("{first}?page=3"))).with_total(5),
        )
        .with_page(
            format!("{first}?page=3"),
            Page::new(numbered(5..=5), None).with_total(5),
        )
}

#[rstest]
fn accumulates_every_page_in_order(three_pages: StaticPageSource) {
    let records = fetch_all(&three_pages, EndpointKind::Character).expect("walk should succeed");

    assert_eq!(records.len(), 2 + 2 + 1);
    assert_eq!(ids(&records), vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn stops_when_next_is_absent(three_pages: StaticPageSource) {
    fetch_all(&three_pages, EndpointKind::Character).expect("walk should succeed");

    let first = format!("{STUB_BASE_URL}/character");
    assert_eq!(
        three_pages.requests(),
        vec![
            first.clone(),
            format!("{first}?page=2"),
            format!("{first}?page=3")
        ]
    );
}

#[rstest]
fn treats_empty_next_link_as_last_page() {
    let first = format!("{STUB_BASE_URL}/location");
    let source = StaticPageSource::default()
        .with_page(first, Page::new(numbered(1..=3), Some(String::new())));

    let records = fetch_all(&source, EndpointKind::Location).expect("walk should succeed");

    assert_eq!(records.len(), 3);
    assert_eq!(source.requests().len(), 1);
}

#[rstest]
fn propagates_transport_errors() {
    let first = format!("{STUB_BASE_URL}/episode");
    let failing = format!("{first}?page=2");
    let source = StaticPageSource::default()
        .with_page(first, Page::new(numbered(1..=2), Some(failing.clone())))
        .with_error(
            failing.clone(),
            FetchError::Network {
                url: failing.clone(),
                message: "connection reset".into(),
            },
        );

    let err = fetch_all(&source, EndpointKind::Episode).expect_err("walk should fail");

    assert_eq!(
        err,
        FetchError::Network {
            url: failing,
            message: "connection reset".into(),
        }
    );
}

#[rstest]
fn rejects_links_back_to_a_visited_page() {
    let first = format!("{STUB_BASE_URL}/episode");
    let second = format!("{first}?page=2");
    let source = StaticPageSource::default()
        .with_page(first.clone(), Page::new(numbered(1..=1), Some(second.clone())))
        .with_page(second, Page::new(numbered(2..=2), Some(first.clone())));

    let err = fetch_all(&source, EndpointKind::Episode).expect_err("cycle should be rejected");

    assert_eq!(err, FetchError::PaginationCycle { url: first });
}

#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(20, 1)]
#[case(21, 2)]
#[case(60, 3)]
fn paginated_stub_returns_every_record(#[case] count: i64, #[case] pages: usize) {
    let records: Vec<RawRecord> = (1..=count).map(|id| json!({ "id": id })).collect();
    let source = StaticPageSource::default().paginate(EndpointKind::Character, records, 20);

    let fetched = fetch_all(&source, EndpointKind::Character).expect("walk should succeed");

    assert_eq!(ids(&fetched), (1..=count).collect::<Vec<_>>());
    assert_eq!(source.requests().len(), pages);
}
