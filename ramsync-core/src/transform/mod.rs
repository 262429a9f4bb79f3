//! Mapping of raw API records into typed rows.
//!
//! The upstream serves denormalised JSON: optional attributes arrive as empty
//! strings, timestamps as ISO-8601 text, and relationships as full resource
//! URLs. The functions here normalise those shapes:
//!
//! - empty optional strings become `None` (stored as `NULL`);
//! - `created` is parsed from `%Y-%m-%dT%H:%M:%S.%3fZ`;
//! - reference URLs resolve to the numeric id in their final path segment,
//!   with an empty URL meaning "no reference".
//!
//! Every function is pure and reports failures with the entity kind, record
//! id and field involved.

mod error;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    EndpointKind,
    fetch::RawRecord,
    rows::{Appearance, CharacterRow, EpisodeCharacterRow, EpisodeRow, LocationRow},
};

pub use error::TransformError;

/// Upstream timestamp layout with exactly three fractional digits, e.g.
/// `2017-11-10T12:42:04.162Z`.
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3fZ";

/// Map a raw episode record into an [`EpisodeRow`].
///
/// # Examples
///
/// ```
/// use ramsync_core::to_episode_row;
/// use serde_json::json;
///
/// let raw = json!({
///     "id": 1,
///     "name": "Pilot",
///     "air_date": "December 2, 2013",
///     "episode": "S01E01",
///     "characters": ["https://rickandmortyapi.com/api/character/1"],
///     "url": "https://rickandmortyapi.com/api/episode/1",
///     "created": "2017-11-10T12:56:33.798Z"
/// });
///
/// let row = to_episode_row(&raw)?;
/// assert_eq!(row.episode, "S01E01");
/// # Ok::<(), ramsync_core::TransformError>(())
/// ```
pub fn to_episode_row(raw: &RawRecord) -> Result<EpisodeRow, TransformError> {
    let kind = EndpointKind::Episode;
    let record: RawEpisode = decode(kind, raw)?;
    let created = parse_created(kind, record.id, &record.created)?;
    Ok(EpisodeRow {
        id: record.id,
        name: record.name,
        air_date: record.air_date,
        episode: record.episode,
        url: record.url,
        created,
    })
}

/// Map a raw location record into a [`LocationRow`].
///
/// Empty `type` and `dimension` values become `None`.
pub fn to_location_row(raw: &RawRecord) -> Result<LocationRow, TransformError> {
    let kind = EndpointKind::Location;
    let record: RawLocation = decode(kind, raw)?;
    let created = parse_created(kind, record.id, &record.created)?;
    Ok(LocationRow {
        id: record.id,
        name: record.name,
        kind: non_empty(record.kind),
        dimension: non_empty(record.dimension),
        url: record.url,
        created,
    })
}

/// Map a raw character record into a [`CharacterRow`].
///
/// `origin_id` and `location_id` come from the trailing segment of the
/// embedded `origin.url` and `location.url`; an empty URL yields `None`.
///
/// # Examples
///
/// ```
/// use ramsync_core::to_character_row;
/// use serde_json::json;
///
/// let raw = json!({
///     "id": 2,
///     "name": "Morty Smith",
///     "status": "Alive",
///     "species": "Human",
///     "type": "",
///     "gender": "Male",
///     "origin": { "name": "unknown", "url": "" },
///     "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
///     "image": "https://rickandmortyapi.com/api/character/avatar/2.jpeg",
///     "episode": [],
///     "url": "https://rickandmortyapi.com/api/character/2",
///     "created": "2017-11-04T18:50:21.651Z"
/// });
///
/// let row = to_character_row(&raw)?;
/// assert_eq!(row.kind, None);
/// assert_eq!(row.origin_id, None);
/// assert_eq!(row.location_id, Some(3));
/// # Ok::<(), ramsync_core::TransformError>(())
/// ```
pub fn to_character_row(raw: &RawRecord) -> Result<CharacterRow, TransformError> {
    let kind = EndpointKind::Character;
    let record: RawCharacter = decode(kind, raw)?;
    let created = parse_created(kind, record.id, &record.created)?;
    let origin_id = reference_id(kind, record.id, "origin.url", &record.origin.url)?;
    let location_id = reference_id(kind, record.id, "location.url", &record.location.url)?;
    Ok(CharacterRow {
        id: record.id,
        name: record.name,
        status: record.status,
        species: record.species,
        kind: non_empty(record.kind),
        gender: record.gender,
        image: record.image,
        url: record.url,
        created,
        origin_id,
        location_id,
    })
}

/// List the characters appearing in a raw episode record.
///
/// One [`Appearance`] is produced per entry of the episode's `characters`
/// array, in array order. Every entry must resolve to a numeric id.
pub fn to_episode_character_rows(raw_episode: &RawRecord) -> Result<Vec<Appearance>, TransformError> {
    let kind = EndpointKind::Episode;
    let record: RawEpisodeCast = decode(kind, raw_episode)?;
    record
        .characters
        .iter()
        .map(|url| {
            required_reference_id(kind, record.id, "characters", url).map(|character_id| {
                Appearance {
                    episode_id: record.id,
                    character_id,
                }
            })
        })
        .collect()
}

/// Assign synthetic join ids, numbering from 1 in iteration order.
///
/// # Examples
///
/// ```
/// use ramsync_core::{Appearance, number_appearances};
///
/// let rows = number_appearances([
///     Appearance { episode_id: 1, character_id: 1 },
///     Appearance { episode_id: 1, character_id: 2 },
/// ]);
/// assert_eq!(rows[1].id, 2);
/// assert_eq!(rows[1].character_id, 2);
/// ```
pub fn number_appearances<I>(appearances: I) -> Vec<EpisodeCharacterRow>
where
    I: IntoIterator<Item = Appearance>,
{
    (1_i64..)
        .zip(appearances)
        .map(|(id, appearance)| EpisodeCharacterRow {
            id,
            episode_id: appearance.episode_id,
            character_id: appearance.character_id,
        })
        .collect()
}

fn decode<'de, T>(kind: EndpointKind, raw: &'de RawRecord) -> Result<T, TransformError>
where
    T: Deserialize<'de>,
{
    T::deserialize(raw).map_err(|err| TransformError::Malformed {
        kind,
        record_id: raw.get("id").and_then(Value::as_i64),
        message: err.to_string(),
    })
}

fn parse_created(
    kind: EndpointKind,
    record_id: i64,
    value: &str,
) -> Result<NaiveDateTime, TransformError> {
    NaiveDateTime::parse_from_str(value, CREATED_FORMAT).map_err(|source| {
        TransformError::InvalidTimestamp {
            kind,
            record_id,
            field: "created",
            value: value.to_owned(),
            source,
        }
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

fn reference_id(
    kind: EndpointKind,
    record_id: i64,
    field: &'static str,
    url: &str,
) -> Result<Option<i64>, TransformError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_trailing_id(trimmed)
        .map(Some)
        .ok_or_else(|| TransformError::InvalidReference {
            kind,
            record_id,
            field,
            url: url.to_owned(),
        })
}

fn required_reference_id(
    kind: EndpointKind,
    record_id: i64,
    field: &'static str,
    url: &str,
) -> Result<i64, TransformError> {
    reference_id(kind, record_id, field, url)?.ok_or_else(|| TransformError::InvalidReference {
        kind,
        record_id,
        field,
        url: url.to_owned(),
    })
}

fn parse_trailing_id(url: &str) -> Option<i64> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[derive(Debug, Deserialize)]
struct RawEpisode {
    id: i64,
    name: String,
    air_date: String,
    episode: String,
    url: String,
    created: String,
}

#[derive(Debug, Deserialize)]
struct RawEpisodeCast {
    id: i64,
    #[serde(default)]
    characters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    id: i64,
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    dimension: Option<String>,
    url: String,
    created: String,
}

#[derive(Debug, Deserialize)]
struct RawCharacter {
    id: i64,
    name: String,
    status: String,
    species: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    gender: String,
    #[serde(default)]
    origin: RawReference,
    #[serde(default)]
    location: RawReference,
    image: String,
    url: String,
    created: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawReference {
    #[serde(default)]
    url: String,
}
