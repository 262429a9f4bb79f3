//! Typed rows for the four destination tables.
//!
//! Each row type knows its [`Table`], its primary key, the foreign keys it
//! references and how to present its columns as [`SqlValue`]s in the order
//! given by [`Table::columns`]. Storage adapters bind those values without
//! knowing the concrete row type.

use std::fmt;

use chrono::NaiveDateTime;

/// Destination tables, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Locations, the parent of characters.
    Locations,
    /// Characters, referencing locations.
    Characters,
    /// Episodes.
    Episodes,
    /// Join rows linking episodes and characters.
    EpisodesCharacters,
}

impl Table {
    /// Tables ordered so every parent precedes its children.
    pub const LOAD_ORDER: [Self; 4] = [
        Self::Locations,
        Self::Characters,
        Self::Episodes,
        Self::EpisodesCharacters,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::Characters => "characters",
            Self::Episodes => "episodes",
            Self::EpisodesCharacters => "episodes_characters",
        }
    }

    /// Column names in binding order. The first column is always `id`.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Locations => &["id", "name", "type", "dimension", "url", "created"],
            Self::Characters => &[
                "id",
                "name",
                "status",
                "species",
                "type",
                "gender",
                "image",
                "url",
                "created",
                "origin_id",
                "location_id",
            ],
            Self::Episodes => &["id", "name", "air_date", "episode", "url", "created"],
            Self::EpisodesCharacters => &["id", "episode_id", "character_id"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column value ready to be bound to a statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlValue<'a> {
    /// Integer column.
    Integer(i64),
    /// Text column.
    Text(&'a str),
    /// Timestamp column, UTC without zone.
    Timestamp(NaiveDateTime),
    /// SQL `NULL`.
    Null,
}

impl<'a> SqlValue<'a> {
    fn optional_text(value: Option<&'a str>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }

    fn optional_integer(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

/// A row that can be inserted into one destination table.
pub trait TableRow {
    /// Table receiving rows of this type.
    const TABLE: Table;

    /// Primary key.
    fn id(&self) -> i64;

    /// Column values in the order of [`Table::columns`].
    fn values(&self) -> Vec<SqlValue<'_>>;

    /// Parent rows this row points at, as `(table, id)` pairs.
    fn references(&self) -> Vec<(Table, i64)> {
        Vec::new()
    }
}

/// A row of the `episodes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRow {
    /// Source-assigned identifier.
    pub id: i64,
    /// Episode title.
    pub name: String,
    /// Air date as free text (e.g. `December 2, 2013`).
    pub air_date: String,
    /// Episode code (e.g. `S01E01`).
    pub episode: String,
    /// Canonical API URL of the episode.
    pub url: String,
    /// Creation timestamp in the upstream database.
    pub created: NaiveDateTime,
}

impl TableRow for EpisodeRow {
    const TABLE: Table = Table::Episodes;

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Integer(self.id),
            SqlValue::Text(&self.name),
            SqlValue::Text(&self.air_date),
            SqlValue::Text(&self.episode),
            SqlValue::Text(&self.url),
            SqlValue::Timestamp(self.created),
        ]
    }
}

/// A row of the `locations` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRow {
    /// Source-assigned identifier.
    pub id: i64,
    /// Location name.
    pub name: String,
    /// Location type (`Planet`, `Space station`, ...), if known.
    pub kind: Option<String>,
    /// Dimension, if known.
    pub dimension: Option<String>,
    /// Canonical API URL of the location.
    pub url: String,
    /// Creation timestamp in the upstream database.
    pub created: NaiveDateTime,
}

impl TableRow for LocationRow {
    const TABLE: Table = Table::Locations;

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Integer(self.id),
            SqlValue::Text(&self.name),
            SqlValue::optional_text(self.kind.as_deref()),
            SqlValue::optional_text(self.dimension.as_deref()),
            SqlValue::Text(&self.url),
            SqlValue::Timestamp(self.created),
        ]
    }
}

/// A row of the `characters` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRow {
    /// Source-assigned identifier.
    pub id: i64,
    /// Character name.
    pub name: String,
    /// Life status (`Alive`, `Dead`, `unknown`).
    pub status: String,
    /// Species.
    pub species: String,
    /// Subspecies or type, if known.
    pub kind: Option<String>,
    /// Gender.
    pub gender: String,
    /// Avatar image URL.
    pub image: String,
    /// Canonical API URL of the character.
    pub url: String,
    /// Creation timestamp in the upstream database.
    pub created: NaiveDateTime,
    /// Origin location, if known.
    pub origin_id: Option<i64>,
    /// Last known location, if known.
    pub location_id: Option<i64>,
}

impl TableRow for CharacterRow {
    const TABLE: Table = Table::Characters;

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Integer(self.id),
            SqlValue::Text(&self.name),
            SqlValue::Text(&self.status),
            SqlValue::Text(&self.species),
            SqlValue::optional_text(self.kind.as_deref()),
            SqlValue::Text(&self.gender),
            SqlValue::Text(&self.image),
            SqlValue::Text(&self.url),
            SqlValue::Timestamp(self.created),
            SqlValue::optional_integer(self.origin_id),
            SqlValue::optional_integer(self.location_id),
        ]
    }

    fn references(&self) -> Vec<(Table, i64)> {
        [self.origin_id, self.location_id]
            .into_iter()
            .flatten()
            .map(|id| (Table::Locations, id))
            .collect()
    }
}

/// A character's appearance in an episode, before a join id is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    /// Episode the character appears in.
    pub episode_id: i64,
    /// Character appearing.
    pub character_id: i64,
}

/// A row of the `episodes_characters` join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCharacterRow {
    /// Synthetic identifier, numbered from 1 in production order.
    pub id: i64,
    /// Referenced episode.
    pub episode_id: i64,
    /// Referenced character.
    pub character_id: i64,
}

impl TableRow for EpisodeCharacterRow {
    const TABLE: Table = Table::EpisodesCharacters;

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue<'_>> {
        vec![
            SqlValue::Integer(self.id),
            SqlValue::Integer(self.episode_id),
            SqlValue::Integer(self.character_id),
        ]
    }

    fn references(&self) -> Vec<(Table, i64)> {
        vec![
            (Table::Episodes, self.episode_id),
            (Table::Characters, self.character_id),
        ]
    }
}
