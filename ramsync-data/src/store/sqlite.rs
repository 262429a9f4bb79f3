use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use log::debug;
use ramsync_core::{LoadError, RowStore, SqlValue, Table, TableRow};
use rusqlite::{
    Connection, Error as SqliteError, ErrorCode, params_from_iter,
    types::{Null, ToSql, ToSqlOutput},
};
use thiserror::Error;

use super::schema::{SchemaError, initialise_schema, reset_schema};

/// Text layout used for `DATETIME` columns, e.g. `2017-11-10 12:56:33.798`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// [`RowStore`] writing into a SQLite database.
///
/// Each [`load`](RowStore::load) runs inside its own transaction: the batch
/// is inserted through one cached prepared statement and committed once. Any
/// failure rolls the whole batch back.
///
/// # Examples
/// ```
/// use ramsync_core::{Appearance, RowStore, number_appearances};
/// use ramsync_data::SqliteStore;
///
/// let mut store = SqliteStore::open_in_memory()?;
/// store.initialise_schema()?;
///
/// // Join rows need their parents, so an orphan batch is rejected whole.
/// let rows = number_appearances([Appearance { episode_id: 1, character_id: 1 }]);
/// assert!(store.load(&rows).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// Missing parent directories are created first.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, OpenStoreError> {
        let path = path.as_ref();
        ensure_parent_dir(path).map_err(|source| OpenStoreError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| OpenStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, OpenStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| OpenStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Wrap an existing connection, enabling foreign-key enforcement on it.
    pub fn from_connection(connection: Connection) -> Result<Self, OpenStoreError> {
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|source| OpenStoreError::ForeignKeys { source })?;
        Ok(Self { connection })
    }

    /// Create any missing destination tables.
    pub fn initialise_schema(&mut self) -> Result<(), SchemaError> {
        initialise_schema(&mut self.connection)
    }

    /// Drop and recreate the destination tables.
    pub fn reset_schema(&mut self) -> Result<(), SchemaError> {
        reset_schema(&mut self.connection)
    }

    /// Borrow the underlying connection for queries.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl RowStore for SqliteStore {
    fn load<R: TableRow>(&mut self, rows: &[R]) -> Result<usize, LoadError> {
        let table = R::TABLE;
        if rows.is_empty() {
            return Ok(0);
        }

        let transaction = self
            .connection
            .transaction()
            .map_err(|source| load_error(table, "begin load transaction", &source))?;

        {
            let mut insert = transaction
                .prepare_cached(&insert_statement(table))
                .map_err(|source| load_error(table, "prepare insert", &source))?;
            for row in rows {
                let values: Vec<Bind<'_>> = row.values().into_iter().map(Bind).collect();
                insert
                    .execute(params_from_iter(values.iter()))
                    .map_err(|source| load_error(table, "insert row", &source))?;
            }
        }

        transaction
            .commit()
            .map_err(|source| load_error(table, "commit load transaction", &source))?;

        debug!("committed {} rows into {table}", rows.len());
        Ok(rows.len())
    }
}

/// Errors raised while opening a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum OpenStoreError {
    /// The parent directory of the database file could not be created.
    #[error("failed to create directory for SQLite database at {path}")]
    CreateDir {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// SQLite could not open the database.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// `PRAGMA foreign_keys` could not be enabled.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
}

struct Bind<'a>(SqlValue<'a>);

impl ToSql for Bind<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            SqlValue::Integer(value) => ToSqlOutput::from(value),
            SqlValue::Text(value) => ToSqlOutput::from(value),
            SqlValue::Timestamp(value) => {
                ToSqlOutput::from(value.format(TIMESTAMP_FORMAT).to_string())
            }
            SqlValue::Null => ToSqlOutput::from(Null),
        })
    }
}

fn insert_statement(table: Table) -> String {
    let columns = table.columns();
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

fn load_error(table: Table, operation: &'static str, source: &SqliteError) -> LoadError {
    match source.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => LoadError::ConstraintViolation {
            table,
            message: source.to_string(),
        },
        _ => LoadError::Storage {
            table,
            operation,
            message: source.to_string(),
        },
    }
}

/// Create the parent directory of `path` through a capability rooted at the
/// path's leading anchor (root, prefix or `..` chain).
fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };

    let mut base = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in parent.components() {
        match component {
            Utf8Component::Normal(_) => relative.push(component),
            _ if relative.as_str().is_empty() => base.push(component),
            _ => relative.push(component),
        }
    }
    if relative.as_str().is_empty() {
        return Ok(());
    }
    if base.as_str().is_empty() {
        base.push(".");
    }

    Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}
