use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

/// Initialise the four destination tables inside an existing database.
///
/// Foreign keys are enabled on the connection and every table is created if
/// missing. Existing tables and rows are left untouched.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use ramsync_data::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create tables");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 4);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    in_schema_transaction(connection, create_tables)
}

/// Drop and recreate the destination tables, discarding all rows.
///
/// Tables are dropped children first so foreign keys never dangle.
pub fn reset_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    in_schema_transaction(connection, |transaction| {
        drop_tables(transaction)?;
        create_tables(transaction)
    })
}

fn in_schema_transaction<F>(connection: &mut Connection, apply: F) -> Result<(), SchemaError>
where
    F: FnOnce(&Transaction<'_>) -> Result<(), SchemaError>,
{
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    apply(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create episodes",
        "CREATE TABLE IF NOT EXISTS episodes (
            id INTEGER NOT NULL PRIMARY KEY,
            name VARCHAR(70) NOT NULL,
            air_date VARCHAR(30) NOT NULL,
            episode VARCHAR(6) NOT NULL,
            url VARCHAR(50) NOT NULL,
            created DATETIME NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create locations",
        "CREATE TABLE IF NOT EXISTS locations (
            id INTEGER NOT NULL PRIMARY KEY,
            name VARCHAR(50) NOT NULL,
            type VARCHAR(30),
            dimension VARCHAR(30),
            url VARCHAR(50) NOT NULL,
            created DATETIME NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create characters",
        "CREATE TABLE IF NOT EXISTS characters (
            id INTEGER NOT NULL PRIMARY KEY,
            name VARCHAR(60) NOT NULL,
            status VARCHAR(15) NOT NULL,
            species VARCHAR(30) NOT NULL,
            type VARCHAR(20),
            gender VARCHAR(15) NOT NULL,
            image VARCHAR(50) NOT NULL,
            url VARCHAR(50) NOT NULL,
            created DATETIME NOT NULL,
            origin_id INTEGER,
            location_id INTEGER,
            FOREIGN KEY (origin_id) REFERENCES locations(id) ON DELETE CASCADE,
            FOREIGN KEY (location_id) REFERENCES locations(id) ON DELETE CASCADE
        )",
    )?;
    run_migration_step(
        transaction,
        "create episodes_characters",
        "CREATE TABLE IF NOT EXISTS episodes_characters (
            id INTEGER NOT NULL PRIMARY KEY,
            episode_id INTEGER NOT NULL,
            character_id INTEGER NOT NULL,
            FOREIGN KEY (episode_id) REFERENCES episodes(id) ON DELETE CASCADE,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )",
    )?;
    run_migration_step(
        transaction,
        "index episodes_characters",
        "CREATE INDEX IF NOT EXISTS idx_episodes_characters_character
            ON episodes_characters(character_id, episode_id)",
    )
}

fn drop_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "drop episodes_characters",
        "DROP TABLE IF EXISTS episodes_characters",
    )?;
    run_migration_step(transaction, "drop characters", "DROP TABLE IF EXISTS characters")?;
    run_migration_step(transaction, "drop episodes", "DROP TABLE IF EXISTS episodes")?;
    run_migration_step(transaction, "drop locations", "DROP TABLE IF EXISTS locations")
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when creating or resetting the destination tables.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// `PRAGMA foreign_keys` could not be enabled.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// A DDL statement failed.
    #[error("failed to execute schema step '{step}'")]
    Migration {
        /// Step being executed.
        step: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
}
