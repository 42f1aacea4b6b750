//! Store migration system for cardbox.
//!
//! Schema changes are declared in a version-keyed [`MIGRATIONS`] table and
//! applied sequentially from the version recorded in the store up to
//! [`CURRENT_VERSION`]. Every step is a list of idempotent structural
//! statements; a version that shipped without structural changes stays in
//! the table as an explicit empty step rather than being omitted.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// A single schema version transition.
struct Migration {
    /// The version this step migrates the store up to.
    version: i32,
    /// Human-readable summary, logged when the step runs.
    description: &'static str,
    /// Idempotent structural statements, run in order.
    statements: &'static [&'static str],
}

/// All schema versions, in ascending order.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create cards store and secondary indexes",
        statements: schema::V1_STATEMENTS,
    },
    // Version 2 shipped without structural changes: the original deployment
    // bumped the version but could not alter an already-existing store.
    // Kept as an explicit no-op so the version history stays complete.
    Migration {
        version: 2,
        description: "no structural change (historical no-op)",
        statements: &[],
    },
];

/// Initialize the store schema.
///
/// Creates the metadata table if needed, then applies every pending
/// migration to bring the store up to [`CURRENT_VERSION`]. Safe to call on
/// an already-current store.
///
/// # Errors
///
/// Returns an error if a statement fails or the stored version is newer
/// than this build supports.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(schema::CREATE_METADATA_TABLE, [])?;

    let stored = get_schema_version(conn)?;
    if stored > CURRENT_VERSION {
        return Err(Error::migration(format!(
            "store version {stored} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if stored < CURRENT_VERSION {
        run_migrations(conn, stored)?;
        info!(
            "card store migrated from version {} to {}",
            stored, CURRENT_VERSION
        );
    }

    Ok(())
}

/// Get the current schema version from the store.
///
/// Returns 0 if no version is set (fresh store).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::migration(format!("invalid schema version: {value}"))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the store.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply every migration above `from_version`, recording the version after
/// each step so a failure leaves the store resumable.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        debug!(
            "applying store migration v{}: {}",
            migration.version, migration.description
        );
        for statement in migration.statements {
            conn.execute(statement, [])?;
        }
        set_schema_version(conn, migration.version)?;
    }
    Ok(())
}
