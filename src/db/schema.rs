//! Schema bootstrap, versioned with SQLite's `user_version` pragma.
//!
//! There is a single schema, embedded from `schema.sql`. Its statements are
//! `IF NOT EXISTS`, so a database created by an earlier tool with the same
//! tables is adopted rather than rebuilt.

use rusqlite::Connection;

use super::DbError;

pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub(crate) fn user_version(conn: &Connection) -> Result<i32, DbError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Create the tables if this database has not been stamped yet.
///
/// Returns true when the schema was written. A database stamped with a newer
/// version than this binary knows is refused untouched.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<bool, DbError> {
    let found = user_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::Schema(format!(
            "database is at schema version {} but this brokerday only knows {}; upgrade brokerday",
            found, SCHEMA_VERSION
        )));
    }
    if found == SCHEMA_VERSION {
        return Ok(false);
    }

    conn.execute_batch(&format!(
        "BEGIN;\n{}\nPRAGMA user_version = {};\nCOMMIT;",
        SCHEMA_SQL, SCHEMA_VERSION
    ))?;
    log::info!("Initialized database schema v{}", SCHEMA_VERSION);
    Ok(true)
}
