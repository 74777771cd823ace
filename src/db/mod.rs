//! SQLite store for clients, documents, appointments and the task log.
//!
//! The database lives at `~/.brokerday/brokerday.db` unless the config names
//! another path. Every statement commits on its own; no transaction spans
//! more than one call.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

pub mod clients;
pub mod schema;
pub mod tasks;
pub mod types;
pub use types::*;

pub struct BrokerDb {
    conn: Connection,
}

impl BrokerDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `path` and apply the schema.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL so the CLI history view can read while a run writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        schema::ensure_schema(&conn)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Open an existing database read-only (history and client listings).
    pub fn open_readonly_at(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }
}

pub mod test_utils {
    use super::BrokerDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the test.
    pub fn test_db() -> BrokerDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        BrokerDb::open_at(path).expect("Failed to open test database")
    }

    /// Insert a client and return its row id.
    pub fn insert_client(
        db: &BrokerDb,
        name: &str,
        email: Option<&str>,
        status: &str,
        last_contacted: Option<&str>,
    ) -> i64 {
        db.conn_ref()
            .execute(
                "INSERT INTO clients (name, email, status, last_contacted) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, email, status, last_contacted],
            )
            .expect("insert client");
        db.conn_ref().last_insert_rowid()
    }
}
