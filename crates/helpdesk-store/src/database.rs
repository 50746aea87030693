//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.  Identifier generation goes
//! through the injected [`IdGen`] so tests can use a deterministic source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use helpdesk_shared::{IdGen, RandomIds};

use crate::error::Result;
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    ids: Arc<dyn IdGen>,
}

impl Database {
    /// Open (or create) a database at an explicit path with random ids.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_at(path, Arc::new(RandomIds))
    }

    /// Open (or create) a database at an explicit path with an injected id
    /// source.  Tests use this with a sequential generator.
    pub fn open_at(path: &Path, ids: Arc<dyn IdGen>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        Ok(Self { conn, ids })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying connection.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// The id source this database assigns new record ids from.
    pub fn ids(&self) -> Arc<dyn IdGen> {
        self.ids.clone()
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
