//! Dinosaur Storage Layer
//!
//! Implements the DinosaurStore trait on top of SQLite.
//!
//! # Architecture
//!
//! - A single `dinosaur` table holds every record
//! - Ids come from SQLite's `AUTOINCREMENT` and are never reused
//! - Create and delete are single `RETURNING` statements
//!
//! # Examples
//!
//! ```no_run
//! use dinosaur_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for dinosaur operations
//! ```

#![warn(missing_docs)]

use dinosaur_domain::traits::DinosaurStore;
use dinosaur_domain::{Dinosaur, DinosaurId, NewDinosaur};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection string could not be interpreted
    #[error("Invalid database url: {0}")]
    InvalidUrl(String),
}

/// SQLite-based implementation of DinosaurStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a mutex,
/// or give each thread its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dinosaur_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("dinosaurs.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a store from a connection string
    ///
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `file:` URIs, bare paths
    /// and `:memory:`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dinosaur_store::SqliteStore;
    ///
    /// let store = SqliteStore::open("sqlite://:memory:").unwrap();
    /// ```
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let path = database_path(url)?;
        debug!("Opening SQLite database at {}", path);
        Self::new(path)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Map a `(id, name, description)` row to a Dinosaur
    fn row_to_dinosaur(row: &Row<'_>) -> rusqlite::Result<Dinosaur> {
        Ok(Dinosaur {
            id: DinosaurId::from_value(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }
}

/// Strip the scheme from a connection string, leaving what SQLite opens
fn database_path(url: &str) -> Result<&str, StoreError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
        .trim();

    if path.is_empty() {
        return Err(StoreError::InvalidUrl(url.to_string()));
    }

    Ok(path)
}

impl DinosaurStore for SqliteStore {
    type Error = StoreError;

    fn list_dinosaurs(&self) -> Result<Vec<Dinosaur>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM dinosaur ORDER BY id")?;

        let dinosaurs = stmt
            .query_map([], Self::row_to_dinosaur)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dinosaurs)
    }

    fn get_dinosaur(&self, id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error> {
        let dinosaur = self
            .conn
            .query_row(
                "SELECT id, name, description FROM dinosaur WHERE id = ?1",
                params![id.value()],
                Self::row_to_dinosaur,
            )
            .optional()?;

        Ok(dinosaur)
    }

    fn create_dinosaur(&mut self, dinosaur: NewDinosaur) -> Result<Dinosaur, Self::Error> {
        let created = self.conn.query_row(
            "INSERT INTO dinosaur (name, description) VALUES (?1, ?2)
             RETURNING id, name, description",
            params![&dinosaur.name, &dinosaur.description],
            Self::row_to_dinosaur,
        )?;

        Ok(created)
    }

    fn delete_dinosaur(&mut self, id: DinosaurId) -> Result<Option<Dinosaur>, Self::Error> {
        let deleted = self
            .conn
            .query_row(
                "DELETE FROM dinosaur WHERE id = ?1 RETURNING id, name, description",
                params![id.value()],
                Self::row_to_dinosaur,
            )
            .optional()?;

        Ok(deleted)
    }

    fn count_dinosaurs(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dinosaur", [], |row| row.get(0))?;

        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("Negative row count: {}", count)))
    }
}
