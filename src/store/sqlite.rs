//! SQLite-backed [`ConversationStore`].
//!
//! The connection string names a directory; the database name picks the file inside
//! it and the collection name picks the table. `:memory:` opens a private in-memory
//! store instead.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::schema;
use super::ConversationStore;
use crate::config::{expand_tilde, StoreConfig};
use crate::conversation::types::ConversationRecord;
use crate::error::StorageError;

/// Connection string that selects an in-memory store.
pub const IN_MEMORY_URI: &str = ":memory:";

/// Where a store's data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str(IN_MEMORY_URI),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl StoreLocation {
    /// Resolve the database location from a store config without opening it.
    pub fn resolve(config: &StoreConfig) -> Self {
        if config.uri == IN_MEMORY_URI {
            Self::Memory
        } else {
            Self::File(expand_tilde(&config.uri).join(format!("{}.db", config.database)))
        }
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
    collection: String,
    location: StoreLocation,
}

impl SqliteStore {
    /// Open (or create) the store described by `config`, with schema initialized.
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        if !schema::is_valid_identifier(&config.collection) {
            return Err(StorageError::InvalidName(config.collection.clone()));
        }
        if !schema::is_valid_identifier(&config.database) {
            return Err(StorageError::InvalidName(config.database.clone()));
        }

        let location = StoreLocation::resolve(config);
        let conn = match &location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| StorageError::Location {
                        path: parent.display().to_string(),
                        source,
                    })?;
                }
                let conn = Connection::open(path)?;
                // WAL lets several parley processes share one file.
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn
            }
        };
        conn.busy_timeout(Duration::from_millis(5000))?;

        schema::init_schema(&conn, &config.collection)?;

        tracing::info!(
            location = %location,
            collection = %config.collection,
            "conversation store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            collection: config.collection.clone(),
            location,
        })
    }

    /// Open an in-memory store with the default collection.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::open(&StoreConfig {
            uri: IN_MEMORY_URI.into(),
            ..StoreConfig::default()
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn schema_version(&self) -> Result<u32, StorageError> {
        Ok(schema::get_schema_version(&*self.lock()?)?)
    }

    /// Embedding model recorded for the stored vectors, if any.
    pub fn embedding_model(&self) -> Result<Option<String>, StorageError> {
        Ok(schema::get_embedding_model(&*self.lock()?)?)
    }

    /// Record `model` as the store's embedding model if none is set yet.
    ///
    /// Returns the previously stored model when it differs from `model`; the stored
    /// value is left untouched in that case.
    pub fn claim_embedding_model(&self, model: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        match schema::get_embedding_model(&conn)? {
            None => {
                schema::set_embedding_model(&conn, model)?;
                Ok(None)
            }
            Some(stored) if stored == model => Ok(None),
            Some(stored) => Ok(Some(stored)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Task(format!("store lock poisoned: {e}")))
    }
}

impl ConversationStore for SqliteStore {
    fn append(&self, record: &ConversationRecord) -> Result<(), StorageError> {
        let document = serde_json::to_string(record).map_err(StorageError::Encode)?;
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO {} (document) VALUES (?1)", self.collection),
            params![document],
        )?;
        tracing::debug!(seq = conn.last_insert_rowid(), "conversation record appended");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ConversationRecord>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT seq, document FROM {} ORDER BY seq",
            self.collection
        ))?;

        let rows: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, document)| {
                serde_json::from_str(&document)
                    .map_err(|source| StorageError::Corrupt { seq, source })
            })
            .collect()
    }

    fn count(&self) -> Result<usize, StorageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.collection),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
