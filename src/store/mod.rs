//! Conversation store: an append-only, insertion-ordered document collection.
//!
//! [`ConversationStore`] is the seam; [`SqliteStore`] is the backend. Store calls are
//! synchronous, so async callers go through [`append`] and [`read_all`], which run
//! them on the blocking pool.

pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use crate::conversation::types::ConversationRecord;
use crate::error::StorageError;

pub use sqlite::{SqliteStore, StoreLocation};

/// Append-one / read-all document store for conversation records.
pub trait ConversationStore: Send + Sync {
    /// Durably persist one record after every record already stored.
    fn append(&self, record: &ConversationRecord) -> Result<(), StorageError>;

    /// Every stored record, in insertion order.
    fn read_all(&self) -> Result<Vec<ConversationRecord>, StorageError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, StorageError>;
}

/// Stand-in for a store that could not be opened. Every call fails with the open
/// error, so a session still runs and reports each failed write.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl ConversationStore for UnavailableStore {
    fn append(&self, _record: &ConversationRecord) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn read_all(&self) -> Result<Vec<ConversationRecord>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

/// Run [`ConversationStore::append`] on the blocking pool.
pub async fn append(
    store: &Arc<dyn ConversationStore>,
    record: ConversationRecord,
) -> Result<(), StorageError> {
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.append(&record))
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}

/// Run [`ConversationStore::read_all`] on the blocking pool.
pub async fn read_all(
    store: &Arc<dyn ConversationStore>,
) -> Result<Vec<ConversationRecord>, StorageError> {
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.read_all())
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}
