//! In-process backend keeping documents in memory.
//!
//! Supports what records need from a collection: top-level equality filters
//! (numbers compare across integer and double types, array fields match when
//! any element is equal), skip/limit windows and upsert by `_id`. It counts
//! delegated calls and can be told to reject writes, which makes it suitable for
//! tests that must not depend on a running server.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document as BsonDocument};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::driver::{Backend, CollectionDriver, WriteStatus};
use crate::model::ID_FIELD;
use crate::validation::{validate_database_name, ValidatedCollectionName};
use crate::Result;

type CollectionKey = (String, String);

#[derive(Default)]
struct MemoryState {
    collections: Mutex<HashMap<CollectionKey, Vec<BsonDocument>>>,
    write_failure: Mutex<Option<String>>,
    find_calls: AtomicUsize,
    save_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

/// Backend storing collections in a shared in-memory map.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<MemoryState>,
    default_database: String,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("default_database", &self.default_database)
            .field("collections", &self.state.collections.lock().len())
            .finish()
    }
}

impl MemoryBackend {
    /// Create an empty backend with the given default database
    pub fn new(default_database: impl Into<String>) -> Self {
        Self {
            state: Arc::default(),
            default_database: default_database.into(),
        }
    }

    /// Make every following save/remove answer with `status` instead of
    /// succeeding. `None` restores normal behaviour.
    pub fn fail_writes(&self, status: Option<&str>) {
        *self.state.write_failure.lock() = status.map(str::to_string);
    }

    /// Snapshot of the documents stored in a collection
    pub fn documents(&self, database: &str, collection: &str) -> Vec<BsonDocument> {
        self.state
            .collections
            .lock()
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of find calls received
    pub fn find_calls(&self) -> usize {
        self.state.find_calls.load(Ordering::SeqCst)
    }

    /// Number of save calls received
    pub fn save_calls(&self) -> usize {
        self.state.save_calls.load(Ordering::SeqCst)
    }

    /// Number of remove calls received
    pub fn remove_calls(&self) -> usize {
        self.state.remove_calls.load(Ordering::SeqCst)
    }

    /// Number of collection handles closed
    pub fn close_calls(&self) -> usize {
        self.state.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    type Collection = MemoryCollection;

    fn default_database(&self) -> &str {
        &self.default_database
    }

    async fn open_collection(&self, database: &str, collection: &str) -> Result<MemoryCollection> {
        validate_database_name(database)?;
        let name = ValidatedCollectionName::new(collection)?;
        Ok(MemoryCollection {
            state: Arc::clone(&self.state),
            key: (database.to_string(), name.as_str().to_string()),
        })
    }
}

/// Handle on one in-memory collection
pub struct MemoryCollection {
    state: Arc<MemoryState>,
    key: CollectionKey,
}

impl MemoryCollection {
    fn rejected(&self) -> Option<WriteStatus> {
        self.state
            .write_failure
            .lock()
            .clone()
            .map(WriteStatus::Failed)
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn values_equal(stored: &Bson, wanted: &Bson) -> bool {
    if let (Some(a), Some(b)) = (as_number(stored), as_number(wanted)) {
        return a == b;
    }
    if stored == wanted {
        return true;
    }
    match stored {
        Bson::Array(items) => items.iter().any(|item| values_equal(item, wanted)),
        _ => false,
    }
}

fn matches_filter(doc: &BsonDocument, filter: &BsonDocument) -> bool {
    filter.iter().all(|(key, wanted)| {
        doc.get(key)
            .map(|stored| values_equal(stored, wanted))
            .unwrap_or(false)
    })
}

#[async_trait]
impl CollectionDriver for MemoryCollection {
    async fn find(&self, filter: BsonDocument, window: &Cursor) -> Result<Vec<BsonDocument>> {
        self.state.find_calls.fetch_add(1, Ordering::SeqCst);
        let collections = self.state.collections.lock();
        let Some(docs) = collections.get(&self.key) else {
            return Ok(Vec::new());
        };

        let matching = docs
            .iter()
            .filter(|doc| matches_filter(doc, &filter))
            .skip(window.offset as usize);

        let found = match window.limit_option() {
            Some(limit) => matching.take(limit.unsigned_abs() as usize).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(found)
    }

    async fn save(&self, document: BsonDocument) -> Result<WriteStatus> {
        self.state.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.rejected() {
            return Ok(status);
        }

        let mut collections = self.state.collections.lock();
        let docs = collections.entry(self.key.clone()).or_default();

        match document.get(ID_FIELD).cloned() {
            Some(id) => {
                let existing = docs.iter_mut().find(|d| {
                    d.get(ID_FIELD)
                        .map(|stored| values_equal(stored, &id))
                        .unwrap_or(false)
                });
                match existing {
                    Some(existing) => *existing = document,
                    None => docs.push(document),
                }
            }
            None => {
                let mut stored = BsonDocument::new();
                stored.insert(ID_FIELD, ObjectId::new());
                for (key, value) in document {
                    stored.insert(key, value);
                }
                docs.push(stored);
            }
        }
        Ok(WriteStatus::Success)
    }

    async fn remove(&self, filter: BsonDocument) -> Result<WriteStatus> {
        self.state.remove_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.rejected() {
            return Ok(status);
        }

        if let Some(docs) = self.state.collections.lock().get_mut(&self.key) {
            docs.retain(|doc| !matches_filter(doc, &filter));
        }
        Ok(WriteStatus::Success)
    }

    async fn close(&self) -> Result<()> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
