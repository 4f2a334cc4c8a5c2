//! # Record Stores
//!
//! Key-value persistence per resource type.
//!
//! ## Invariants
//! - Each store operation is atomic with respect to the whole store
//! - Surrogate keys are never reused, even after deletion
//! - Iteration order is key order

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};

use super::record::{Record, RecordKey};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Lock poisoned")]
    Poisoned,

    /// Natural-keyed record saved without its key
    #[error("{0} requires a caller-supplied key")]
    KeyRequired(&'static str),

    /// Surrogate sequence ran past the key type's range
    #[error("{0} key space exhausted")]
    KeySpaceExhausted(&'static str),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Corrupt snapshot {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Persistence abstraction consumed by the resource handler
pub trait RecordStore<R: Record>: Send + Sync {
    fn find_by_key(&self, key: &R::Key) -> StoreResult<Option<R>>;

    fn find_all(&self) -> StoreResult<Vec<R>>;

    /// Insert or replace; unassigned surrogate keys are allocated here
    fn save(&self, record: R) -> StoreResult<R>;

    /// Remove the record with `record`'s key; absent keys are a no-op
    fn delete(&self, record: &R) -> StoreResult<()>;
}

/// Records plus the surrogate sequence
#[derive(Debug, Clone)]
struct StoreState<R: Record> {
    records: BTreeMap<R::Key, R>,
    last_sequence: u64,
}

impl<R: Record> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            last_sequence: 0,
        }
    }
}

impl<R: Record> StoreState<R> {
    fn from_records(records: Vec<R>) -> Self {
        let mut state = Self::default();
        for record in records {
            state.track_sequence(record.key());
            state.records.insert(record.key().clone(), record);
        }
        state
    }

    fn track_sequence(&mut self, key: &R::Key) {
        if let Some(position) = key.sequence_position() {
            self.last_sequence = self.last_sequence.max(position);
        }
    }

    fn upsert(&mut self, mut record: R) -> StoreResult<R> {
        if record.key().is_unassigned() {
            let next = self.last_sequence + 1;
            let key = R::Key::from_sequence(next).ok_or_else(|| {
                if R::Key::from_sequence(1).is_some() {
                    StoreError::KeySpaceExhausted(R::TYPE_NAME)
                } else {
                    StoreError::KeyRequired(R::TYPE_NAME)
                }
            })?;
            self.last_sequence = next;
            record.set_key(key);
        } else {
            self.track_sequence(record.key());
        }

        self.records.insert(record.key().clone(), record.clone());
        Ok(record)
    }

    fn remove(&mut self, key: &R::Key) {
        self.records.remove(key);
    }
}

/// On-disk form; the sequence is kept so keys stay unique across restarts
#[derive(Deserialize)]
struct Snapshot<R> {
    last_sequence: u64,
    records: Vec<R>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, R> {
    last_sequence: u64,
    records: Vec<&'a R>,
}

/// In-memory store
pub struct InMemoryRecordStore<R: Record> {
    state: RwLock<StoreState<R>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Seed a store with existing records
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            state: RwLock::new(StoreState::from_records(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    fn find_by_key(&self, key: &R::Key) -> StoreResult<Option<R>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.records.get(key).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<R>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.records.values().cloned().collect())
    }

    fn save(&self, record: R) -> StoreResult<R> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        state.upsert(record)
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        state.remove(record.key());
        Ok(())
    }
}

/// Store mirrored to `<dir>/<collection>.json` after every write
///
/// A write is applied to a copy of the state, persisted, then swapped in,
/// so a failed write leaves both memory and disk unchanged.
pub struct FileRecordStore<R: Record> {
    path: PathBuf,
    state: RwLock<StoreState<R>>,
}

impl<R: Record> FileRecordStore<R> {
    /// Open (or create) the snapshot for `R` under `dir`
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        let path = dir.join(format!("{}.json", R::COLLECTION));

        let state = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            let snapshot: Snapshot<R> =
                serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            let mut state = StoreState::from_records(snapshot.records);
            state.last_sequence = state.last_sequence.max(snapshot.last_sequence);
            state
        } else {
            StoreState::default()
        };

        let count = state.records.len().to_string();
        log_event_with_fields(
            Event::StoreLoaded,
            &[("resource", R::TYPE_NAME), ("records", &count)],
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreState<R>) -> StoreResult<()> {
        let snapshot = SnapshotRef {
            last_sequence: state.last_sequence,
            records: state.records.values().collect(),
        };
        let content = serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }

    fn apply<T>(
        &self,
        mutate: impl FnOnce(&mut StoreState<R>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = state.clone();
        let out = mutate(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }
}

impl<R: Record> RecordStore<R> for FileRecordStore<R> {
    fn find_by_key(&self, key: &R::Key) -> StoreResult<Option<R>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.records.get(key).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<R>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.records.values().cloned().collect())
    }

    fn save(&self, record: R) -> StoreResult<R> {
        self.apply(|state| state.upsert(record))
    }

    fn delete(&self, record: &R) -> StoreResult<()> {
        self.apply(|state| {
            state.remove(record.key());
            Ok(())
        })
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
