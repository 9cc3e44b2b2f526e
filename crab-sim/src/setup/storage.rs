//! redb-based setup state store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `entities` | `(entity_type, sequence)` | `StoredEntity` | Entity ledger, creation ordered |
//! | `entity_index` | `(entity_type, remote_id)` | `u64` | Upsert index into `entities` |
//! | `setup_steps` | `step_name` | `SetupStep` | Step completion gate |
//! | `sequence_counter` | `"seq"` | `u64` | Global ledger sequence |
//!
//! # Durability
//!
//! Every write commits its own transaction before returning, so a step is
//! reported complete only once redb has made the commit durable.

use crab_client::EntityType;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Entity ledger: key = (entity_type, sequence), value = JSON-serialized StoredEntity
const ENTITIES_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("entities");

/// Upsert index: key = (entity_type, remote_id), value = ledger sequence
const ENTITY_INDEX_TABLE: TableDefinition<(&str, &str), u64> = TableDefinition::new("entity_index");

/// Step records: key = step name, value = JSON-serialized SetupStep
const SETUP_STEPS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("setup_steps");

/// Table for sequence counter
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Entity recorded in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub entity_type: EntityType,
    pub remote_id: String,
    pub display_name: String,
    /// Record as returned by the remote side
    pub snapshot: Value,
    pub sequence: u64,
    pub recorded_at: i64,
}

impl StoredEntity {
    /// Deserialize the snapshot into a typed model
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> StorageResult<T> {
        Ok(serde_json::from_value(self.snapshot.clone())?)
    }
}

/// Completion record of one setup step (or one simulated day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupStep {
    pub name: String,
    pub completed: bool,
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Setup state backed by redb
#[derive(Clone)]
pub struct SetupStateStore {
    db: Arc<Database>,
}

impl SetupStateStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTITIES_TABLE)?;
            let _ = write_txn.open_table(ENTITY_INDEX_TABLE)?;
            let _ = write_txn.open_table(SETUP_STEPS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn increment_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(SEQUENCE_KEY, next)?;
        Ok(next)
    }

    // ========== Entity Ledger ==========

    /// Upsert an entity, unique on (type, remote_id)
    ///
    /// Re-recording an entity replaces its name and snapshot but keeps its
    /// original creation position.
    pub fn record_entity(
        &self,
        entity_type: EntityType,
        remote_id: &str,
        display_name: &str,
        snapshot: &Value,
    ) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let existing = {
                let index = txn.open_table(ENTITY_INDEX_TABLE)?;
                index
                    .get((entity_type.as_str(), remote_id))?
                    .map(|guard| guard.value())
            };
            let sequence = match existing {
                Some(seq) => seq,
                None => self.increment_sequence(&txn)?,
            };

            let entity = StoredEntity {
                entity_type,
                remote_id: remote_id.to_string(),
                display_name: display_name.to_string(),
                snapshot: snapshot.clone(),
                sequence,
                recorded_at: chrono::Utc::now().timestamp_millis(),
            };
            let bytes = serde_json::to_vec(&entity)?;

            let mut entities = txn.open_table(ENTITIES_TABLE)?;
            entities.insert((entity_type.as_str(), sequence), bytes.as_slice())?;
            let mut index = txn.open_table(ENTITY_INDEX_TABLE)?;
            index.insert((entity_type.as_str(), remote_id), sequence)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// All entities of a type, in creation order
    pub fn get_entities(&self, entity_type: EntityType) -> StorageResult<Vec<StoredEntity>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTITIES_TABLE)?;

        let mut entities = Vec::new();
        let range_start = (entity_type.as_str(), 0u64);
        let range_end = (entity_type.as_str(), u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entity: StoredEntity = serde_json::from_slice(value.value())?;
            entities.push(entity);
        }

        Ok(entities)
    }

    /// Find an entity by remote id, falling back to display name
    pub fn find_entity(
        &self,
        entity_type: EntityType,
        identifier: &str,
    ) -> StorageResult<Option<StoredEntity>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ENTITY_INDEX_TABLE)?;
        let entities = read_txn.open_table(ENTITIES_TABLE)?;

        if let Some(seq) = index.get((entity_type.as_str(), identifier))?
            && let Some(value) = entities.get((entity_type.as_str(), seq.value()))?
        {
            return Ok(Some(serde_json::from_slice(value.value())?));
        }

        let range_start = (entity_type.as_str(), 0u64);
        let range_end = (entity_type.as_str(), u64::MAX);
        for result in entities.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entity: StoredEntity = serde_json::from_slice(value.value())?;
            if entity.display_name == identifier {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    /// Whether an entity matching `identifier` (id or name) is recorded
    pub fn entity_exists(&self, entity_type: EntityType, identifier: &str) -> StorageResult<bool> {
        Ok(self.find_entity(entity_type, identifier)?.is_some())
    }

    /// Remote id of the entity with the given display name
    pub fn id_by_name(&self, entity_type: EntityType, name: &str) -> StorageResult<Option<String>> {
        Ok(self.find_entity(entity_type, name)?.map(|e| e.remote_id))
    }

    // ========== Setup Steps ==========

    /// Mark a step complete, storing its payload
    pub fn mark_step_completed(&self, name: &str, payload: Option<Value>) -> StorageResult<()> {
        let step = SetupStep {
            name: name.to_string(),
            completed: true,
            completed_at: Some(chrono::Utc::now().timestamp_millis()),
            payload,
        };
        let bytes = serde_json::to_vec(&step)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETUP_STEPS_TABLE)?;
            table.insert(name, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_step(&self, name: &str) -> StorageResult<Option<SetupStep>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETUP_STEPS_TABLE)?;
        match table.get(name)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Whether a step has been marked complete
    pub fn step_completed(&self, name: &str) -> StorageResult<bool> {
        Ok(self.get_step(name)?.is_some_and(|s| s.completed))
    }

    /// Payload stored with a completed step
    pub fn get_step_data(&self, name: &str) -> StorageResult<Option<Value>> {
        Ok(self.get_step(name)?.and_then(|s| s.payload))
    }

    /// All recorded steps, ordered by name
    pub fn list_steps(&self) -> StorageResult<Vec<SetupStep>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETUP_STEPS_TABLE)?;

        let mut steps = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            steps.push(serde_json::from_slice(value.value())?);
        }
        Ok(steps)
    }

    /// Forget a step so the next run executes it again
    ///
    /// Returns whether the step existed.
    pub fn reset_step(&self, name: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SETUP_STEPS_TABLE)?;
            let removed = table.remove(name)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Clear every step and the entity ledger
    pub fn reset_all(&self) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut steps = txn.open_table(SETUP_STEPS_TABLE)?;
            steps.retain(|_, _| false)?;

            let mut entities = txn.open_table(ENTITIES_TABLE)?;
            entities.retain(|_, _| false)?;

            let mut index = txn.open_table(ENTITY_INDEX_TABLE)?;
            index.retain(|_, _| false)?;
        }
        txn.commit()?;
        tracing::info!("Setup state reset");
        Ok(())
    }
}
