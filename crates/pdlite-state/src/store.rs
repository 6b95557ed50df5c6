//! StateStore — redb-backed persistence for scheduler configuration.
//!
//! Scheduler config blobs are written as-is into `SCHEDULE_CONFIGS`;
//! scheduler registrations are JSON-serialized into `SCHEDULERS`. The store
//! supports both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Save/load access to serialized scheduler configuration.
///
/// Schedulers persist through this trait so they can be handed any durable
/// backend, not only [`StateStore`].
pub trait ConfigStorage: Send + Sync {
    /// Durably store `data` as the configuration of scheduler `name`.
    fn save_schedule_config(&self, name: &str, data: &[u8]) -> StateResult<()>;

    /// Load the configuration of scheduler `name`, if any was saved.
    fn load_schedule_config(&self, name: &str) -> StateResult<Option<Vec<u8>>>;
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SCHEDULE_CONFIGS).map_err(map_err!(Table))?;
        txn.open_table(SCHEDULERS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Schedule configs ───────────────────────────────────────────

    /// Remove a scheduler's config blob. Returns true if it existed.
    pub fn remove_schedule_config(&self, name: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(SCHEDULE_CONFIGS).map_err(map_err!(Table))?;
            existed = table.remove(name).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, existed, "schedule config removed");
        Ok(existed)
    }

    // ── Scheduler records ──────────────────────────────────────────

    /// Insert or update a scheduler registration.
    pub fn put_scheduler(&self, record: &SchedulerRecord) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SCHEDULERS).map_err(map_err!(Table))?;
            table
                .insert(record.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(name = %record.name, scheduler_type = %record.scheduler_type, "scheduler stored");
        Ok(())
    }

    /// Get a scheduler registration by name.
    pub fn get_scheduler(&self, name: &str) -> StateResult<Option<SchedulerRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SCHEDULERS).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: SchedulerRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List all scheduler registrations, ordered by name.
    pub fn list_schedulers(&self) -> StateResult<Vec<SchedulerRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SCHEDULERS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: SchedulerRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }

    /// Delete a scheduler registration. Returns true if it existed.
    pub fn delete_scheduler(&self, name: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(SCHEDULERS).map_err(map_err!(Table))?;
            existed = table.remove(name).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, existed, "scheduler deleted");
        Ok(existed)
    }
}

impl ConfigStorage for StateStore {
    fn save_schedule_config(&self, name: &str, data: &[u8]) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SCHEDULE_CONFIGS).map_err(map_err!(Table))?;
            table.insert(name, data).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, bytes = data.len(), "schedule config saved");
        Ok(())
    }

    fn load_schedule_config(&self, name: &str) -> StateResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SCHEDULE_CONFIGS).map_err(map_err!(Table))?;
        Ok(table
            .get(name)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value().to_vec()))
    }
}
