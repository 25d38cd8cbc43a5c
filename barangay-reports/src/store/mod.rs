//! Entity Store: whole-collection persistence over a string key-value port.
//!
//! Callers load a full collection, mutate it in memory and save it back.
//! There is no locking across processes; the last full save wins.

mod file;
mod memory;
mod redis_store;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use barangay_shared::errors::{AppError, AppResult};
use barangay_shared::types::auth::Identity;

use crate::config::{AppConfig, StorageBackend};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

const SESSION_KEY: &str = "session";
const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Synchronous string key-value persistence. Implementations must make
/// `set` atomic from the caller's point of view.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Reports,
    AuditLog,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Reports, Collection::AuditLog];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Reports => "reports",
            Collection::AuditLog => "notif",
        }
    }
}

/// An entity type persisted as one JSON array under its collection key.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

/// Typed view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct EntityStore {
    kv: Arc<dyn KeyValueStore>,
}

impl EntityStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Write `[]` under every collection key that is still absent.
    pub fn initialize(&self) -> AppResult<()> {
        for collection in Collection::ALL {
            if self.kv.get(collection.key())?.is_none() {
                self.kv.set(collection.key(), "[]")?;
            }
        }
        Ok(())
    }

    /// Load a whole collection. Corrupt documents decode as empty and
    /// undecodable records are skipped; neither is reported to the caller.
    pub fn load<T: Record>(&self) -> AppResult<Vec<T>> {
        let key = T::COLLECTION.key();
        let Some(raw) = self.kv.get(key)? else {
            return Ok(Vec::new());
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt collection, treating as empty");
                return Ok(Vec::new());
            }
        };

        let records = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key, index, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Replace a whole collection.
    pub fn save<T: Record>(&self, records: &[T]) -> AppResult<()> {
        let raw = serde_json::to_string(records).map_err(StoreError::from)?;
        self.kv.set(T::COLLECTION.key(), &raw)?;
        Ok(())
    }

    pub fn session(&self) -> AppResult<Option<Identity>> {
        let Some(raw) = self.kv.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Option<Identity>>(&raw) {
            Ok(identity) => Ok(identity),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt session pointer, ignoring");
                Ok(None)
            }
        }
    }

    pub fn set_session(&self, identity: &Identity) -> AppResult<()> {
        let raw = serde_json::to_string(identity).map_err(StoreError::from)?;
        self.kv.set(SESSION_KEY, &raw)?;
        Ok(())
    }

    pub fn clear_session(&self) -> AppResult<()> {
        self.kv.remove(SESSION_KEY)?;
        Ok(())
    }

    pub fn theme(&self) -> AppResult<Option<String>> {
        Ok(self.kv.get(THEME_KEY)?)
    }

    pub fn set_theme(&self, theme: &str) -> AppResult<()> {
        self.kv.set(THEME_KEY, theme)?;
        Ok(())
    }
}

/// Build the configured backend.
pub fn open(config: &AppConfig) -> anyhow::Result<EntityStore> {
    let kv: Arc<dyn KeyValueStore> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(&config.data_dir)?),
        StorageBackend::Redis => Arc::new(RedisStore::connect(&config.redis_url, &config.redis_prefix)?),
    };
    let store = EntityStore::new(kv);
    store.initialize()?;
    tracing::debug!(backend = ?config.storage, "entity store ready");
    Ok(store)
}
