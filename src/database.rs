//! Key-value storage and table definitions
//!
//! All persisted state lives as JSON blobs under a handful of string keys,
//! the same layout the storefront kept in browser local storage. The
//! embedded redb database provides a single table holding those keys.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

use crate::catalog::CatalogRepository;
use crate::error::{StoreError, StoreResult};
use crate::ledger::OrderLedger;

/// Canonical platform collection
pub const KEY_PLATFORMS: &str = "social_platforms";

/// Deprecated platform collection, merged into [`KEY_PLATFORMS`] and deleted
pub const KEY_LEGACY_PLATFORMS: &str = "platforms";

pub const KEY_SERVICES: &str = "social_services";

/// Order ledger, most recent first
pub const KEY_ORDERS: &str = "dashboard_orders";

pub const KEY_CURRENT_ORDER: &str = "current_order_id";

/// Single key-value table
///
/// Key: storage key (e.g. "social_platforms")
/// Value: JSON document as string
pub const TABLE_KV: TableDefinition<&str, &str> = TableDefinition::new("kv_v1");

/// String key-value store with no transactional guarantees across calls
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`, returning whether it existed
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// Initializes the embedded database and creates the key-value table
///
/// # Example
///
/// ```no_run
/// # use boostdesk::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_KV)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// [`KeyValueStore`] backed by redb, one transaction per call
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Opens (or creates) the database file at `db_path`
    pub fn open(db_path: &str) -> StoreResult<Self> {
        Ok(Self::new(init_db(db_path)?))
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_KV)?;
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_KV)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(TABLE_KV)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

/// In-memory [`KeyValueStore`]
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.write().unwrap().remove(key).is_some())
    }
}

/// Reads and parses the JSON value under `key`
///
/// A value that does not parse is reported as [`StoreError::Corrupt`];
/// callers decide whether that is recoverable.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serializes `value` and writes it under `key`, replacing the previous value
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> StoreResult<()> {
    let raw = serde_json::to_string(value).map_err(StoreError::Serialize)?;
    store.set(key, &raw)
}

/// Reads a JSON list, treating an absent or corrupt value as empty
pub fn read_list_lenient<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StoreResult<Vec<T>> {
    match read_json::<Vec<T>>(store, key) {
        Ok(list) => Ok(list.unwrap_or_default()),
        Err(StoreError::Corrupt { key, source }) => {
            tracing::warn!(%key, error = %source, "Corrupt value in storage, treating as empty");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogRepository>,
    pub ledger: Arc<OrderLedger>,
}

impl AppState {
    /// Builds the catalog and ledger on top of one shared store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            catalog: Arc::new(CatalogRepository::new(store.clone())),
            ledger: Arc::new(OrderLedger::new(store)),
        }
    }
}
