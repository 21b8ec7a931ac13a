//! LMDB-backed durable store.
//!
//! Uses the heed crate (Rust bindings for LMDB) as the persistent
//! key-value store for usage records. One unnamed database maps string
//! keys to string values.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get` and `keys_with_prefix`
//! - Write transactions for `set` and `remove`

use std::path::{Path, PathBuf};

use dispenser_core::{DispenserError, DispenserResult, StorageError};
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};

use crate::KeyValueStore;

/// Error type for LMDB store setup and transactions.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbStoreError to DispenserError.
impl From<LmdbStoreError> for DispenserError {
    fn from(e: LmdbStoreError) -> Self {
        DispenserError::Storage(StorageError::Backend {
            reason: e.to_string(),
        })
    }
}

/// Durable store in an LMDB environment directory.
///
/// # Example
///
/// ```ignore
/// use dispenser_storage::{KeyValueStore, LmdbStore};
///
/// let store = LmdbStore::open("/var/lib/dispenser", 16)?;
/// store.set("dispenser_pepito_2025-11-13", r#"{"date":"2025-11-13","events":[]}"#)?;
/// ```
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Str>,
    path: PathBuf,
}

impl std::fmt::Debug for LmdbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbStore").field("path", &self.path).finish()
    }
}

impl LmdbStore {
    /// Open (or create) a store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB store");

        Ok(Self {
            env,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Directory backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> DispenserResult<u64> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        let count = self
            .db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        Ok(count)
    }

    pub fn is_empty(&self) -> DispenserResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> DispenserResult<Option<String>> {
        let read_failed = |reason: String| StorageError::ReadFailed {
            key: key.to_string(),
            reason,
        };

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| read_failed(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key)
            .map_err(|e| read_failed(e.to_string()))?;

        Ok(value.map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> DispenserResult<()> {
        let write_failed = |reason: String| StorageError::WriteFailed {
            key: key.to_string(),
            reason,
        };

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| write_failed(e.to_string()))?;

        self.db
            .put(&mut wtxn, key, value)
            .map_err(|e| write_failed(e.to_string()))?;

        wtxn.commit().map_err(|e| write_failed(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> DispenserResult<bool> {
        let write_failed = |reason: String| StorageError::WriteFailed {
            key: key.to_string(),
            reason,
        };

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| write_failed(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, key)
            .map_err(|e| write_failed(e.to_string()))?;

        wtxn.commit().map_err(|e| write_failed(e.to_string()))?;

        Ok(deleted)
    }

    fn keys_with_prefix(&self, prefix: &str) -> DispenserResult<Vec<String>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        for result in iter {
            match result {
                Ok((key, _)) => {
                    if key.starts_with(prefix) {
                        keys.push(key.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable LMDB entry");
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbStore::open(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_open_creates_empty_store() {
        let (store, dir) = create_test_store();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.path(), dir.path());
    }

    #[test]
    fn test_set_get_remove() {
        let (store, _dir) = create_test_store();

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_keys_with_prefix() {
        let (store, _dir) = create_test_store();
        store.set("dispenser_pepito_2025-11-14", "{}").unwrap();
        store.set("dispenser_pepito_2025-11-13", "{}").unwrap();
        store.set("dispenser_Juancito_2025-11-13", "{}").unwrap();

        let keys = store.keys_with_prefix("dispenser_pepito_").unwrap();
        assert_eq!(
            keys,
            vec![
                "dispenser_pepito_2025-11-13".to_string(),
                "dispenser_pepito_2025-11-14".to_string(),
            ]
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: DispenserError = LmdbStoreError::DbOpen("boom".to_string()).into();
        assert!(matches!(
            err,
            DispenserError::Storage(StorageError::Backend { .. })
        ));
        assert!(err.to_string().contains("boom"));
    }
}
