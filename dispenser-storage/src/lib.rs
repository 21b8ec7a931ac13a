//! Dispenser Storage - Key-Value Trait and Backends
//!
//! Defines the persistence seam used by the usage ledger. Values are
//! opaque strings; the ledger owns their encoding.

pub mod key;
pub mod lmdb;
pub mod memory;

pub use key::LedgerKey;
pub use lmdb::{LmdbStore, LmdbStoreError};
pub use memory::MemoryStore;

use dispenser_core::DispenserResult;

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// String key-value store.
///
/// Implementations must be safe to share between threads. Each call is
/// atomic on its own; callers needing read-modify-write atomicity
/// serialise access themselves.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> DispenserResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> DispenserResult<()>;

    /// Remove `key`. Returns whether a value was present.
    fn remove(&self, key: &str) -> DispenserResult<bool>;

    /// All keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> DispenserResult<Vec<String>>;
}
