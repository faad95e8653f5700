mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubstrateError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Slot {key} changed since it was read")]
    Conflict { key: String },
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Quota exceeded: write needs {needed} bytes, quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<redb::CommitError> for SubstrateError {
    fn from(e: redb::CommitError) -> Self {
        SubstrateError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for SubstrateError {
    fn from(e: redb::DatabaseError) -> Self {
        SubstrateError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for SubstrateError {
    fn from(e: redb::Error) -> Self {
        SubstrateError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for SubstrateError {
    fn from(e: redb::StorageError) -> Self {
        SubstrateError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for SubstrateError {
    fn from(e: redb::TableError) -> Self {
        SubstrateError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for SubstrateError {
    fn from(e: redb::TransactionError) -> Self {
        SubstrateError::Transaction(Box::new(e))
    }
}

/// A string-keyed, string-valued slot store shared by everything in one origin.
///
/// Reads never block on writers. Each write replaces a whole slot atomically;
/// there is no multi-slot transaction.
pub trait Substrate: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError>;

    fn set(&self, key: &str, value: &str) -> Result<(), SubstrateError>;

    /// Write `value` only if the slot still holds `expected` (`None` = absent).
    /// Fails with [`SubstrateError::Conflict`] otherwise.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<(), SubstrateError>;

    /// Returns whether the slot existed.
    fn remove(&self, key: &str) -> Result<bool, SubstrateError>;

    /// Bytes currently used, counted as key length plus value length per slot.
    fn usage(&self) -> Result<u64, SubstrateError>;
}

/// Usage after replacing `key`'s old value with `value`.
pub(crate) fn projected_usage(current: u64, key: &str, old: Option<&str>, value: &str) -> u64 {
    let freed = old.map(|v| (key.len() + v.len()) as u64).unwrap_or(0);
    current - freed + (key.len() + value.len()) as u64
}

pub(crate) fn check_quota(quota: Option<u64>, needed: u64) -> Result<(), SubstrateError> {
    match quota {
        Some(quota) if needed > quota => Err(SubstrateError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}
