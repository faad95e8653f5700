use redb::{Database as RedbDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::{check_quota, projected_usage, Substrate, SubstrateError};

/// Every slot lives in one table: slot name -> JSON text
const SLOTS: TableDefinition<&str, &str> = TableDefinition::new("slots");

/// Durable substrate backed by an embedded redb database.
pub struct RedbStore {
    db: Arc<RedbDatabase>,
    quota: Option<u64>,
}

impl Clone for RedbStore {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            quota: self.quota,
        }
    }
}

impl RedbStore {
    /// Open or create the store inside `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P, quota: Option<u64>) -> Result<Self, SubstrateError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("aceplan.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SLOTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db, quota })
    }

    /// Shared write path. `expected` of `Some(..)` turns the write into a compare-and-swap.
    fn write(
        &self,
        key: &str,
        expected: Option<Option<&str>>,
        value: &str,
    ) -> Result<(), SubstrateError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SLOTS)?;
            let old: Option<String> = table.get(key)?.map(|v| v.value().to_string());

            if let Some(expected) = expected {
                if old.as_deref() != expected {
                    return Err(SubstrateError::Conflict {
                        key: key.to_string(),
                    });
                }
            }

            let needed = projected_usage(usage_in(&table)?, key, old.as_deref(), value);
            check_quota(self.quota, needed)?;

            table.insert(key, value)?;
        }
        write_txn.commit()?;

        tracing::debug!(key, bytes = value.len(), "slot written");
        Ok(())
    }
}

fn usage_in<T: ReadableTable<&'static str, &'static str>>(table: &T) -> Result<u64, SubstrateError> {
    let mut total = 0u64;
    for entry in table.iter()? {
        let (k, v) = entry?;
        total += (k.value().len() + v.value().len()) as u64;
    }
    Ok(total)
}

impl Substrate for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOTS)?;
        let value = table.get(key)?.map(|v| v.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SubstrateError> {
        self.write(key, None, value)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<(), SubstrateError> {
        self.write(key, Some(expected), value)
    }

    fn remove(&self, key: &str) -> Result<bool, SubstrateError> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SLOTS)?;
            let removed = table.remove(key)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn usage(&self) -> Result<u64, SubstrateError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOTS)?;
        usage_in(&table)
    }
}
