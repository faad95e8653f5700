use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::encoder::EncodeError;
use crate::substrate::{Substrate, SubstrateError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Table {slot} holds data that cannot be parsed")]
    CorruptTable { slot: String },
    #[error("Subject name cannot be empty")]
    EmptySubjectName,
    #[error("Persistence error: {0}")]
    Persistence(#[from] SubstrateError),
    #[error("Read error: {0}")]
    Read(#[from] EncodeError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Access to the Files and Subjects tables.
///
/// Holds no state of its own; every call is a complete read or
/// read-modify-write cycle against the substrate. Read-modify-write cycles
/// commit with a compare-and-swap against the slot content they read, so a
/// second writer in between surfaces as [`SubstrateError::Conflict`] instead
/// of a silently lost update. Conflicts are not retried.
pub struct Repository {
    substrate: Arc<dyn Substrate>,
}

impl Clone for Repository {
    fn clone(&self) -> Self {
        Self {
            substrate: Arc::clone(&self.substrate),
        }
    }
}

/// A table as read from its slot, with the raw text kept for compare-and-swap.
pub(crate) struct Snapshot<T> {
    pub raw: Option<String>,
    pub records: Vec<T>,
    /// The slot held text that did not parse; `records` is empty.
    pub corrupt: bool,
}

impl Repository {
    pub fn new(substrate: Arc<dyn Substrate>) -> Self {
        Self { substrate }
    }

    pub fn substrate(&self) -> Arc<dyn Substrate> {
        Arc::clone(&self.substrate)
    }

    /// Read a table. A missing slot or corrupt JSON yields an empty table;
    /// only substrate failures are errors.
    pub(crate) fn snapshot<T: DeserializeOwned>(
        &self,
        slot: &str,
    ) -> Result<Snapshot<T>, StorageError> {
        let raw = self.substrate.get(slot)?;
        let mut corrupt = false;
        let records = match raw.as_deref() {
            None => Vec::new(),
            Some(text) => match serde_json::from_str(text) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        slot,
                        error = %e,
                        bytes = text.len(),
                        "Corrupt table data, treating as empty"
                    );
                    corrupt = true;
                    Vec::new()
                }
            },
        };
        Ok(Snapshot {
            raw,
            records,
            corrupt,
        })
    }

    /// Fail-open read used by the public getters.
    pub(crate) fn read_table<T: DeserializeOwned>(&self, slot: &str) -> Vec<T> {
        match self.snapshot(slot) {
            Ok(snapshot) => snapshot.records,
            Err(e) => {
                tracing::error!(slot, error = %e, "Failed to read table, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace a whole table if its slot still holds `expected`.
    pub(crate) fn commit<T: Serialize>(
        &self,
        slot: &str,
        expected: Option<&str>,
        records: &[T],
    ) -> Result<(), StorageError> {
        let data = serde_json::to_string(records)?;
        self.substrate.compare_and_swap(slot, expected, &data)?;
        tracing::debug!(slot, records = records.len(), "table committed");
        Ok(())
    }

    /// Replace a whole table unconditionally.
    pub(crate) fn overwrite<T: Serialize>(
        &self,
        slot: &str,
        records: &[T],
    ) -> Result<(), StorageError> {
        let data = serde_json::to_string(records)?;
        self.substrate.set(slot, &data)?;
        tracing::debug!(slot, records = records.len(), "table overwritten");
        Ok(())
    }
}
