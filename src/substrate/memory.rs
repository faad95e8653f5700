use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{check_quota, projected_usage, Substrate, SubstrateError};

/// In-memory substrate for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<u64>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: u64) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Reject every write, like a browser with storage disabled.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SubstrateError> {
        self.slots
            .lock()
            .map_err(|_| SubstrateError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(
        &self,
        slots: &mut HashMap<String, String>,
        key: &str,
        value: &str,
    ) -> Result<(), SubstrateError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(SubstrateError::Unavailable(
                "storage is read-only".to_string(),
            ));
        }

        let current = usage_of(slots);
        let needed = projected_usage(current, key, slots.get(key).map(String::as_str), value);
        check_quota(self.quota, needed)?;

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn usage_of(slots: &HashMap<String, String>) -> u64 {
    slots.iter().map(|(k, v)| (k.len() + v.len()) as u64).sum()
}

impl Substrate for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SubstrateError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SubstrateError> {
        let mut slots = self.slots()?;
        self.write(&mut slots, key, value)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<(), SubstrateError> {
        let mut slots = self.slots()?;
        if slots.get(key).map(String::as_str) != expected {
            return Err(SubstrateError::Conflict {
                key: key.to_string(),
            });
        }
        self.write(&mut slots, key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, SubstrateError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(SubstrateError::Unavailable(
                "storage is read-only".to_string(),
            ));
        }
        Ok(self.slots()?.remove(key).is_some())
    }

    fn usage(&self) -> Result<u64, SubstrateError> {
        let slots = self.slots()?;
        Ok(usage_of(&slots))
    }
}
