//! aceplan-store - persistence for the AcePlan study planner
//!
//! This crate keeps a single user's subjects, their file attachments and the
//! dashboard preferences in a string-only key-value substrate:
//! - Binary uploads encoded as self-contained data URLs
//! - Files and Subjects tables as JSON arrays, subjects referencing files by id
//! - redb embedded database as the durable substrate, plus an in-memory one
//! - Fail-open reads: corrupt or missing tables load as empty

pub mod config;
pub mod encoder;
pub mod preferences;
pub mod storage;
pub mod substrate;
pub mod telemetry;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use preferences::Preferences;
use storage::Repository;
use substrate::{RedbStore, Substrate, SubstrateError};

/// Everything the dashboard talks to, sharing one substrate.
pub struct AcePlan {
    pub config: Config,
    pub preferences: Preferences,
    pub repository: Repository,
}

impl AcePlan {
    /// Open the redb substrate under `config.data_dir`.
    pub fn open(config: Config) -> Result<Self, SubstrateError> {
        let store = RedbStore::open(&config.data_dir, config.quota_bytes)?;
        tracing::info!(data_dir = %config.data_dir, quota = ?config.quota_bytes, "Storage opened");
        Ok(Self::with_substrate(config, Arc::new(store)))
    }

    pub fn with_substrate(config: Config, substrate: Arc<dyn Substrate>) -> Self {
        Self {
            config,
            preferences: Preferences::new(Arc::clone(&substrate)),
            repository: Repository::new(substrate),
        }
    }
}
