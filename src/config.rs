use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Browsers typically allow about 5 MiB of local storage per origin.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the redb database
    pub data_dir: String,
    /// Byte quota across all slots. `None` means unlimited.
    pub quota_bytes: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let quota_bytes = match std::env::var("STORAGE_QUOTA_BYTES") {
            Ok(raw) => parse_quota(&raw)?,
            Err(_) => Some(DEFAULT_QUOTA_BYTES),
        };

        let config = Config {
            data_dir,
            quota_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        if let Some(quota) = self.quota_bytes {
            if quota < 64 * 1024 {
                tracing::warn!(
                    quota,
                    "Storage quota is below 64 KiB; most uploads will be rejected"
                );
            }
        }

        Ok(())
    }
}

/// `0` disables the quota.
fn parse_quota(raw: &str) -> Result<Option<u64>, ConfigError> {
    let quota: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("STORAGE_QUOTA_BYTES must be an integer, got {raw:?}"))
    })?;
    Ok((quota > 0).then_some(quota))
}
