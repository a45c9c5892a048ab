//! Configuration for the sync runtime.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, constructed explicitly and handed to the
/// orchestrator - there is no module-level global state.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// File slot holding the local attempt history
    pub slot_path: PathBuf,
    /// How long an import notification stays up before auto-dismissal
    pub notify_dismiss_after: Duration,
}

impl SyncConfig {
    /// Configuration with the default notification delay.
    pub fn new(slot_path: impl Into<PathBuf>) -> Self {
        Self {
            slot_path: slot_path.into(),
            notify_dismiss_after: Duration::from_secs(4),
        }
    }

    /// Load configuration from environment variables (reads `.env` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("RETAKE_DATA_DIR").map_err(|_| ConfigError::MissingDataDir)?;

        let dismiss_ms: u64 = env::var("RETAKE_NOTIFY_DISMISS_MS")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidDismissDelay)?;

        Ok(Self {
            slot_path: PathBuf::from(data_dir).join("quiz_attempts.json"),
            notify_dismiss_after: Duration::from_millis(dismiss_ms),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RETAKE_DATA_DIR environment variable is required")]
    MissingDataDir,

    #[error("Invalid RETAKE_NOTIFY_DISMISS_MS value")]
    InvalidDismissDelay,
}
