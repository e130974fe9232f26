// ABOUTME: Configuration loading for the readlist binary.
// ABOUTME: Reads READLIST_* environment variables and applies command-line overrides.

use std::path::PathBuf;

use readlist_store::DEFAULT_STORAGE_KEY;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("READLIST_STORAGE_KEY must not be empty")]
    EmptyStorageKey,
}

/// Where and under which key the reading list is stored.
#[derive(Debug, Clone)]
pub struct ReadlistConfig {
    pub home: PathBuf,
    pub storage_key: String,
}

impl ReadlistConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - READLIST_HOME: data directory (default: ~/.readlist)
    /// - READLIST_STORAGE_KEY: key the list is stored under (default: @kitaplar)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("READLIST_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".readlist")
            });

        let storage_key = match std::env::var("READLIST_STORAGE_KEY") {
            Ok(key) if key.trim().is_empty() => return Err(ConfigError::EmptyStorageKey),
            Ok(key) => key,
            Err(_) => DEFAULT_STORAGE_KEY.to_string(),
        };

        Ok(Self { home, storage_key })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        home: Option<PathBuf>,
        storage_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(home) = home {
            self.home = home;
        }
        if let Some(key) = storage_key {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyStorageKey);
            }
            self.storage_key = key;
        }
        Ok(self)
    }
}
