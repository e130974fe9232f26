// ABOUTME: Persistence adapter that stores the whole reading list as one JSON array under a fixed key.
// ABOUTME: load/save log failures and never propagate them; try_load/try_save expose the cause.

use std::sync::Arc;

use readlist_core::{Book, ReadingList};
use thiserror::Error;

use crate::kv::{KeyValueStore, KvError};

/// Storage key the list has always been kept under.
pub const DEFAULT_STORAGE_KEY: &str = "@kitaplar";

/// Errors from reading or writing the stored list.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage error: {0}")]
    Kv(#[from] KvError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the full list under a single key. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and parse the stored list. `Ok(None)` when nothing is stored.
    pub async fn try_load(&self) -> Result<Option<Vec<Book>>, PersistError> {
        let Some(json) = self.kv.get_item(&self.key).await? else {
            return Ok(None);
        };
        let books: Vec<Book> = serde_json::from_str(&json)?;
        Ok(Some(books))
    }

    /// Load the stored list, logging and swallowing any failure.
    pub async fn load(&self) -> Option<Vec<Book>> {
        match self.try_load().await {
            Ok(Some(books)) => {
                tracing::info!(key = %self.key, books = books.len(), "loaded reading list");
                Some(books)
            }
            Ok(None) => {
                tracing::info!(key = %self.key, "no stored reading list");
                None
            }
            Err(e) => {
                tracing::error!(key = %self.key, "failed to load reading list: {}", e);
                None
            }
        }
    }

    /// Load the stored list into `list` through `set_all`. When nothing is
    /// stored or loading fails, `list` keeps its prior contents.
    /// Returns whether the list was replaced.
    pub async fn load_into(&self, list: &mut ReadingList) -> bool {
        match self.load().await {
            Some(books) => {
                list.set_all(books);
                true
            }
            None => false,
        }
    }

    /// Serialize and write the complete list, replacing the stored value.
    pub async fn try_save(&self, books: &[Book]) -> Result<(), PersistError> {
        let json = serde_json::to_string(books)?;
        self.kv.set_item(&self.key, &json).await?;
        Ok(())
    }

    /// Save the list, logging any failure. Returns whether the write succeeded.
    pub async fn save(&self, books: &[Book]) -> bool {
        match self.try_save(books).await {
            Ok(()) => {
                tracing::debug!(key = %self.key, books = books.len(), "saved reading list");
                true
            }
            Err(e) => {
                tracing::error!(key = %self.key, "failed to save reading list: {}", e);
                false
            }
        }
    }
}
