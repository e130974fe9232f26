// ABOUTME: Test utilities for readlist-store, including a storage provider that can be told to fail.
// ABOUTME: Used in tests to exercise the log-and-continue paths without a broken disk.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::kv::{KeyValueStore, KvError, MemoryKv};

/// An in-memory provider whose reads and writes can be switched to fail,
/// and which records every successful write in order.
///
/// An optional write delay keeps each write in flight for a while, which
/// lets tests observe how saves queue up behind one another.
#[derive(Debug, Default)]
pub struct FlakyKv {
    inner: MemoryKv,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Option<Duration>,
    writes: Mutex<Vec<String>>,
}

impl FlakyKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that sleeps for `delay` inside every write.
    pub fn with_write_delay(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Values written successfully so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl KeyValueStore for FlakyKv {
    async fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("reads disabled".to_string()));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("writes disabled".to_string()));
        }
        self.inner.set_item(key, value).await?;
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(value.to_string());
        Ok(())
    }
}
