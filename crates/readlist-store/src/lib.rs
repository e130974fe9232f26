// ABOUTME: Persistence layer for readlist, storing the whole list as one JSON value under a fixed key.
// ABOUTME: Provides key-value providers, the persistence adapter, the save queue, and the manager.

pub mod adapter;
pub mod kv;
pub mod manager;
pub mod queue;
pub mod testing;

pub use adapter::{DEFAULT_STORAGE_KEY, PersistError, PersistenceAdapter};
pub use kv::{FileKv, KeyValueStore, KvError, MemoryKv};
pub use manager::{ManagerError, ReadingListManager};
pub use queue::{SaveQueue, SaveStatus};
