// ABOUTME: High-level manager that wires storage, the save queue, and the list actor together.
// ABOUTME: Handles explicit startup (load, spawn), reload from storage, and ordered teardown.

use std::sync::Arc;

use readlist_core::{ActorError, Intent, ListChanged, ListHandle, ReadingList, actor};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::adapter::PersistenceAdapter;
use crate::kv::KeyValueStore;
use crate::queue::{SaveQueue, SaveStatus};

/// Errors that can occur while tearing the manager down.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("actor error: {0}")]
    Actor(#[from] ActorError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Owns one reading list: its actor, its save queue, and the adapter they
/// persist through. Construct it once at startup and pass `handle()` clones
/// to whatever needs the list.
pub struct ReadingListManager {
    handle: ListHandle,
    adapter: PersistenceAdapter,
    queue: Arc<SaveQueue>,
    actor_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl ReadingListManager {
    /// Load the stored list from `kv` under `key` and start the actor and
    /// writer tasks. A missing or unreadable stored list starts empty.
    pub async fn open(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let adapter = PersistenceAdapter::new(kv, key);

        let mut list = ReadingList::new();
        adapter.load_into(&mut list).await;
        tracing::info!(
            key = adapter.key(),
            books = list.len(),
            "reading list opened"
        );

        let (queue, writer_task) = SaveQueue::spawn(adapter.clone(), list.revision());
        let (handle, actor_task) = actor::spawn(list, queue.clone());

        Self {
            handle,
            adapter,
            queue,
            actor_task,
            writer_task,
        }
    }

    /// A handle for reading and changing the list.
    pub fn handle(&self) -> ListHandle {
        self.handle.clone()
    }

    /// Shortcut for `handle().mutate_and_persist(intent)`.
    pub async fn apply(&self, intent: Intent) -> Result<Option<ListChanged>, ActorError> {
        self.handle.mutate_and_persist(intent).await
    }

    /// Replace the in-memory list with what storage currently holds. When
    /// nothing is stored or the stored value cannot be read, the list is
    /// left as it is. Returns whether the list was replaced.
    pub async fn reload(&self) -> Result<bool, ActorError> {
        match self.adapter.load().await {
            Some(books) => {
                self.handle
                    .mutate_and_persist(Intent::SetAll { books })
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wait until every change made so far has been handed to storage.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    pub fn save_status(&self) -> SaveStatus {
        self.queue.status()
    }

    /// True when the latest change has not reached storage yet, or its
    /// save failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.queue.has_unsaved_changes()
    }

    /// Stop the actor, write out the last pending snapshot, and wait for
    /// both background tasks to finish. Handles still held elsewhere fail
    /// with `ActorError::ChannelClosed` afterwards.
    pub async fn shutdown(self) -> Result<(), ManagerError> {
        let Self {
            handle,
            adapter: _,
            queue,
            actor_task,
            writer_task,
        } = self;

        handle.stop().await?;
        actor_task.await?;

        queue.flush().await;
        let unsaved = queue.has_unsaved_changes();
        // Last reference to the queue: the writer sees the channel close and exits.
        drop(queue);
        writer_task.await?;

        if unsaved {
            tracing::warn!("reading list closed with unsaved changes");
        } else {
            tracing::info!("reading list closed");
        }
        Ok(())
    }
}
