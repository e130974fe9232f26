// ABOUTME: Save queue that persists list snapshots one at a time, newest pending snapshot wins.
// ABOUTME: Implements SnapshotSink so the list actor can hand off saves without waiting on storage.

use std::sync::Arc;

use readlist_core::{Book, SnapshotSink};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapter::PersistenceAdapter;

/// A snapshot waiting to be written.
#[derive(Debug, Clone)]
struct PendingSave {
    revision: u64,
    books: Vec<Book>,
}

/// Progress of the writer task, in list revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveStatus {
    /// Newest revision the writer has tried to save.
    pub attempted: u64,
    /// Newest revision that was saved successfully.
    pub persisted: u64,
}

/// Serializes saves through a single writer task.
///
/// Submitting replaces whatever snapshot is still pending, so at most one
/// save is in flight and one is waiting. A failed save is logged and not
/// retried; the next submission supersedes it.
pub struct SaveQueue {
    pending_tx: watch::Sender<Option<PendingSave>>,
    status_rx: watch::Receiver<SaveStatus>,
}

impl SaveQueue {
    /// Spawn the writer task. `initial_revision` is the revision already
    /// present in storage (the one just loaded), so it counts as persisted.
    pub fn spawn(adapter: PersistenceAdapter, initial_revision: u64) -> (Arc<Self>, JoinHandle<()>) {
        let (pending_tx, pending_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(SaveStatus {
            attempted: initial_revision,
            persisted: initial_revision,
        });

        let task = tokio::spawn(run_writer(adapter, pending_rx, status_tx));

        let queue = Arc::new(Self {
            pending_tx,
            status_rx,
        });
        (queue, task)
    }

    /// Queue `books` for saving as `revision`.
    pub fn submit(&self, revision: u64, books: Vec<Book>) {
        tracing::debug!(revision, books = books.len(), "queueing save");
        self.pending_tx
            .send_replace(Some(PendingSave { revision, books }));
    }

    /// Newest revision handed to the queue, if any.
    pub fn submitted_revision(&self) -> Option<u64> {
        self.pending_tx.borrow().as_ref().map(|p| p.revision)
    }

    pub fn status(&self) -> SaveStatus {
        *self.status_rx.borrow()
    }

    /// True when the newest submitted revision has not been saved
    /// successfully, either because it is still queued or because its save
    /// failed.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.submitted_revision() {
            Some(revision) => self.status().persisted < revision,
            None => false,
        }
    }

    /// Wait until the writer has attempted every revision submitted so far.
    pub async fn flush(&self) {
        let Some(target) = self.submitted_revision() else {
            return;
        };
        let mut status_rx = self.status_rx.clone();
        // An error means the writer is gone; there is nothing left to wait for.
        let _ = status_rx.wait_for(|s| s.attempted >= target).await;
    }
}

impl SnapshotSink for SaveQueue {
    fn submit(&self, revision: u64, books: Vec<Book>) {
        SaveQueue::submit(self, revision, books);
    }
}

/// Writer loop: take the newest pending snapshot, save it, report progress.
/// Exits once the queue is dropped and the last pending snapshot is written.
async fn run_writer(
    adapter: PersistenceAdapter,
    mut pending_rx: watch::Receiver<Option<PendingSave>>,
    status_tx: watch::Sender<SaveStatus>,
) {
    while pending_rx.changed().await.is_ok() {
        let next = pending_rx.borrow_and_update().clone();
        let Some(pending) = next else {
            continue;
        };

        let saved = adapter.save(&pending.books).await;
        if !saved {
            tracing::warn!(revision = pending.revision, "revision left unsaved");
        }

        status_tx.send_modify(|status| {
            status.attempted = status.attempted.max(pending.revision);
            if saved {
                status.persisted = status.persisted.max(pending.revision);
            }
        });
    }
    tracing::debug!("save queue writer finished");
}
