// ABOUTME: Async actor that owns reading-list mutation order and hands every change to a sink.
// ABOUTME: Provides ListHandle for mutate_and_persist, subscribing to changes, and reading state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::command::Intent;
use crate::event::{ListChanged, Mutation};
use crate::model::{Book, BookError, NewBook, Status};
use crate::state::ReadingList;

/// Errors that can occur when processing intents in the actor.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("a book with id {0} already exists")]
    DuplicateId(String),

    #[error("invalid book: {0}")]
    Invalid(#[from] BookError),

    #[error("actor channel closed")]
    ChannelClosed,
}

/// Receives the full post-mutation list every time the actor changes it.
/// The persistence side implements this; the actor never waits on storage.
pub trait SnapshotSink: Send + Sync {
    fn submit(&self, revision: u64, books: Vec<Book>);
}

type Reply = oneshot::Sender<Result<Option<ListChanged>, ActorError>>;

enum Message {
    Mutate(Intent, Reply),
    Stop(oneshot::Sender<()>),
}

/// Cloneable handle for interacting with the list actor. This is the only
/// way to change the shared list, so a change can never skip persistence.
#[derive(Clone)]
pub struct ListHandle {
    cmd_tx: mpsc::Sender<Message>,
    event_tx: broadcast::Sender<ListChanged>,
    state: Arc<RwLock<ReadingList>>,
}

impl ListHandle {
    /// Apply an intent and schedule a save of the resulting list.
    /// Returns the change, or None when the intent left the list as it was
    /// (for example an update of an unknown id).
    pub async fn mutate_and_persist(
        &self,
        intent: Intent,
    ) -> Result<Option<ListChanged>, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Message::Mutate(intent, tx))
            .await
            .map_err(|_| ActorError::ChannelClosed)?;
        rx.await.map_err(|_| ActorError::ChannelClosed)?
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ListChanged> {
        self.event_tx.subscribe()
    }

    /// Get a read-only guard on the shared list.
    pub async fn read_state(&self) -> tokio::sync::RwLockReadGuard<'_, ReadingList> {
        self.state.read().await
    }

    /// Copy of the current ordered collection.
    pub async fn snapshot(&self) -> Vec<Book> {
        self.state.read().await.snapshot().to_vec()
    }

    /// Ask the actor to stop after the intents already queued. Later calls
    /// through any clone of this handle fail with ChannelClosed.
    pub async fn stop(&self) -> Result<(), ActorError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Message::Stop(tx))
            .await
            .map_err(|_| ActorError::ChannelClosed)?;
        rx.await.map_err(|_| ActorError::ChannelClosed)
    }
}

/// Spawn a list actor over `initial` and return its handle with the task.
/// The actor processes intents sequentially, applies them to the list,
/// submits the new list to `sink`, and broadcasts the change.
pub fn spawn(initial: ReadingList, sink: Arc<dyn SnapshotSink>) -> (ListHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Message>(64);
    let (event_tx, _) = broadcast::channel::<ListChanged>(256);
    let state = Arc::new(RwLock::new(initial));

    let handle = ListHandle {
        cmd_tx,
        event_tx: event_tx.clone(),
        state: Arc::clone(&state),
    };

    let actor = ListActor {
        state,
        cmd_rx,
        event_tx,
        sink,
    };

    let task = tokio::spawn(actor.run());

    (handle, task)
}

struct ListActor {
    state: Arc<RwLock<ReadingList>>,
    cmd_rx: mpsc::Receiver<Message>,
    event_tx: broadcast::Sender<ListChanged>,
    sink: Arc<dyn SnapshotSink>,
}

impl ListActor {
    async fn run(mut self) {
        while let Some(message) = self.cmd_rx.recv().await {
            match message {
                Message::Mutate(intent, reply_tx) => {
                    let result = self.process_intent(intent).await;
                    // Ignore send error, the caller may have dropped their receiver
                    let _ = reply_tx.send(result);
                }
                Message::Stop(reply_tx) => {
                    tracing::info!("list actor stopping");
                    let _ = reply_tx.send(());
                    break;
                }
            }
        }
    }

    async fn process_intent(&mut self, intent: Intent) -> Result<Option<ListChanged>, ActorError> {
        let mutation = {
            let state = self.state.read().await;
            match resolve(&state, intent)? {
                Some(mutation) => mutation,
                None => return Ok(None),
            }
        };

        // Apply and capture the snapshot under one write lock so the sink
        // sees exactly the list this mutation produced.
        let (revision, books) = {
            let mut state = self.state.write().await;
            if !state.apply(&mutation) {
                return Ok(None);
            }
            (state.revision(), state.snapshot().to_vec())
        };

        tracing::debug!(revision, books = books.len(), "list changed");
        self.sink.submit(revision, books);

        let change = ListChanged { revision, mutation };
        // Ignore broadcast errors (no active subscribers is fine)
        let _ = self.event_tx.send(change.clone());

        Ok(Some(change))
    }
}

/// Turn an intent into the mutation it stands for, validating it against
/// the current list. Ok(None) means the intent has nothing to change.
fn resolve(state: &ReadingList, intent: Intent) -> Result<Option<Mutation>, ActorError> {
    let mutation = match intent {
        Intent::SetAll { books } => Mutation::SetAll { books },

        Intent::Add { book } => {
            if state.contains(&book.id) {
                return Err(ActorError::DuplicateId(book.id));
            }
            Mutation::Add { book }
        }

        Intent::AddNew { title, author } => Mutation::Add {
            book: NewBook::validate(&title, &author)?.into_book(),
        },

        Intent::Update { book } => {
            if !state.contains(&book.id) {
                tracing::warn!(id = %book.id, "update for unknown book ignored");
                return Ok(None);
            }
            Mutation::Update { book }
        }

        Intent::Move { from, to } => match state.reordered(from, to) {
            Some(books) => Mutation::SetAll { books },
            None => {
                tracing::warn!(from, to, len = state.len(), "move out of range ignored");
                return Ok(None);
            }
        },

        Intent::AdvanceStatus { id } => match state.get(&id) {
            Some(book) => Mutation::Update {
                book: book.with_status(book.status.next()),
            },
            None => return Ok(unknown(&id)),
        },

        Intent::SetStatus { id, status } => match state.get(&id) {
            Some(book) => Mutation::Update {
                book: book.with_status(status),
            },
            None => return Ok(unknown(&id)),
        },

        Intent::AttachSummary { id, summary } => {
            let summary = summary.trim();
            if summary.is_empty() {
                return Err(BookError::EmptySummary.into());
            }
            match state.get(&id) {
                Some(book) => Mutation::Update {
                    book: book.with_status(Status::Read).with_summary(summary),
                },
                None => return Ok(unknown(&id)),
            }
        }
    };

    Ok(Some(mutation))
}

fn unknown(id: &str) -> Option<Mutation> {
    tracing::warn!(%id, "intent for unknown book ignored");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records every submitted snapshot.
    #[derive(Default)]
    struct RecordingSink {
        submitted: Mutex<Vec<(u64, Vec<Book>)>>,
    }

    impl RecordingSink {
        fn submitted(&self) -> Vec<(u64, Vec<Book>)> {
            self.submitted.lock().unwrap().clone()
        }
    }

    impl SnapshotSink for RecordingSink {
        fn submit(&self, revision: u64, books: Vec<Book>) {
            self.submitted.lock().unwrap().push((revision, books));
        }
    }

    fn spawn_recording(initial: ReadingList) -> (ListHandle, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let (handle, _task) = spawn(initial, sink.clone());
        (handle, sink)
    }

    fn dune() -> Book {
        Book {
            id: "1".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            status: Status::Waiting,
            summary: None,
        }
    }

    #[tokio::test]
    async fn actor_adds_book_and_submits_full_list() {
        let (handle, sink) = spawn_recording(ReadingList::new());

        let change = handle
            .mutate_and_persist(Intent::Add { book: dune() })
            .await
            .unwrap()
            .expect("add should change the list");

        assert_eq!(change.revision, 1);
        assert_eq!(handle.snapshot().await, vec![dune()]);

        let submitted = sink.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0], (1, vec![dune()]));
    }

    #[tokio::test]
    async fn actor_rejects_duplicate_id() {
        let (handle, sink) = spawn_recording(ReadingList::from_books(vec![dune()]));

        let result = handle.mutate_and_persist(Intent::Add { book: dune() }).await;

        let err = result.unwrap_err();
        assert!(
            matches!(err, ActorError::DuplicateId(ref id) if id == "1"),
            "expected DuplicateId, got: {}",
            err
        );
        assert_eq!(handle.snapshot().await.len(), 1);
        assert!(sink.submitted().is_empty());
    }

    #[tokio::test]
    async fn actor_ignores_update_of_unknown_id() {
        let (handle, sink) = spawn_recording(ReadingList::from_books(vec![dune()]));

        let mut ghost = dune();
        ghost.id = "404".to_string();
        let result = handle
            .mutate_and_persist(Intent::Update { book: ghost })
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(handle.snapshot().await, vec![dune()]);
        assert!(sink.submitted().is_empty(), "no-op must not schedule a save");
    }

    #[tokio::test]
    async fn actor_add_new_validates_input() {
        let (handle, _sink) = spawn_recording(ReadingList::new());

        let err = handle
            .mutate_and_persist(Intent::AddNew {
                title: "  ".to_string(),
                author: "Herbert".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::Invalid(BookError::EmptyTitle)));

        handle
            .mutate_and_persist(Intent::AddNew {
                title: " Dune ".to_string(),
                author: "Herbert".to_string(),
            })
            .await
            .unwrap();

        let books = handle.snapshot().await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].status, Status::Waiting);
    }

    #[tokio::test]
    async fn actor_advances_status_in_a_cycle() {
        let (handle, _sink) = spawn_recording(ReadingList::from_books(vec![dune()]));
        let advance = || Intent::AdvanceStatus {
            id: "1".to_string(),
        };

        handle.mutate_and_persist(advance()).await.unwrap();
        assert_eq!(handle.snapshot().await[0].status, Status::Reading);

        handle.mutate_and_persist(advance()).await.unwrap();
        assert_eq!(handle.snapshot().await[0].status, Status::Read);

        handle.mutate_and_persist(advance()).await.unwrap();
        assert_eq!(handle.snapshot().await[0].status, Status::Waiting);
    }

    #[tokio::test]
    async fn actor_attach_summary_marks_read() {
        let (handle, sink) = spawn_recording(ReadingList::from_books(vec![dune()]));

        handle
            .mutate_and_persist(Intent::AttachSummary {
                id: "1".to_string(),
                summary: "desert planet".to_string(),
            })
            .await
            .unwrap();

        let books = handle.snapshot().await;
        assert_eq!(books[0].status, Status::Read);
        assert_eq!(books[0].summary.as_deref(), Some("desert planet"));
        assert_eq!(sink.submitted().last().unwrap().1, books);

        let err = handle
            .mutate_and_persist(Intent::AttachSummary {
                id: "1".to_string(),
                summary: " ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::Invalid(BookError::EmptySummary)));
    }

    #[tokio::test]
    async fn actor_move_commits_reordered_list() {
        let mut second = dune();
        second.id = "2".to_string();
        second.title = "Emma".to_string();
        let (handle, sink) = spawn_recording(ReadingList::from_books(vec![dune(), second.clone()]));

        let change = handle
            .mutate_and_persist(Intent::Move { from: 1, to: 0 })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            change.mutation,
            Mutation::SetAll {
                books: vec![second.clone(), dune()]
            }
        );
        assert_eq!(sink.submitted()[0].1, vec![second, dune()]);

        let out_of_range = handle
            .mutate_and_persist(Intent::Move { from: 0, to: 9 })
            .await
            .unwrap();
        assert!(out_of_range.is_none());
    }

    #[tokio::test]
    async fn actor_broadcasts_changes() {
        let (handle, _sink) = spawn_recording(ReadingList::new());
        let mut rx = handle.subscribe();

        handle
            .mutate_and_persist(Intent::Add { book: dune() })
            .await
            .unwrap();

        let change = rx.recv().await.expect("should receive broadcast change");
        assert_eq!(change.revision, 1);
        assert_eq!(change.mutation, Mutation::Add { book: dune() });
    }

    #[tokio::test]
    async fn actor_revisions_continue_from_initial_list() {
        // from_books counts as one set_all
        let (handle, sink) = spawn_recording(ReadingList::from_books(vec![dune()]));

        handle
            .mutate_and_persist(Intent::SetStatus {
                id: "1".to_string(),
                status: Status::Reading,
            })
            .await
            .unwrap();

        assert_eq!(sink.submitted()[0].0, 2);
    }

    #[tokio::test]
    async fn stopped_actor_reports_channel_closed() {
        let sink = Arc::new(RecordingSink::default());
        let (handle, task) = spawn(ReadingList::new(), sink);

        handle.stop().await.unwrap();
        task.await.unwrap();

        let err = handle
            .mutate_and_persist(Intent::Add { book: dune() })
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::ChannelClosed));
    }
}
