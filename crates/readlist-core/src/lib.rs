// ABOUTME: Core library for readlist, containing the book model, intents, and the list store.
// ABOUTME: The actor module serializes every mutation and hands the resulting list to a sink.

pub mod actor;
pub mod command;
pub mod event;
pub mod model;
pub mod state;

pub use actor::{ActorError, ListHandle, SnapshotSink};
pub use command::Intent;
pub use event::{ListChanged, Mutation};
pub use model::{Book, BookError, NewBook, Status};
pub use state::ReadingList;
