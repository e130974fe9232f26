// ABOUTME: Defines the Mutation variants the store applies and the ListChanged notice.
// ABOUTME: Every intent resolves to at most one Mutation; applying it bumps the list revision.

use serde::{Deserialize, Serialize};

use crate::model::Book;

/// A concrete change to the reading list. Intents are resolved against the
/// current list into one of these before being applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Mutation {
    /// Replace the whole collection, keeping the given order.
    SetAll { books: Vec<Book> },
    /// Append one book at the end.
    Add { book: Book },
    /// Replace the book with the same id, keeping its position.
    Update { book: Book },
}

/// Broadcast to subscribers after a mutation changed the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListChanged {
    pub revision: u64,
    pub mutation: Mutation,
}
