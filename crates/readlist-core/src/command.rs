// ABOUTME: Defines the Intent enum representing every change a caller can ask for.
// ABOUTME: Intents are resolved against the current list into a single Mutation by the actor.

use serde::{Deserialize, Serialize};

use crate::model::{Book, Status};

/// A requested change to the reading list. Low-level intents map directly to
/// store operations; the rest are conveniences that resolve into an Update
/// or SetAll against the current list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    SetAll {
        books: Vec<Book>,
    },
    Add {
        book: Book,
    },
    /// Validate the title and author, then add a new Waiting book.
    AddNew {
        title: String,
        author: String,
    },
    Update {
        book: Book,
    },
    /// Move a book from one index to another (drag-and-drop commit).
    Move {
        from: usize,
        to: usize,
    },
    /// Cycle a book to its next status.
    AdvanceStatus {
        id: String,
    },
    SetStatus {
        id: String,
        status: Status,
    },
    /// Mark a book read and attach a summary to it.
    AttachSummary {
        id: String,
        summary: String,
    },
}
