// ABOUTME: Defines the Book record and its three-valued reading Status.
// ABOUTME: Serde attributes pin the persisted field names so stored lists stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Errors raised when user input cannot become a Book.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("book title must not be empty")]
    EmptyTitle,

    #[error("book author must not be empty")]
    EmptyAuthor,

    #[error("summary must not be empty")]
    EmptySummary,

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// Reading progress of a book. The serialized names are the ones the list
/// has always been stored with; English names are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "bekliyor", alias = "waiting", alias = "Waiting")]
    Waiting,
    #[serde(rename = "okunuyor", alias = "reading", alias = "Reading")]
    Reading,
    #[serde(rename = "okundu", alias = "read", alias = "Read")]
    Read,
}

impl Status {
    /// All statuses in cycling order.
    pub const ALL: [Status; 3] = [Status::Waiting, Status::Reading, Status::Read];

    /// The status a book moves to when it is tapped: Waiting, Reading, Read,
    /// then back to Waiting.
    pub fn next(self) -> Self {
        match self {
            Status::Waiting => Status::Reading,
            Status::Reading => Status::Read,
            Status::Read => Status::Waiting,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Waiting => "Waiting",
            Status::Reading => "Reading",
            Status::Read => "Read",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiting" | "bekliyor" => Ok(Status::Waiting),
            "reading" | "okunuyor" => Ok(Status::Reading),
            "read" | "okundu" => Ok(Status::Read),
            other => Err(BookError::UnknownStatus(other.to_string())),
        }
    }
}

/// One entry of the reading list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    #[serde(rename = "kitapAdı", alias = "title")]
    pub title: String,
    #[serde(rename = "yazar", alias = "author")]
    pub author: String,
    #[serde(rename = "durum", alias = "status")]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Book {
    /// Create a new book waiting to be read, with a fresh ULID as its id and
    /// no summary.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            title: title.into(),
            author: author.into(),
            status: Status::Waiting,
            summary: None,
        }
    }

    /// Copy of this book with a different status.
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy of this book carrying the given summary.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self.clone()
        }
    }

    pub fn is_read(&self) -> bool {
        self.status == Status::Read
    }
}

/// Validated input for adding a book. Both fields are trimmed and must be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
}

impl NewBook {
    pub fn validate(title: &str, author: &str) -> Result<Self, BookError> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() {
            return Err(BookError::EmptyTitle);
        }
        if author.is_empty() {
            return Err(BookError::EmptyAuthor);
        }
        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
        })
    }

    /// Turn the validated input into a new Waiting book.
    pub fn into_book(self) -> Book {
        Book::new(self.title, self.author)
    }
}
