//! Events exchanged between the shelf's ports.
//!
//! Each event name has exactly one payload shape. Request events carry the
//! command, completion events carry the outcome, and both carry the
//! [`RequestId`] of the logical request they belong to.

use std::fmt;
use std::str::FromStr;

use crate::book::{Book, NewBook};
use crate::error::Failure;
use crate::id::RequestId;

/// What a use case reports: the payload, or the reason it could not produce it.
pub type Outcome<T> = Result<T, Failure>;

/// The closed set of event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    AddBook,
    BookAdded,
    GetBooks,
    BooksReceived,
}

impl EventName {
    pub const ALL: [Self; 4] = [
        Self::AddBook,
        Self::BookAdded,
        Self::GetBooks,
        Self::BooksReceived,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddBook => "add-book",
            Self::BookAdded => "book-added",
            Self::GetBooks => "get-books",
            Self::BooksReceived => "books-received",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that names no known event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event name {0:?}")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

/// Payload of every emission on the shelf's registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// `add-book`: add `book` unless its ISBN is already known.
    AddBook { request: RequestId, book: NewBook },
    /// `book-added`: the stored book, or why it was not stored.
    BookAdded {
        request: RequestId,
        outcome: Outcome<Book>,
    },
    /// `get-books`: fetch the current list.
    GetBooks { request: RequestId },
    /// `books-received`: the list, or why it could not be fetched.
    BooksReceived {
        request: RequestId,
        outcome: Outcome<Vec<Book>>,
    },
}

impl BookEvent {
    /// An `add-book` request under a fresh [`RequestId`].
    #[must_use]
    pub fn add_book(book: NewBook) -> Self {
        Self::AddBook {
            request: RequestId::new(),
            book,
        }
    }

    /// A `get-books` request under a fresh [`RequestId`].
    #[must_use]
    pub fn get_books() -> Self {
        Self::GetBooks {
            request: RequestId::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::AddBook { .. } => EventName::AddBook,
            Self::BookAdded { .. } => EventName::BookAdded,
            Self::GetBooks { .. } => EventName::GetBooks,
            Self::BooksReceived { .. } => EventName::BooksReceived,
        }
    }

    #[must_use]
    pub fn request(&self) -> RequestId {
        match self {
            Self::AddBook { request, .. }
            | Self::BookAdded { request, .. }
            | Self::GetBooks { request }
            | Self::BooksReceived { request, .. } => *request,
        }
    }
}
