//! Assembly of registry, output ports, use cases, and input ports.
//!
//! A caller either wires a single use case onto a registry it already owns
//! ([`wire_book_list`], [`wire_add_book`]), or builds a [`BookBus`] with both.
//! Output ports hold only a weak [`Emitter`](crate::event_bus::Emitter), so
//! dropping the registry releases every use case wired onto it.

use std::sync::Arc;
use std::time::Duration;

use bookshelf_domain::book::{Book, NewBook};
use bookshelf_domain::error::BusError;
use bookshelf_domain::event::{BookEvent, EventName, Outcome};

use crate::event_bus::{EventRegistry, Subscription};
use crate::ports::BookRepository;
use crate::services::add_book::{AddBookOutput, AddBookService};
use crate::services::book_list::{BookListOutput, BookListService};

/// Subscribe the book-list use case, backed by `repo`, to `get-books`.
pub fn wire_book_list<R>(registry: &EventRegistry<BookEvent>, repo: R) -> Subscription<BookEvent>
where
    R: BookRepository + Send + Sync + 'static,
{
    let output = BookListOutput::new(repo, registry.emitter());
    Arc::new(BookListService::new(output)).listen(registry)
}

/// Subscribe the add-book use case, backed by `repo`, to `add-book`.
pub fn wire_add_book<R>(registry: &EventRegistry<BookEvent>, repo: R) -> Subscription<BookEvent>
where
    R: BookRepository + Send + Sync + 'static,
{
    let output = AddBookOutput::new(repo, registry.emitter());
    Arc::new(AddBookService::new(output)).listen(registry)
}

/// A registry with both use cases wired onto it.
pub struct BookBus {
    registry: EventRegistry<BookEvent>,
}

impl BookBus {
    /// Wire both use cases onto a fresh registry.
    pub fn wire<R>(repo: R) -> Self
    where
        R: BookRepository + Send + Sync + 'static,
    {
        Self::with_registry(EventRegistry::new(), repo)
    }

    /// Wire both use cases onto `registry`, which may already carry other
    /// subscribers.
    pub fn with_registry<R>(registry: EventRegistry<BookEvent>, repo: R) -> Self
    where
        R: BookRepository + Send + Sync + 'static,
    {
        let repo = Arc::new(repo);
        wire_book_list(&registry, Arc::clone(&repo));
        wire_add_book(&registry, repo);
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &EventRegistry<BookEvent> {
        &self.registry
    }

    /// Emit `get-books` and wait up to `deadline` for its `books-received`.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when no answer arrives in time. A use-case
    /// failure is not an error: it is the `Err` side of the returned outcome.
    pub async fn list_books(&self, deadline: Duration) -> Result<Outcome<Vec<Book>>, BusError> {
        let reply = self
            .registry
            .request(BookEvent::get_books(), EventName::BooksReceived)
            .within(deadline)
            .await?;
        match reply {
            BookEvent::BooksReceived { outcome, .. } => Ok(outcome),
            other => Err(mismatched(EventName::BooksReceived, &other)),
        }
    }

    /// Emit `add-book` and wait up to `deadline` for its `book-added`.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] when no answer arrives in time.
    pub async fn add_book(
        &self,
        book: NewBook,
        deadline: Duration,
    ) -> Result<Outcome<Book>, BusError> {
        let reply = self
            .registry
            .request(BookEvent::add_book(book), EventName::BookAdded)
            .within(deadline)
            .await?;
        match reply {
            BookEvent::BookAdded { outcome, .. } => Ok(outcome),
            other => Err(mismatched(EventName::BookAdded, &other)),
        }
    }
}

fn mismatched(expected: EventName, received: &BookEvent) -> BusError {
    BusError::Mismatched {
        expected: expected.to_string(),
        received: received.name().to_string(),
    }
}
