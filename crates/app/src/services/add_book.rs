//! Add-book use case.
//!
//! Looks the ISBN up first and refuses duplicates; otherwise stores the book.
//! Reports exactly one `book-added` per `add-book`.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::{Failure, ShelfError};
use bookshelf_domain::event::{BookEvent, EventName, Outcome};
use bookshelf_domain::id::RequestId;

use crate::event_bus::{EventRegistry, Subscription};
use crate::ports::{AddBookOutputPort, BookRepository, EventPublisher};

/// Reported when the ISBN is already in the catalogue.
pub const ALREADY_EXISTS: &str = "Book already exists. Failed to add book.";
/// Reported when the store produced no record or could not be reached.
pub const ADDITION_FAILED: &str = "Book addition failed.";

/// Output port backed by a repository and an event publisher.
pub struct AddBookOutput<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> AddBookOutput<R, P> {
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }
}

impl<R, P> AddBookOutputPort for AddBookOutput<R, P>
where
    R: BookRepository + Send + Sync + 'static,
    P: EventPublisher<BookEvent> + Send + Sync + 'static,
{
    fn find_book(
        &self,
        isbn: &Isbn,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send {
        self.repo.find_book(isbn)
    }

    fn add_book(
        &self,
        book: NewBook,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send {
        self.repo.add_book(book)
    }

    fn on_book_added(&self, request: RequestId, outcome: Outcome<Book>) {
        self.publisher.publish(BookEvent::BookAdded { request, outcome });
    }
}

/// Application service for adding a book.
pub struct AddBookService<O> {
    port: O,
}

impl<O: AddBookOutputPort> AddBookService<O> {
    /// Create a new service reporting through `port`.
    pub fn new(port: O) -> Self {
        Self { port }
    }

    /// Add `book` unless its ISBN is already known, then report the outcome.
    pub async fn add_new_book(&self, request: RequestId, book: NewBook) {
        let outcome = self.try_add(book).await;
        self.port.on_book_added(request, outcome);
    }

    async fn try_add(&self, book: NewBook) -> Outcome<Book> {
        match self.port.find_book(&book.isbn).await {
            Ok(Some(existing)) => {
                debug!(isbn = %book.isbn, id = %existing.id, "book already exists");
                return Err(Failure::new(ALREADY_EXISTS));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = ?err, isbn = %book.isbn, "book lookup failed");
                return Err(Failure::new(ADDITION_FAILED));
            }
        }

        let isbn = book.isbn.clone();
        match self.port.add_book(book).await {
            Ok(Some(created)) => Ok(created),
            Ok(None) => {
                warn!(%isbn, "store returned no record");
                Err(Failure::new(ADDITION_FAILED))
            }
            Err(err) => {
                warn!(error = ?err, %isbn, "book addition failed");
                Err(Failure::new(ADDITION_FAILED))
            }
        }
    }

    /// Input port: run this use case for every `add-book` on `registry`.
    ///
    /// Each request runs as its own task on the runtime `listen` was called
    /// from, so the emitting call returns before the repository answers and
    /// may come from any thread.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn listen(
        self: Arc<Self>,
        registry: &EventRegistry<BookEvent>,
    ) -> Subscription<BookEvent> {
        let runtime = Handle::current();
        registry.on(EventName::AddBook, move |event| {
            if let BookEvent::AddBook { request, book } = event {
                let service = Arc::clone(&self);
                let (request, book) = (*request, book.clone());
                runtime.spawn(async move { service.add_new_book(request, book).await });
            }
        })
    }
}
