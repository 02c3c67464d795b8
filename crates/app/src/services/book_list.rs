//! Get-book-list use case.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

use bookshelf_domain::book::Book;
use bookshelf_domain::error::{Failure, ShelfError};
use bookshelf_domain::event::{BookEvent, EventName, Outcome};
use bookshelf_domain::id::RequestId;
use bookshelf_domain::listing::{BookListing, ListingMessage};

use crate::event_bus::{EventRegistry, Subscription};
use crate::ports::{BookListOutputPort, BookRepository, EventPublisher};

/// Reported for every way the list can fail to arrive.
pub const LIST_FAILED: &str = "Failed to get book list.";

/// Output port backed by a repository and an event publisher.
pub struct BookListOutput<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> BookListOutput<R, P> {
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }
}

impl<R, P> BookListOutputPort for BookListOutput<R, P>
where
    R: BookRepository + Send + Sync + 'static,
    P: EventPublisher<BookEvent> + Send + Sync + 'static,
{
    fn list_books(&self) -> impl Future<Output = Result<BookListing, ShelfError>> + Send {
        self.repo.list_books()
    }

    fn on_books_received(&self, request: RequestId, outcome: Outcome<Vec<Book>>) {
        self.publisher.publish(BookEvent::BooksReceived { request, outcome });
    }
}

/// Application service for listing books.
pub struct BookListService<O> {
    port: O,
}

impl<O: BookListOutputPort> BookListService<O> {
    /// Create a new service reporting through `port`.
    pub fn new(port: O) -> Self {
        Self { port }
    }

    /// Fetch the list and report it, or report [`LIST_FAILED`].
    pub async fn get_book_list(&self, request: RequestId) {
        let outcome = match self.port.list_books().await {
            Ok(BookListing {
                success: true,
                message: ListingMessage::Books(books),
            }) => Ok(books),
            Ok(listing) => {
                warn!(message = ?listing.message, "book list rejected");
                Err(Failure::new(LIST_FAILED))
            }
            Err(err) => {
                warn!(error = ?err, "book list unavailable");
                Err(Failure::new(LIST_FAILED))
            }
        };
        self.port.on_books_received(request, outcome);
    }

    /// Input port: run this use case for every `get-books` on `registry`.
    ///
    /// Requests are spawned on the runtime `listen` was called from, so
    /// `get-books` may be emitted from any thread.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn listen(
        self: Arc<Self>,
        registry: &EventRegistry<BookEvent>,
    ) -> Subscription<BookEvent> {
        let runtime = Handle::current();
        registry.on(EventName::GetBooks, move |event| {
            if let BookEvent::GetBooks { request } = event {
                let service = Arc::clone(&self);
                let request = *request;
                runtime.spawn(async move { service.get_book_list(request).await });
            }
        })
    }
}
