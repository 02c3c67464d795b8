//! Output ports: what each use case may call, and where it reports.
//!
//! A use case never touches the registry or a repository directly; it goes
//! through one of these traits. The `on_*` methods report the single outcome
//! of a request.

use std::future::Future;

use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::ShelfError;
use bookshelf_domain::event::Outcome;
use bookshelf_domain::id::RequestId;
use bookshelf_domain::listing::BookListing;

/// Everything the add-book use case depends on.
pub trait AddBookOutputPort: Send + Sync + 'static {
    fn find_book(
        &self,
        isbn: &Isbn,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send;

    fn add_book(
        &self,
        book: NewBook,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send;

    fn on_book_added(&self, request: RequestId, outcome: Outcome<Book>);
}

/// Everything the book-list use case depends on.
pub trait BookListOutputPort: Send + Sync + 'static {
    fn list_books(&self) -> impl Future<Output = Result<BookListing, ShelfError>> + Send;

    fn on_books_received(&self, request: RequestId, outcome: Outcome<Vec<Book>>);
}
