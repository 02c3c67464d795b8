//! Book repository port: data access for the catalogue.

use std::future::Future;
use std::sync::Arc;

use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::ShelfError;
use bookshelf_domain::listing::BookListing;

/// Access to the book catalogue, wherever it lives.
pub trait BookRepository {
    /// Fetch the whole list, wrapped in the list API envelope.
    fn list_books(&self) -> impl Future<Output = Result<BookListing, ShelfError>> + Send;

    /// Look a book up by ISBN.
    fn find_book(
        &self,
        isbn: &Isbn,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send;

    /// Store a new book. `Ok(None)` means the store accepted the call but
    /// produced no record.
    fn add_book(
        &self,
        book: NewBook,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send;
}

impl<T: BookRepository + Send + Sync> BookRepository for Arc<T> {
    fn list_books(&self) -> impl Future<Output = Result<BookListing, ShelfError>> + Send {
        (**self).list_books()
    }

    fn find_book(
        &self,
        isbn: &Isbn,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send {
        (**self).find_book(isbn)
    }

    fn add_book(
        &self,
        book: NewBook,
    ) -> impl Future<Output = Result<Option<Book>, ShelfError>> + Send {
        (**self).add_book(book)
    }
}
