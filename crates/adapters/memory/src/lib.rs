//! # bookshelf-adapter-memory
//!
//! In-memory implementation of the `BookRepository` port. It is the store
//! behind the demo JSON API and doubles as a test fixture.
//!
//! ## Seed data
//!
//! | id | name |
//! |----|------|
//! | 1 | Shawshank Redemption |
//! | 2 | The Compound Effect |
//!
//! Seeded books carry no author or ISBN, matching what the list API has
//! always served.
//!
//! ## Dependency rule
//!
//! Depends on `bookshelf-app` (port traits) and `bookshelf-domain` only.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bookshelf_app::ports::BookRepository;
use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::{ConflictError, ShelfError};
use bookshelf_domain::id::BookId;
use bookshelf_domain::listing::BookListing;

/// Thread-safe catalogue held in process memory.
#[derive(Debug)]
pub struct InMemoryCatalogue {
    books: Mutex<Vec<Book>>,
}

impl Default for InMemoryCatalogue {
    fn default() -> Self {
        Self::seeded()
    }
}

impl InMemoryCatalogue {
    /// A catalogue with no books.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_books(Vec::new())
    }

    /// A catalogue holding the demo books.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_books(vec![
            Book {
                id: BookId(1),
                name: "Shawshank Redemption".to_string(),
                author: None,
                isbn: None,
            },
            Book {
                id: BookId(2),
                name: "The Compound Effect".to_string(),
                author: None,
                isbn: None,
            },
        ])
    }

    #[must_use]
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
        }
    }

    fn books(&self) -> MutexGuard<'_, Vec<Book>> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(books: &[Book]) -> BookId {
        BookId(books.iter().map(|book| book.id.0).max().unwrap_or(0) + 1)
    }
}

impl BookRepository for InMemoryCatalogue {
    async fn list_books(&self) -> Result<BookListing, ShelfError> {
        Ok(BookListing::books(self.books().clone()))
    }

    async fn find_book(&self, isbn: &Isbn) -> Result<Option<Book>, ShelfError> {
        Ok(self
            .books()
            .iter()
            .find(|book| book.isbn.as_ref() == Some(isbn))
            .cloned())
    }

    async fn add_book(&self, book: NewBook) -> Result<Option<Book>, ShelfError> {
        book.validate()?;

        let mut books = self.books();
        if books.iter().any(|known| known.isbn.as_ref() == Some(&book.isbn)) {
            return Err(ConflictError {
                entity: "Book",
                id: book.isbn.to_string(),
            }
            .into());
        }

        let created = book.into_book(Self::next_id(&books));
        tracing::debug!(id = %created.id, name = %created.name, "book stored");
        books.push(created.clone());
        Ok(Some(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_domain::error::ValidationError;

    fn emma() -> NewBook {
        NewBook::new("Emma", "Jane Austen", "111").unwrap()
    }

    #[tokio::test]
    async fn should_list_seed_books_by_default() {
        let catalogue = InMemoryCatalogue::default();

        let books = catalogue.list_books().await.unwrap().into_books().unwrap();

        let names: Vec<_> = books.iter().map(|book| book.name.as_str()).collect();
        assert_eq!(names, ["Shawshank Redemption", "The Compound Effect"]);
    }

    #[tokio::test]
    async fn should_assign_next_id_when_adding() {
        let catalogue = InMemoryCatalogue::seeded();

        let created = catalogue.add_book(emma()).await.unwrap().unwrap();

        assert_eq!(created.id, BookId(3));
        assert_eq!(created.author.as_deref(), Some("Jane Austen"));
    }

    #[tokio::test]
    async fn should_find_added_book_by_isbn() {
        let catalogue = InMemoryCatalogue::empty();
        catalogue.add_book(emma()).await.unwrap();

        let found = catalogue
            .find_book(&Isbn::parse("111").unwrap())
            .await
            .unwrap();

        assert_eq!(found.unwrap().name, "Emma");
    }

    #[tokio::test]
    async fn should_return_none_when_isbn_unknown() {
        let catalogue = InMemoryCatalogue::seeded();

        let found = catalogue
            .find_book(&Isbn::parse("999").unwrap())
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_isbn() {
        let catalogue = InMemoryCatalogue::empty();
        catalogue.add_book(emma()).await.unwrap();

        let result = catalogue.add_book(emma()).await;

        assert!(matches!(result, Err(ShelfError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_reject_blank_name() {
        let catalogue = InMemoryCatalogue::empty();
        let book = NewBook::new("", "Nobody", "222").unwrap();

        let result = catalogue.add_book(book).await;

        assert!(matches!(
            result,
            Err(ShelfError::Validation(ValidationError::EmptyName))
        ));
    }
}
