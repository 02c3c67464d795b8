//! Book: the single record type handled by the shelf.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ShelfError, ValidationError};
use crate::id::BookId;

/// International Standard Book Number, kept as the trimmed text it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// Trim and wrap `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIsbn`] when nothing is left after trimming.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIsbn);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Isbn {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A book known to the catalogue.
///
/// The list API only guarantees `id` and `name`; `author` and `isbn` are
/// omitted from the wire when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<Isbn>,
}

impl Book {
    /// Create a builder for constructing a [`Book`].
    #[must_use]
    pub fn builder() -> BookBuilder {
        BookBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), ShelfError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Book`].
#[derive(Debug, Default)]
pub struct BookBuilder {
    id: Option<BookId>,
    name: Option<String>,
    author: Option<String>,
    isbn: Option<Isbn>,
}

impl BookBuilder {
    #[must_use]
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(BookId(id));
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    #[must_use]
    pub fn isbn(mut self, isbn: Isbn) -> Self {
        self.isbn = Some(isbn);
        self
    }

    /// Consume the builder, validate, and return a [`Book`].
    ///
    /// A missing id defaults to `0`; the catalogue assigns real ids.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Book, ShelfError> {
        let book = Book {
            id: self.id.unwrap_or(BookId(0)),
            name: self.name.unwrap_or_default(),
            author: self.author,
            isbn: self.isbn,
        };
        book.validate()?;
        Ok(book)
    }
}

/// Command payload of `add-book`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub isbn: Isbn,
}

impl NewBook {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIsbn`] for a blank ISBN.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        isbn: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.into(),
            author: author.into(),
            isbn: Isbn::parse(isbn)?,
        })
    }

    /// # Errors
    ///
    /// Returns [`ShelfError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), ShelfError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Turn the command into a stored [`Book`] under `id`.
    #[must_use]
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            name: self.name,
            author: Some(self.author),
            isbn: Some(self.isbn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_trim_isbn_when_parsing() {
        let isbn = Isbn::parse("  978-0 ").unwrap();
        assert_eq!(isbn.as_str(), "978-0");
    }

    #[test]
    fn should_reject_blank_isbn() {
        assert_eq!(Isbn::parse("   "), Err(ValidationError::EmptyIsbn));
    }

    #[test]
    fn should_reject_blank_isbn_when_deserializing() {
        let result: Result<Isbn, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn should_build_valid_book_when_name_provided() {
        let book = Book::builder().id(1).name("Dune").build().unwrap();
        assert_eq!(book.id, BookId(1));
        assert!(book.author.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_is_missing() {
        let result = Book::builder().id(1).build();
        assert!(matches!(
            result,
            Err(ShelfError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_deserialize_book_without_author_or_isbn() {
        let book: Book =
            serde_json::from_str(r#"{"id":1,"name":"Shawshank Redemption"}"#).unwrap();
        assert_eq!(book.name, "Shawshank Redemption");
        assert!(book.isbn.is_none());
    }

    #[test]
    fn should_omit_unknown_fields_when_serializing() {
        let book = Book::builder().id(2).name("Emma").build().unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json, serde_json::json!({"id": 2, "name": "Emma"}));
    }

    #[test]
    fn should_reject_new_book_with_blank_name() {
        let book = NewBook::new(" ", "Someone", "111").unwrap();
        assert!(matches!(
            book.validate(),
            Err(ShelfError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_keep_author_and_isbn_when_stored() {
        let book = NewBook::new("Emma", "Jane Austen", "111")
            .unwrap()
            .into_book(BookId(3));
        assert_eq!(book.author.as_deref(), Some("Jane Austen"));
        assert_eq!(book.isbn.unwrap().as_str(), "111");
    }
}
