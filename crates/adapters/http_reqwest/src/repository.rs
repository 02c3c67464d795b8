//! `BookRepository` over HTTP.

use reqwest::{Client, StatusCode, Url};

use bookshelf_app::ports::BookRepository;
use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::{ConflictError, ShelfError};
use bookshelf_domain::listing::BookListing;

use crate::error::HttpRepositoryError;

/// Book repository backed by the bookshelf JSON API.
#[derive(Debug, Clone)]
pub struct HttpBookRepository {
    client: Client,
    base_url: Url,
}

impl HttpBookRepository {
    pub(crate) fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpRepositoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpRepositoryError::BaseUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_listing(&self) -> Result<BookListing, HttpRepositoryError> {
        let url = self.endpoint(&["api", "list-books"])?;
        tracing::debug!(%url, "listing books");
        let listing = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing)
    }

    async fn fetch_book(&self, isbn: &Isbn) -> Result<Option<Book>, HttpRepositoryError> {
        let url = self.endpoint(&["api", "book", isbn.as_str()])?;
        tracing::debug!(%url, "finding book");
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let book = response.error_for_status()?.json().await?;
        Ok(Some(book))
    }
}

impl BookRepository for HttpBookRepository {
    async fn list_books(&self) -> Result<BookListing, ShelfError> {
        Ok(self.fetch_listing().await?)
    }

    async fn find_book(&self, isbn: &Isbn) -> Result<Option<Book>, ShelfError> {
        Ok(self.fetch_book(isbn).await?)
    }

    async fn add_book(&self, book: NewBook) -> Result<Option<Book>, ShelfError> {
        let url = self.endpoint(&["api", "add-book"])?;
        tracing::debug!(%url, isbn = %book.isbn, "adding book");
        let response = self
            .client
            .post(url)
            .json(&book)
            .send()
            .await
            .map_err(HttpRepositoryError::from)?;

        match response.status() {
            StatusCode::CONFLICT => Err(ConflictError {
                entity: "Book",
                id: book.isbn.to_string(),
            }
            .into()),
            StatusCode::NO_CONTENT => Ok(None),
            _ => {
                let created = response
                    .error_for_status()
                    .map_err(HttpRepositoryError::from)?
                    .json()
                    .await
                    .map_err(HttpRepositoryError::from)?;
                Ok(Some(created))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn repo(base_url: &str) -> HttpBookRepository {
        Config {
            base_url: base_url.to_string(),
            ..Config::default()
        }
        .build()
        .unwrap()
    }

    #[test]
    fn should_append_api_path_to_origin() {
        let url = repo("http://localhost:3000")
            .endpoint(&["api", "list-books"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/list-books");
    }

    #[test]
    fn should_keep_base_path_prefix() {
        let url = repo("http://example.test/shelf/")
            .endpoint(&["api", "add-book"])
            .unwrap();
        assert_eq!(url.as_str(), "http://example.test/shelf/api/add-book");
    }

    #[test]
    fn should_percent_encode_isbn_segment() {
        let url = repo("http://localhost:3000")
            .endpoint(&["api", "book", "978 0/1"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/book/978%200%2F1");
    }

    #[tokio::test]
    async fn should_surface_connection_failure_as_repository_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let result = repo("http://127.0.0.1:9").list_books().await;
        assert!(matches!(result, Err(ShelfError::Repository(_))));
    }
}
