//! Adapter-specific error type wrapping reqwest errors.

use bookshelf_domain::error::ShelfError;

/// Errors originating from the HTTP repository.
#[derive(Debug, thiserror::Error)]
pub enum HttpRepositoryError {
    /// Connecting, sending, decoding, or a non-success status.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot carry API paths.
    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
}

impl From<HttpRepositoryError> for ShelfError {
    fn from(err: HttpRepositoryError) -> Self {
        Self::Repository(Box::new(err))
    }
}
