//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use bookshelf_app::ports::BookRepository;

/// How long a page waits for its completion event unless configured.
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across all axum handlers.
///
/// Generic over the catalogue serving the JSON API (`C`) and the repository
/// the pages wire into their per-request registry (`R`). The two may be the
/// same store, or `R` may be an HTTP client pointed back at this API.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<C, R> {
    /// Store behind `/api/*`.
    pub catalogue: Arc<C>,
    /// Repository the page use cases read from and write to.
    pub pages: Arc<R>,
    /// Upper bound on a page's wait for `books-received` / `book-added`.
    pub page_timeout: Duration,
}

impl<C, R> Clone for AppState<C, R> {
    fn clone(&self) -> Self {
        Self {
            catalogue: Arc::clone(&self.catalogue),
            pages: Arc::clone(&self.pages),
            page_timeout: self.page_timeout,
        }
    }
}

impl<C, R> AppState<C, R>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    /// Create a new application state from owned stores.
    pub fn new(catalogue: C, pages: R) -> Self {
        Self::from_arcs(Arc::new(catalogue), Arc::new(pages))
    }

    /// Create a new application state from pre-wrapped `Arc` stores.
    ///
    /// Use this when the API and the pages share one store.
    pub fn from_arcs(catalogue: Arc<C>, pages: Arc<R>) -> Self {
        Self {
            catalogue,
            pages,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_page_timeout(mut self, page_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self
    }
}
