//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod books;

use axum::Router;
use axum::routing::{get, post};

use bookshelf_app::ports::BookRepository;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<C, R>() -> Router<AppState<C, R>>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/list-books",
            get(books::list::<C, R>).post(books::reject_list_post),
        )
        .route("/add-book", post(books::add::<C, R>))
        .route("/book/{isbn}", get(books::get::<C, R>))
}
