//! Server-side rendered HTML pages (no JavaScript).
//!
//! Every page request wires a fresh event registry onto the page repository,
//! emits the request event and renders the matching completion event.

#[allow(clippy::missing_errors_doc)]
pub mod books;

use askama::Template;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};

use bookshelf_app::ports::BookRepository;
use bookshelf_domain::error::{BusError, ShelfError, ValidationError};

use crate::error::classify;
use crate::state::AppState;

/// Build the dashboard sub-router for SSR HTML pages.
pub fn routes<C, R>() -> Router<AppState<C, R>>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(books::index::<C, R>))
        .route("/books", post(books::add::<C, R>))
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

/// HTML error response for dashboard pages.
pub struct DashboardError(ShelfError);

impl From<ShelfError> for DashboardError {
    fn from(err: ShelfError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<BusError> for DashboardError {
    fn from(err: BusError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self.0);
        let page = ErrorTemplate {
            status: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to render error page");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
