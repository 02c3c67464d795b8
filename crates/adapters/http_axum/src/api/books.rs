//! JSON REST handlers for books.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use bookshelf_app::ports::BookRepository;
use bookshelf_domain::book::{Book, Isbn, NewBook};
use bookshelf_domain::error::{NotFoundError, ShelfError};
use bookshelf_domain::listing::BookListing;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of the POST rejection on the list endpoint.
pub const POST_NOT_ALLOWED: &str = "POST method not allowed";

/// Request body for adding a book.
#[derive(Deserialize)]
pub struct AddBookRequest {
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub isbn: String,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<BookListing>),
    Rejected(Json<BookListing>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Rejected(json) => (StatusCode::BAD_REQUEST, json).into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Book>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the add endpoint.
pub enum AddResponse {
    Created(Json<Book>),
    NoContent,
}

impl IntoResponse for AddResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/list-books`
pub async fn list<C, R>(State(state): State<AppState<C, R>>) -> Result<ListResponse, ApiError>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    let listing = state.catalogue.list_books().await?;
    Ok(ListResponse::Ok(Json(listing)))
}

/// `POST /api/list-books`
pub async fn reject_list_post() -> ListResponse {
    ListResponse::Rejected(Json(BookListing::rejected(POST_NOT_ALLOWED)))
}

/// `GET /api/book/{isbn}`
pub async fn get<C, R>(
    State(state): State<AppState<C, R>>,
    Path(isbn): Path<String>,
) -> Result<GetResponse, ApiError>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    let isbn = Isbn::parse(&isbn).map_err(ShelfError::from)?;
    let book = state
        .catalogue
        .find_book(&isbn)
        .await?
        .ok_or_else(|| {
            ShelfError::from(NotFoundError {
                entity: "Book",
                id: isbn.to_string(),
            })
        })?;
    Ok(GetResponse::Ok(Json(book)))
}

/// `POST /api/add-book`
pub async fn add<C, R>(
    State(state): State<AppState<C, R>>,
    Json(req): Json<AddBookRequest>,
) -> Result<AddResponse, ApiError>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    let book = NewBook::new(req.name, req.author, &req.isbn).map_err(ShelfError::from)?;
    book.validate()?;
    match state.catalogue.add_book(book).await? {
        Some(created) => Ok(AddResponse::Created(Json(created))),
        None => Ok(AddResponse::NoContent),
    }
}
