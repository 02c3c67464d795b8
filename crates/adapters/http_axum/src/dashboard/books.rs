//! Dashboard pages for books.

use std::sync::Arc;

use askama::Template;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use bookshelf_app::ports::BookRepository;
use bookshelf_app::wiring::BookBus;
use bookshelf_domain::book::{Book, NewBook};

use super::DashboardError;
use crate::state::AppState;

/// One table row, flattened for the template.
pub struct BookRow {
    id: String,
    name: String,
    author: String,
    isbn: String,
}

impl From<Book> for BookRow {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_string(),
            name: book.name,
            author: book.author.unwrap_or_default(),
            isbn: book.isbn.map(String::from).unwrap_or_default(),
        }
    }
}

/// Book list page template.
#[derive(Template)]
#[template(path = "book_list.html")]
pub struct BookListTemplate {
    books: Vec<BookRow>,
    failure: Option<String>,
}

impl IntoResponse for BookListTemplate {
    fn into_response(self) -> Response {
        render(&self, StatusCode::OK)
    }
}

/// Add outcome page template.
#[derive(Template)]
#[template(path = "book_added.html")]
pub struct BookAddedTemplate {
    book: Option<BookRow>,
    failure: Option<String>,
}

impl IntoResponse for BookAddedTemplate {
    fn into_response(self) -> Response {
        let status = if self.book.is_some() {
            StatusCode::CREATED
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        render(&self, status)
    }
}

fn render<T: Template>(page: &T, status: StatusCode) -> Response {
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Form data for adding a book.
#[derive(Deserialize)]
pub struct AddBookForm {
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub isbn: String,
}

/// `GET /`
///
/// Table of every book, fetched through `get-books`.
pub async fn index<C, R>(
    State(state): State<AppState<C, R>>,
) -> Result<BookListTemplate, DashboardError>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    let bus = BookBus::wire(Arc::clone(&state.pages));
    let page = match bus.list_books(state.page_timeout).await? {
        Ok(books) => BookListTemplate {
            books: books.into_iter().map(BookRow::from).collect(),
            failure: None,
        },
        Err(failure) => BookListTemplate {
            books: Vec::new(),
            failure: Some(failure.to_string()),
        },
    };
    Ok(page)
}

/// `POST /books`
///
/// Runs `add-book` with the submitted form.
pub async fn add<C, R>(
    State(state): State<AppState<C, R>>,
    Form(form): Form<AddBookForm>,
) -> Result<BookAddedTemplate, DashboardError>
where
    C: BookRepository + Send + Sync + 'static,
    R: BookRepository + Send + Sync + 'static,
{
    let book = NewBook::new(form.name, form.author, &form.isbn)?;
    book.validate()?;

    let bus = BookBus::wire(Arc::clone(&state.pages));
    let page = match bus.add_book(book, state.page_timeout).await? {
        Ok(book) => BookAddedTemplate {
            book: Some(BookRow::from(book)),
            failure: None,
        },
        Err(failure) => BookAddedTemplate {
            book: None,
            failure: Some(failure.to_string()),
        },
    };
    Ok(page)
}
