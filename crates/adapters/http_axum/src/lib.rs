//! # bookshelf-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **book JSON API** (`/api/list-books`, `/api/add-book`,
//!   `/api/book/{isbn}`) straight from a catalogue repository
//! - Serve **server-side-rendered pages** that drive the use cases through a
//!   fresh event registry per request: `GET /` lists the books, `POST /books`
//!   adds one
//! - Map application results into HTTP responses (JSON or HTML)
//!
//! ## Dependency rule
//! Depends on `bookshelf-app` (for port traits, use cases, and wiring) and
//! `bookshelf-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod state;
