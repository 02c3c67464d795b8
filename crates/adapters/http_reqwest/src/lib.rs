//! # bookshelf-adapter-http-reqwest
//!
//! Repository adapter that talks to the bookshelf JSON API over HTTP using
//! [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `BookRepository` port defined in `bookshelf-app`
//! - `GET  /api/list-books`  → list envelope
//! - `GET  /api/book/{isbn}` → single book, `404` meaning "not found"
//! - `POST /api/add-book`    → created book
//! - Map transport failures and unexpected statuses into typed errors
//!
//! ## Dependency rule
//! Depends on `bookshelf-app` (for the port trait) and `bookshelf-domain`
//! (for domain types). The `app` and `domain` crates never reference this
//! adapter.

mod config;
mod error;
mod repository;

pub use config::Config;
pub use error::HttpRepositoryError;
pub use repository::HttpBookRepository;
