//! # bookshelf-domain
//!
//! Pure domain model for the bookshelf application.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Books** and the **NewBook** command used to add one
//! - Define the **BookListing** envelope returned by the list API
//! - Define the **BookEvent** payloads exchanged over the event registry
//!   (`add-book`, `book-added`, `get-books`, `books-received`)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod book;
pub mod event;
pub mod listing;
