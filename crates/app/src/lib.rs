//! # bookshelf-app
//!
//! Application layer: use-cases, **port definitions** (traits), and the
//! in-process event registry that connects them.
//!
//! ## Responsibilities
//! - Define **driven/outbound ports** that adapters implement:
//!   - `BookRepository`: list, find by ISBN, add
//!   - `EventPublisher`: emit an event onto a registry
//! - Define the **output ports** each use case reports through
//!   (`AddBookOutputPort`, `BookListOutputPort`)
//! - Implement the use cases (`AddBookService`, `BookListService`) and their
//!   **input ports** (`listen`), which subscribe them to request events
//! - Provide the **event registry** (`EventRegistry`): synchronous
//!   publish/subscribe plus continuations awaiting a completion event
//! - Provide **wiring** helpers that assemble all of the above per request
//!
//! ## Dependency rule
//! Depends on `bookshelf-domain` only (plus `tokio` for oneshot channels,
//! task spawning, and timeouts). Never imports adapter crates.

pub mod event_bus;
pub mod ports;
pub mod services;
pub mod wiring;
