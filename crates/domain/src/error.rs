//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ShelfError`]
//! via `#[from]`. Use-case outcomes are not errors: they are reported as
//! [`Failure`] messages on the event registry.

use std::time::Duration;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("conflict")]
    Conflict(#[from] ConflictError),

    #[error("event bus error")]
    Bus(#[from] BusError),

    #[error("repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("ISBN must not be empty")]
    EmptyIsbn,
}

/// A lookup did not match anything.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A create would collide with an existing record.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{entity} {id} already exists")]
pub struct ConflictError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures of a continuation awaiting a completion event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// The registry was dropped before the completion event was emitted.
    #[error("registry dropped before {event} was emitted")]
    Abandoned { event: String },

    /// The caller-side deadline elapsed first.
    #[error("no {event} within {after:?}")]
    TimedOut { event: String, after: Duration },

    /// A continuation resolved with an event of a different shape.
    #[error("expected {expected}, received {received}")]
    Mismatched { expected: String, received: String },
}

/// Human-readable outcome of a use case that did not succeed.
///
/// Carries no structured error kind: every cause collapses to one fixed
/// message per use case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
}

impl Failure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.message
    }
}
