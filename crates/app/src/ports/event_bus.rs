//! Event bus port: what the registry needs to know about an event, and how
//! output ports hand events to it.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use bookshelf_domain::event::{BookEvent, EventName};
use bookshelf_domain::id::RequestId;

/// An event that can be dispatched by name.
pub trait Routed: Clone + Send + 'static {
    /// Key under which subscribers and continuations are registered.
    type Name: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn name(&self) -> Self::Name;

    /// The logical request this event belongs to, if any.
    fn correlation(&self) -> Option<RequestId> {
        None
    }
}

impl Routed for BookEvent {
    type Name = EventName;

    fn name(&self) -> EventName {
        BookEvent::name(self)
    }

    fn correlation(&self) -> Option<RequestId> {
        Some(self.request())
    }
}

/// Emits events to every current subscriber.
///
/// Emission is synchronous and infallible: subscribers have run by the time
/// `publish` returns.
pub trait EventPublisher<E> {
    fn publish(&self, event: E);
}

impl<E, T: EventPublisher<E>> EventPublisher<E> for Arc<T> {
    fn publish(&self, event: E) {
        (**self).publish(event);
    }
}
