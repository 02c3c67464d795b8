//! Application services: use-case implementations.
//!
//! Each service struct accepts its output port via a generic parameter
//! (constructor injection), keeping this layer decoupled from concrete
//! adapters. `listen` is the service's input port: it subscribes the use case
//! to its request event on a registry.

pub mod add_book;
pub mod book_list;
