//! Gatecord - event dispatch and entity cache core for a chat platform client.
//!
//! Gateway frames go in through [`application::Client::handle_gateway`], are
//! decoded into wire payloads, turned into cached entities by the entity
//! builder and delivered to listeners as typed events.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Client, events, handlers and services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer: cache, configuration, wire formats and adapters.
pub mod infrastructure;

pub use application::{Client, ClientBuilder};

/// Current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = "gatecord";
