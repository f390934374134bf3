//! Application layer: the client handle, dispatch and the events it emits.

/// Client handle and builder.
pub mod client;
/// Events delivered to listeners.
pub mod events;
pub(crate) mod handlers;
/// Entity construction, dispatch, chunking and collectors.
pub mod services;

pub use client::{Client, ClientBuilder};
