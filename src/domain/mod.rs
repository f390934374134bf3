//! Domain layer: entities, identifiers, errors and the ports to the outside world.

/// Connection status definitions.
pub mod connection;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Gateway intent flags.
pub mod intents;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use connection::ConnectionStatus;
pub use intents::{GatewayIntent, GatewayIntents};
