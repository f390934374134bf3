//! Gateway wire format: frame envelope, opcodes, dispatch payloads and the
//! event tag catalog. The socket itself is owned by the embedding application.

mod constants;
mod event_type;
pub mod payloads;

pub use constants::GatewayOpcode;
pub use event_type::GatewayEventType;
pub use payloads::GatewayPayload;
