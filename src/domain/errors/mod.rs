//! Domain error types.

mod chunking_error;
mod gateway_error;
mod interaction_error;
mod rest_error;

pub use chunking_error::ChunkingError;
pub use gateway_error::{GatewayError, GatewayResult};
pub use interaction_error::InteractionError;
pub use rest_error::{RestError, RestResult};
