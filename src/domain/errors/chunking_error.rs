use thiserror::Error;

use super::GatewayError;

#[derive(Debug, Error)]
pub enum ChunkingError {
    #[error("no gateway attached to the client")]
    NoGateway,

    #[error("requesting members needs the GUILD_MEMBERS intent")]
    MissingIntent,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("member request was cancelled before completion")]
    Cancelled,
}
