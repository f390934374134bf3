use thiserror::Error;

use crate::domain::intents::GatewayIntent;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure to hand a command to the transport.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not connected to gateway")]
    NotConnected,

    #[error("failed to send gateway command: {message}")]
    SendFailed { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("channel closed")]
    ChannelClosed,

    #[error("missing gateway intent {0:?}")]
    MissingIntent(GatewayIntent),
}

impl GatewayError {
    #[must_use]
    pub const fn not_connected() -> Self {
        Self::NotConnected
    }

    #[must_use]
    pub fn send_failed(message: impl Into<String>) -> Self {
        Self::SendFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether the same command may succeed once the transport reconnects.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::SendFailed { .. } | Self::ChannelClosed
        )
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(GatewayError::not_connected().is_recoverable());
        assert!(GatewayError::send_failed("socket gone").is_recoverable());
        assert!(!GatewayError::serialization("bad").is_recoverable());
        assert!(!GatewayError::MissingIntent(GatewayIntent::GuildMembers).is_recoverable());
    }
}
