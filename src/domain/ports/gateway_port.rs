//! Outbound side of the event-stream transport.

use async_trait::async_trait;

use crate::domain::connection::ConnectionStatus;
use crate::domain::entities::{ChannelId, GuildId, UserId};
use crate::domain::errors::GatewayError;
use crate::domain::intents::GatewayIntents;

/// Bulk member fetch (opcode 8). Exactly one of `query` or `user_ids` is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestGuildMembers {
    pub guild_id: GuildId,
    pub query: Option<String>,
    /// Zero means no limit.
    pub limit: u32,
    pub presences: bool,
    pub user_ids: Vec<UserId>,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCommand {
    RequestGuildMembers(RequestGuildMembers),
    UpdateVoiceState {
        guild_id: GuildId,
        /// `None` disconnects.
        channel_id: Option<ChannelId>,
        self_mute: bool,
        self_deaf: bool,
    },
}

impl GatewayCommand {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestGuildMembers(_) => "REQUEST_GUILD_MEMBERS",
            Self::UpdateVoiceState { .. } => "UPDATE_VOICE_STATE",
        }
    }
}

/// The transport as seen by the dispatch core. Inbound frames are pushed into
/// [`Client::handle_gateway`](crate::application::Client::handle_gateway) by
/// whoever owns the connection.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Sends a command over the open connection.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the connection is down or the write fails.
    async fn send(&self, command: GatewayCommand) -> Result<(), GatewayError>;

    fn status(&self) -> ConnectionStatus;

    fn intents(&self) -> GatewayIntents;
}

#[cfg(test)]
pub mod mock {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Records every sent command.
    pub struct MockGateway {
        sent: Arc<Mutex<Vec<GatewayCommand>>>,
        status: Mutex<ConnectionStatus>,
        intents: GatewayIntents,
        fail_sends: bool,
    }

    impl MockGateway {
        /// Creates a connected mock gateway with the given intents.
        pub fn new(intents: GatewayIntents) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                status: Mutex::new(ConnectionStatus::Connected),
                intents,
                fail_sends: false,
            }
        }

        /// Every `send` fails with `NotConnected`.
        pub fn failing(intents: GatewayIntents) -> Self {
            Self {
                fail_sends: true,
                ..Self::new(intents)
            }
        }

        pub fn set_status(&self, status: ConnectionStatus) {
            *self.status.lock() = status;
        }

        pub fn sent(&self) -> Vec<GatewayCommand> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl GatewayPort for MockGateway {
        async fn send(&self, command: GatewayCommand) -> Result<(), GatewayError> {
            if self.fail_sends {
                return Err(GatewayError::not_connected());
            }
            self.sent.lock().push(command);
            Ok(())
        }

        fn status(&self) -> ConnectionStatus {
            *self.status.lock()
        }

        fn intents(&self) -> GatewayIntents {
            self.intents
        }
    }
}
