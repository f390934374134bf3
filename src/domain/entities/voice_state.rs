use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Channel, ChannelId, GuildId, Member, UserId};
use crate::application::Client;

/// A user's voice connection inside a guild. `channel_id` is `None` once
/// the user left voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceState {
    pub(crate) guild_id: GuildId,
    pub(crate) channel_id: Option<ChannelId>,
    pub(crate) user_id: UserId,
    pub(crate) session_id: String,
    pub(crate) deaf: bool,
    pub(crate) mute: bool,
    pub(crate) self_deaf: bool,
    pub(crate) self_mute: bool,
    pub(crate) self_stream: bool,
    pub(crate) self_video: bool,
    pub(crate) suppress: bool,
    pub(crate) request_to_speak_timestamp: Option<DateTime<Utc>>,
}

impl VoiceState {
    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    #[must_use]
    pub const fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Server-side deafen.
    #[must_use]
    pub const fn is_deaf(&self) -> bool {
        self.deaf
    }

    /// Server-side mute.
    #[must_use]
    pub const fn is_mute(&self) -> bool {
        self.mute
    }

    #[must_use]
    pub const fn is_self_deaf(&self) -> bool {
        self.self_deaf
    }

    #[must_use]
    pub const fn is_self_mute(&self) -> bool {
        self.self_mute
    }

    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.self_stream
    }

    #[must_use]
    pub const fn is_video(&self) -> bool {
        self.self_video
    }

    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        self.suppress
    }

    #[must_use]
    pub const fn request_to_speak_timestamp(&self) -> Option<DateTime<Utc>> {
        self.request_to_speak_timestamp
    }

    #[must_use]
    pub fn channel(&self, client: &Client) -> Option<Arc<Channel>> {
        self.channel_id
            .and_then(|id| client.caches().channels().get(&id))
    }

    #[must_use]
    pub fn member(&self, client: &Client) -> Option<Arc<Member>> {
        client.caches().members().get(self.guild_id, self.user_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn voice_state(guild_id: u64, user_id: u64, channel_id: Option<u64>) -> VoiceState {
        VoiceState {
            guild_id: GuildId(guild_id),
            channel_id: channel_id.map(ChannelId),
            user_id: UserId(user_id),
            session_id: "session".to_string(),
            deaf: false,
            mute: false,
            self_deaf: false,
            self_mute: false,
            self_stream: false,
            self_video: false,
            suppress: false,
            request_to_speak_timestamp: None,
        }
    }
}
