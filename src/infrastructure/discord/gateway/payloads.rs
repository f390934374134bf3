use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::GatewayOpcode;
use crate::domain::entities::{ApplicationId, ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::domain::errors::GatewayError;
use crate::domain::ports::{GatewayCommand, RequestGuildMembers};
use crate::domain::serde_utils::null_as_default;
use crate::infrastructure::discord::dto::{
    EmojiPayload, MemberPayload, PartialEmojiPayload, RolePayload, ThreadMemberPayload,
    UserPayload,
};

/// Gateway frame envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    fn command(opcode: GatewayOpcode, d: Value) -> Self {
        Self {
            op: opcode.as_u8(),
            d,
            s: None,
            t: None,
        }
    }

    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        self.op == GatewayOpcode::Dispatch.as_u8() && self.t.is_some()
    }
}

#[derive(Debug, Serialize)]
struct RequestGuildMembersData<'a> {
    guild_id: GuildId,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    limit: u32,
    presences: bool,
    #[serde(skip_serializing_if = "no_user_ids")]
    user_ids: &'a [UserId],
    nonce: &'a str,
}

fn no_user_ids(ids: &&[UserId]) -> bool {
    ids.is_empty()
}

impl<'a> From<&'a RequestGuildMembers> for RequestGuildMembersData<'a> {
    fn from(request: &'a RequestGuildMembers) -> Self {
        // the platform rejects frames carrying both selectors
        let query = if request.user_ids.is_empty() {
            Some(request.query.as_deref().unwrap_or(""))
        } else {
            None
        };
        Self {
            guild_id: request.guild_id,
            query,
            limit: request.limit,
            presences: request.presences,
            user_ids: &request.user_ids,
            nonce: &request.nonce,
        }
    }
}

#[derive(Debug, Serialize)]
struct VoiceStateData {
    guild_id: GuildId,
    channel_id: Option<ChannelId>,
    self_mute: bool,
    self_deaf: bool,
}

impl TryFrom<&GatewayCommand> for GatewayPayload {
    type Error = GatewayError;

    fn try_from(command: &GatewayCommand) -> Result<Self, Self::Error> {
        Ok(match command {
            GatewayCommand::RequestGuildMembers(request) => Self::command(
                GatewayOpcode::RequestGuildMembers,
                serde_json::to_value(RequestGuildMembersData::from(request))?,
            ),
            GatewayCommand::UpdateVoiceState {
                guild_id,
                channel_id,
                self_mute,
                self_deaf,
            } => Self::command(
                GatewayOpcode::VoiceStateUpdate,
                serde_json::to_value(VoiceStateData {
                    guild_id: *guild_id,
                    channel_id: *channel_id,
                    self_mute: *self_mute,
                    self_deaf: *self_deaf,
                })?,
            ),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnavailableGuild {
    pub id: GuildId,
    #[serde(default)]
    pub unavailable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialApplication {
    pub id: ApplicationId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    #[serde(default)]
    pub v: u8,
    pub user: UserPayload,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub application: Option<PartialApplication>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMemberEventPayload {
    pub guild_id: GuildId,
    #[serde(flatten)]
    pub member: MemberPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMemberRemovePayload {
    pub guild_id: GuildId,
    pub user: UserPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMembersChunkPayload {
    pub guild_id: GuildId,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    pub chunk_index: u32,
    pub chunk_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_found: Vec<UserId>,
    pub nonce: Option<String>,
}

impl GuildMembersChunkPayload {
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.chunk_index + 1 >= self.chunk_count
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleEventPayload {
    pub guild_id: GuildId,
    pub role: RolePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleDeletePayload {
    pub guild_id: GuildId,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildEmojisUpdatePayload {
    pub guild_id: GuildId,
    #[serde(default)]
    pub emojis: Vec<EmojiPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadDeletePayload {
    pub id: ChannelId,
    pub guild_id: GuildId,
    pub parent_id: Option<ChannelId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMembersUpdatePayload {
    pub id: ChannelId,
    pub guild_id: GuildId,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub added_members: Vec<ThreadMemberPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed_member_ids: Vec<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeletePayload {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeleteBulkPayload {
    pub ids: Vec<MessageId>,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionPayload {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
    /// Reaction add only.
    pub member: Option<MemberPayload>,
    pub emoji: PartialEmojiPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionRemoveAllPayload {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingStartPayload {
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    /// Unix seconds.
    pub timestamp: i64,
    pub member: Option<MemberPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceServerUpdatePayload {
    pub token: String,
    pub guild_id: GuildId,
    /// `None` while the voice server is being reallocated.
    pub endpoint: Option<String>,
}
