//! Wire shapes of the platform's entities, shared by REST responses and
//! gateway dispatches. These are input to the entity builder only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    ApplicationId, AuditLogEntryId, ChannelId, EmojiId, GuildId, InteractionId, MessageId, RoleId,
    Snowflake, UserId,
};
use crate::domain::serde_utils::{null_as_default, present};

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub public_flags: u64,
    /// Self user only.
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub verified: bool,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    /// Missing when the member is nested inside a payload that carries the
    /// user separately (messages, interactions).
    pub user: Option<UserPayload>,
    pub nick: Option<String>,
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<RoleId>,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    pub communication_disabled_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleTagsPayload {
    pub bot_id: Option<Snowflake>,
    pub integration_id: Option<Snowflake>,
    /// Sent as `null` when set, omitted otherwise.
    #[serde(default, deserialize_with = "present")]
    pub premium_subscriber: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RolePayload {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    pub icon: Option<String>,
    pub unicode_emoji: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default, with = "crate::domain::serde_utils::string_to_u64")]
    pub permissions: u64,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
    pub tags: Option<RoleTagsPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmojiPayload {
    /// `None` for unicode emoji.
    pub id: Option<EmojiId>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<RoleId>,
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub require_colons: bool,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMetadataPayload {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub auto_archive_duration: u32,
    pub archive_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locked: bool,
    pub invitable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumTagPayload {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub moderated: bool,
    pub emoji_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPayload {
    pub id: ChannelId,
    #[serde(rename = "type")]
    pub kind: u8,
    pub guild_id: Option<GuildId>,
    pub name: Option<String>,
    #[serde(default)]
    pub position: i32,
    pub parent_id: Option<ChannelId>,
    #[serde(default)]
    pub nsfw: bool,
    pub topic: Option<String>,
    pub last_message_id: Option<MessageId>,
    #[serde(default)]
    pub rate_limit_per_user: u32,
    #[serde(default)]
    pub bitrate: u32,
    #[serde(default)]
    pub user_limit: u32,
    pub rtc_region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipients: Vec<UserPayload>,
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub member_count: u32,
    pub thread_metadata: Option<ThreadMetadataPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_tags: Vec<ForumTagPayload>,
    /// The current user's thread membership, on thread payloads.
    pub member: Option<ThreadMemberPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMemberPayload {
    /// Thread id; omitted inside `GUILD_CREATE`.
    pub id: Option<ChannelId>,
    pub user_id: Option<UserId>,
    pub join_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flags: u64,
    pub member: Option<MemberPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceStatePayload {
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub user_id: UserId,
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub self_stream: bool,
    #[serde(default)]
    pub self_video: bool,
    #[serde(default)]
    pub suppress: bool,
    pub request_to_speak_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildPayload {
    pub id: GuildId,
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: UserId,
    pub afk_channel_id: Option<ChannelId>,
    pub system_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub verification_level: u8,
    #[serde(default)]
    pub premium_tier: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    pub member_count: Option<u64>,
    #[serde(default)]
    pub large: bool,
    #[serde(default)]
    pub unavailable: bool,
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<RolePayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emojis: Vec<EmojiPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<MemberPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<ChannelPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub threads: Vec<ChannelPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub voice_states: Vec<VoiceStatePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub id: Snowflake,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbedPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub color: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialEmojiPayload {
    pub id: Option<EmojiId>,
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionPayload {
    pub emoji: PartialEmojiPayload,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub me: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct MessageReferencePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: UserPayload,
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    pub timestamp: Option<DateTime<Utc>>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentions: Vec<UserPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mention_roles: Vec<RoleId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<AttachmentPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub embeds: Vec<EmbedPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reactions: Vec<ReactionPayload>,
    #[serde(default)]
    pub pinned: bool,
    pub webhook_id: Option<Snowflake>,
    #[serde(default)]
    pub flags: u64,
    pub message_reference: Option<MessageReferencePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedPayload {
    #[serde(default)]
    pub users: HashMap<UserId, UserPayload>,
    #[serde(default)]
    pub members: HashMap<UserId, MemberPayload>,
    #[serde(default)]
    pub roles: HashMap<RoleId, RolePayload>,
    #[serde(default)]
    pub channels: HashMap<ChannelId, ChannelPayload>,
    #[serde(default)]
    pub messages: HashMap<MessageId, MessagePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionDataPayload {
    pub name: Option<String>,
    pub custom_id: Option<String>,
    #[serde(default)]
    pub options: serde_json::Value,
    pub resolved: Option<ResolvedPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub id: InteractionId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_version")]
    pub version: u8,
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub member: Option<MemberPayload>,
    pub user: Option<UserPayload>,
    pub data: Option<InteractionDataPayload>,
    pub message: Option<MessagePayload>,
    pub locale: Option<String>,
    pub guild_locale: Option<String>,
}

const fn default_version() -> u8 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogChangePayload {
    pub key: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogEntryPayload {
    pub id: AuditLogEntryId,
    pub user_id: Option<UserId>,
    pub target_id: Option<Snowflake>,
    pub action_type: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: Vec<AuditLogChangePayload>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogPayload {
    #[serde(default)]
    pub audit_log_entries: Vec<AuditLogEntryPayload>,
    #[serde(default)]
    pub users: Vec<UserPayload>,
    #[serde(default)]
    pub threads: Vec<ChannelPayload>,
}

/// Body of a create-message request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageCreateRequest {
    pub content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<ReplyReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplyReference {
    pub message_id: MessageId,
}

impl MessageCreateRequest {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn reply_to(mut self, message_id: MessageId) -> Self {
        self.message_reference = Some(ReplyReference { message_id });
        self
    }
}

/// Body of an edit-message request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Platform API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: u32,
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    /// Seconds, fractional.
    pub retry_after: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_payload_without_user() {
        let payload: MemberPayload = serde_json::from_str(
            r#"{"roles":["10","11"],"joined_at":"2021-01-01T00:00:00.000000+00:00","deaf":false,"mute":false}"#,
        )
        .unwrap();

        assert!(payload.user.is_none());
        assert_eq!(payload.roles, vec![RoleId(10), RoleId(11)]);
        assert!(payload.joined_at.is_some());
    }

    #[test]
    fn test_role_tags_premium_subscriber() {
        let payload: RolePayload = serde_json::from_str(
            r#"{"id":"5","name":"Booster","permissions":"1024","tags":{"premium_subscriber":null}}"#,
        )
        .unwrap();

        assert_eq!(payload.permissions, 1024);
        assert!(payload.tags.unwrap().premium_subscriber);
    }

    #[test]
    fn test_resolved_maps_keyed_by_id() {
        let payload: ResolvedPayload = serde_json::from_str(
            r#"{"users":{"42":{"id":"42","username":"zed"}}}"#,
        )
        .unwrap();

        assert_eq!(payload.users[&UserId(42)].username, "zed");
    }

    #[test]
    fn test_message_create_request_body() {
        let body = serde_json::to_value(MessageCreateRequest::new("pong").reply_to(MessageId(9)))
            .unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "content": "pong", "message_reference": { "message_id": "9" } })
        );
    }
}
