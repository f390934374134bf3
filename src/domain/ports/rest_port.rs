//! Per-resource REST operations. Every call returns the raw wire payload;
//! callers feed it back through the entity builder.

use async_trait::async_trait;

use crate::domain::entities::{ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::domain::errors::RestResult;
use crate::infrastructure::discord::dto::{
    AuditLogPayload, ChannelPayload, MemberPayload, MessageCreateRequest, MessagePayload,
    MessageUpdateRequest, RolePayload, UserPayload,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestPort: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> RestResult<UserPayload>;

    async fn get_member(&self, guild_id: GuildId, user_id: UserId) -> RestResult<MemberPayload>;

    async fn get_channel(&self, channel_id: ChannelId) -> RestResult<ChannelPayload>;

    async fn create_message(
        &self,
        channel_id: ChannelId,
        request: MessageCreateRequest,
    ) -> RestResult<MessagePayload>;

    async fn update_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        request: MessageUpdateRequest,
    ) -> RestResult<MessagePayload>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> RestResult<()>;

    /// Opens (or returns the existing) DM channel with a user.
    async fn create_dm(&self, recipient_id: UserId) -> RestResult<ChannelPayload>;

    async fn get_roles(&self, guild_id: GuildId) -> RestResult<Vec<RolePayload>>;

    async fn get_audit_log(&self, guild_id: GuildId, limit: u8) -> RestResult<AuditLogPayload>;

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> RestResult<()>;
}
