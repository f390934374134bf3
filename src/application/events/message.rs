use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    ChannelId, GuildId, Member, Message, MessageId, ReactionEmoji, UserId,
};

#[derive(Debug, Clone)]
pub struct MessageCreate {
    pub message: Arc<Message>,
}

#[derive(Debug, Clone)]
pub struct GuildMessageCreate {
    pub guild_id: GuildId,
    pub message: Arc<Message>,
}

#[derive(Debug, Clone)]
pub struct DmMessageCreate {
    pub message: Arc<Message>,
}

#[derive(Debug, Clone)]
pub struct MessageUpdate {
    pub message: Arc<Message>,
    pub old_message: Option<Arc<Message>>,
}

#[derive(Debug, Clone)]
pub struct GuildMessageUpdate {
    pub guild_id: GuildId,
    pub message: Arc<Message>,
    pub old_message: Option<Arc<Message>>,
}

#[derive(Debug, Clone)]
pub struct DmMessageUpdate {
    pub message: Arc<Message>,
    pub old_message: Option<Arc<Message>>,
}

/// One per deleted message; bulk deletes produce one per id.
#[derive(Debug, Clone)]
pub struct MessageDelete {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    /// Last cached copy, if messages are cached.
    pub message: Option<Arc<Message>>,
}

#[derive(Debug, Clone)]
pub struct GuildMessageDelete {
    pub guild_id: GuildId,
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub message: Option<Arc<Message>>,
}

#[derive(Debug, Clone)]
pub struct DmMessageDelete {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub message: Option<Arc<Message>>,
}

#[derive(Debug, Clone)]
pub struct MessageReactionAdd {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
    pub member: Option<Arc<Member>>,
    pub emoji: ReactionEmoji,
}

#[derive(Debug, Clone)]
pub struct MessageReactionRemove {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
    pub emoji: ReactionEmoji,
}

#[derive(Debug, Clone)]
pub struct MessageReactionRemoveAll {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone)]
pub struct UserTypingStart {
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub member: Option<Arc<Member>>,
}
