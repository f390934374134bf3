use std::sync::Arc;

use crate::domain::entities::{Channel, ChannelId, GuildId, Member, ThreadMember, UserId};

#[derive(Debug, Clone)]
pub struct ChannelCreate {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct GuildChannelCreate {
    pub guild_id: GuildId,
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct DmChannelCreate {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct ChannelUpdate {
    pub channel: Arc<Channel>,
    pub old_channel: Option<Arc<Channel>>,
}

#[derive(Debug, Clone)]
pub struct GuildChannelUpdate {
    pub guild_id: GuildId,
    pub channel: Arc<Channel>,
    pub old_channel: Option<Arc<Channel>>,
}

#[derive(Debug, Clone)]
pub struct DmChannelUpdate {
    pub channel: Arc<Channel>,
    pub old_channel: Option<Arc<Channel>>,
}

#[derive(Debug, Clone)]
pub struct ChannelDelete {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct GuildChannelDelete {
    pub guild_id: GuildId,
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct DmChannelDelete {
    pub channel: Arc<Channel>,
}

#[derive(Debug, Clone)]
pub struct ThreadCreate {
    pub thread: Arc<Channel>,
    /// The client's own membership, when it joined on creation.
    pub thread_member: Option<Arc<ThreadMember>>,
}

#[derive(Debug, Clone)]
pub struct ThreadUpdate {
    pub thread: Arc<Channel>,
    pub old_thread: Option<Arc<Channel>>,
}

#[derive(Debug, Clone)]
pub struct ThreadDelete {
    pub thread_id: ChannelId,
    pub guild_id: GuildId,
    pub parent_id: Option<ChannelId>,
    pub thread: Option<Arc<Channel>>,
}

#[derive(Debug, Clone)]
pub struct ThreadMemberAdd {
    pub thread_id: ChannelId,
    pub guild_id: GuildId,
    pub thread_member: Arc<ThreadMember>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct ThreadMemberRemove {
    pub thread_id: ChannelId,
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub thread_member: Option<Arc<ThreadMember>>,
}
