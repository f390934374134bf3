use std::sync::Arc;

use crate::domain::entities::{Emoji, Guild, GuildId, Member, Role, RoleId, User, UserId};

/// The client was added to a guild.
#[derive(Debug, Clone)]
pub struct GuildJoin {
    pub guild: Arc<Guild>,
}

/// A guild announced by READY arrived.
#[derive(Debug, Clone)]
pub struct GuildReady {
    pub guild: Arc<Guild>,
}

/// A guild came back from an outage.
#[derive(Debug, Clone)]
pub struct GuildAvailable {
    pub guild: Arc<Guild>,
}

/// Every guild announced by READY has arrived.
#[derive(Debug, Clone)]
pub struct GuildsReady {
    pub guild_count: usize,
}

#[derive(Debug, Clone)]
pub struct GuildUpdate {
    pub guild: Arc<Guild>,
    pub old_guild: Option<Arc<Guild>>,
}

/// The client was removed from a guild.
#[derive(Debug, Clone)]
pub struct GuildLeave {
    pub guild_id: GuildId,
    pub guild: Option<Arc<Guild>>,
}

#[derive(Debug, Clone)]
pub struct GuildUnavailable {
    pub guild_id: GuildId,
}

#[derive(Debug, Clone)]
pub struct GuildMemberJoin {
    pub member: Arc<Member>,
}

#[derive(Debug, Clone)]
pub struct GuildMemberUpdate {
    pub member: Arc<Member>,
    pub old_member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct GuildMemberLeave {
    pub guild_id: GuildId,
    pub user: Arc<User>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct GuildMembersChunk {
    pub guild_id: GuildId,
    pub chunk_index: u32,
    pub chunk_count: u32,
    pub members: Vec<Arc<Member>>,
    pub not_found: Vec<UserId>,
    pub nonce: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoleCreate {
    pub guild_id: GuildId,
    pub role: Arc<Role>,
}

#[derive(Debug, Clone)]
pub struct RoleUpdate {
    pub guild_id: GuildId,
    pub role: Arc<Role>,
    pub old_role: Option<Arc<Role>>,
}

#[derive(Debug, Clone)]
pub struct RoleDelete {
    pub guild_id: GuildId,
    pub role_id: RoleId,
    pub role: Option<Arc<Role>>,
}

/// Full emoji list of a guild after a change.
#[derive(Debug, Clone)]
pub struct EmojisUpdate {
    pub guild_id: GuildId,
    pub emojis: Vec<Arc<Emoji>>,
}

#[derive(Debug, Clone)]
pub struct EmojiCreate {
    pub emoji: Arc<Emoji>,
}

#[derive(Debug, Clone)]
pub struct EmojiUpdate {
    pub emoji: Arc<Emoji>,
    pub old_emoji: Arc<Emoji>,
}

#[derive(Debug, Clone)]
pub struct EmojiDelete {
    pub emoji: Arc<Emoji>,
}
