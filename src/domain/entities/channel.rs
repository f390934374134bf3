//! Channel entities.
//!
//! [`Channel`] is a closed set of variants. Code that only cares about a
//! capability (messages, guild placement, voice) goes through the query
//! methods instead of matching every variant.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ChannelId, Guild, GuildId, Message, MessageId, ThreadMember, UserId, VoiceState};
use crate::application::Client;

/// Wire channel type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ChannelKind {
    GuildText = 0,
    Dm = 1,
    GuildVoice = 2,
    GuildCategory = 4,
    GuildNews = 5,
    NewsThread = 10,
    PublicThread = 11,
    PrivateThread = 12,
    GuildStageVoice = 13,
    GuildForum = 15,
}

impl ChannelKind {
    #[must_use]
    pub const fn is_thread(self) -> bool {
        matches!(
            self,
            Self::NewsThread | Self::PublicThread | Self::PrivateThread
        )
    }

    #[must_use]
    pub const fn is_voice(self) -> bool {
        matches!(self, Self::GuildVoice | Self::GuildStageVoice)
    }
}

/// Returned for channel types this crate does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel type {0}")]
pub struct UnknownChannelKind(pub u8);

impl TryFrom<u8> for ChannelKind {
    type Error = UnknownChannelKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            4 => Self::GuildCategory,
            5 => Self::GuildNews,
            10 => Self::NewsThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            15 => Self::GuildForum,
            other => return Err(UnknownChannelKind(other)),
        })
    }
}

/// Attributes every guild channel carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildChannelFields {
    pub(crate) id: ChannelId,
    pub(crate) guild_id: GuildId,
    pub(crate) name: String,
    pub(crate) position: i32,
    pub(crate) parent_id: Option<ChannelId>,
    pub(crate) nsfw: bool,
}

/// Channels placed inside a guild.
pub trait GuildChannel {
    fn fields(&self) -> &GuildChannelFields;

    fn id(&self) -> ChannelId {
        self.fields().id
    }

    fn guild_id(&self) -> GuildId {
        self.fields().guild_id
    }

    fn name(&self) -> &str {
        &self.fields().name
    }

    fn position(&self) -> i32 {
        self.fields().position
    }

    /// Category for regular channels, the parent channel for threads.
    fn parent_id(&self) -> Option<ChannelId> {
        self.fields().parent_id
    }

    fn is_nsfw(&self) -> bool {
        self.fields().nsfw
    }

    fn guild(&self, client: &Client) -> Option<Arc<Guild>> {
        client.caches().guilds().get(&self.guild_id())
    }

    fn parent(&self, client: &Client) -> Option<Arc<Channel>> {
        self.parent_id()
            .and_then(|id| client.caches().channels().get(&id))
    }
}

/// Channels that hold messages.
pub trait MessageChannel {
    fn id(&self) -> ChannelId;

    fn last_message_id(&self) -> Option<MessageId>;

    /// Cached messages of this channel, oldest first.
    fn messages(&self, client: &Client) -> Vec<Arc<Message>> {
        let mut messages = client.caches().messages().group_all(self.id());
        messages.sort_by_key(|message| message.id());
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildTextChannel {
    pub(crate) fields: GuildChannelFields,
    pub(crate) topic: Option<String>,
    pub(crate) last_message_id: Option<MessageId>,
    pub(crate) rate_limit_per_user: u32,
}

impl GuildTextChannel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.fields.id
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Slowmode in seconds.
    #[must_use]
    pub const fn rate_limit_per_user(&self) -> u32 {
        self.rate_limit_per_user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DmChannel {
    pub(crate) id: ChannelId,
    pub(crate) recipient_id: Option<UserId>,
    pub(crate) last_message_id: Option<MessageId>,
}

impl DmChannel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    #[must_use]
    pub const fn recipient_id(&self) -> Option<UserId> {
        self.recipient_id
    }
}

/// Voice and stage channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildVoiceChannel {
    pub(crate) fields: GuildChannelFields,
    pub(crate) bitrate: u32,
    pub(crate) user_limit: u32,
    pub(crate) rtc_region: Option<String>,
    pub(crate) topic: Option<String>,
    pub(crate) last_message_id: Option<MessageId>,
    pub(crate) connected_member_ids: HashSet<UserId>,
}

impl GuildVoiceChannel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.fields.id
    }

    #[must_use]
    pub const fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// Zero means unlimited.
    #[must_use]
    pub const fn user_limit(&self) -> u32 {
        self.user_limit
    }

    #[must_use]
    pub fn rtc_region(&self) -> Option<&str> {
        self.rtc_region.as_deref()
    }

    /// Stage topic. Always `None` for plain voice channels.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub const fn connected_member_ids(&self) -> &HashSet<UserId> {
        &self.connected_member_ids
    }

    pub(crate) fn connect(&mut self, user_id: UserId) {
        self.connected_member_ids.insert(user_id);
    }

    pub(crate) fn disconnect(&mut self, user_id: UserId) {
        self.connected_member_ids.remove(&user_id);
    }

    #[must_use]
    pub fn voice_states(&self, client: &Client) -> Vec<Arc<VoiceState>> {
        let voice_states = client.caches().voice_states();
        self.connected_member_ids
            .iter()
            .filter_map(|user_id| voice_states.get(self.fields.guild_id, *user_id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildCategoryChannel {
    pub(crate) fields: GuildChannelFields,
}

impl GuildCategoryChannel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.fields.id
    }

    /// Cached channels sorted under this category.
    #[must_use]
    pub fn children(&self, client: &Client) -> Vec<Arc<Channel>> {
        let id = self.fields.id;
        let mut children = client.caches().channels().find_all(|channel| {
            !channel.kind().is_thread()
                && channel
                    .as_guild_channel()
                    .is_some_and(|c| c.parent_id() == Some(id))
        });
        children.sort_by_key(|channel| {
            channel.as_guild_channel().map_or(0, GuildChannel::position)
        });
        children
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadMetadata {
    pub archived: bool,
    /// Minutes of inactivity before auto-archive.
    pub auto_archive_duration: u32,
    pub archive_timestamp: Option<DateTime<Utc>>,
    pub locked: bool,
    pub invitable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildThread {
    pub(crate) fields: GuildChannelFields,
    pub(crate) kind: ChannelKind,
    pub(crate) owner_id: Option<UserId>,
    pub(crate) last_message_id: Option<MessageId>,
    pub(crate) message_count: u32,
    pub(crate) member_count: u32,
    pub(crate) rate_limit_per_user: u32,
    pub(crate) metadata: ThreadMetadata,
}

impl GuildThread {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.fields.id
    }

    /// One of the three thread kinds.
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    #[must_use]
    pub const fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }

    #[must_use]
    pub const fn message_count(&self) -> u32 {
        self.message_count
    }

    /// Approximate, capped at 50 by the platform.
    #[must_use]
    pub const fn member_count(&self) -> u32 {
        self.member_count
    }

    #[must_use]
    pub const fn metadata(&self) -> &ThreadMetadata {
        &self.metadata
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self.kind, ChannelKind::PrivateThread)
    }

    #[must_use]
    pub fn thread_members(&self, client: &Client) -> Vec<Arc<ThreadMember>> {
        client.caches().thread_members().group_all(self.fields.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumTag {
    pub id: u64,
    pub name: String,
    pub moderated: bool,
    pub emoji_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildForumChannel {
    pub(crate) fields: GuildChannelFields,
    pub(crate) topic: Option<String>,
    pub(crate) available_tags: Vec<ForumTag>,
    pub(crate) last_message_id: Option<MessageId>,
}

impl GuildForumChannel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.fields.id
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn available_tags(&self) -> &[ForumTag] {
        &self.available_tags
    }

    /// Cached posts (threads) of this forum.
    #[must_use]
    pub fn posts(&self, client: &Client) -> Vec<Arc<Channel>> {
        let id = self.fields.id;
        client
            .caches()
            .channels()
            .find_all(|channel| channel.as_thread().is_some_and(|t| t.parent_id() == Some(id)))
    }
}

macro_rules! impl_guild_channel {
    ($($ty:ty),*) => {
        $(impl GuildChannel for $ty {
            fn fields(&self) -> &GuildChannelFields {
                &self.fields
            }
        })*
    };
}

impl_guild_channel!(
    GuildTextChannel,
    GuildVoiceChannel,
    GuildCategoryChannel,
    GuildThread,
    GuildForumChannel
);

macro_rules! impl_message_channel {
    ($($ty:ty),*) => {
        $(impl MessageChannel for $ty {
            fn id(&self) -> ChannelId {
                Self::id(self)
            }

            fn last_message_id(&self) -> Option<MessageId> {
                self.last_message_id
            }
        })*
    };
}

impl_message_channel!(GuildTextChannel, DmChannel, GuildVoiceChannel, GuildThread);

/// A channel of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", content = "channel")]
pub enum Channel {
    GuildText(GuildTextChannel),
    GuildNews(GuildTextChannel),
    Dm(DmChannel),
    GuildVoice(GuildVoiceChannel),
    GuildStageVoice(GuildVoiceChannel),
    GuildCategory(GuildCategoryChannel),
    GuildThread(GuildThread),
    GuildForum(GuildForumChannel),
}

impl Channel {
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        match self {
            Self::GuildText(c) | Self::GuildNews(c) => c.id(),
            Self::Dm(c) => c.id(),
            Self::GuildVoice(c) | Self::GuildStageVoice(c) => c.id(),
            Self::GuildCategory(c) => c.id(),
            Self::GuildThread(c) => c.id(),
            Self::GuildForum(c) => c.id(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        match self {
            Self::GuildText(_) => ChannelKind::GuildText,
            Self::GuildNews(_) => ChannelKind::GuildNews,
            Self::Dm(_) => ChannelKind::Dm,
            Self::GuildVoice(_) => ChannelKind::GuildVoice,
            Self::GuildStageVoice(_) => ChannelKind::GuildStageVoice,
            Self::GuildCategory(_) => ChannelKind::GuildCategory,
            Self::GuildThread(t) => t.kind,
            Self::GuildForum(_) => ChannelKind::GuildForum,
        }
    }

    /// `None` for DMs.
    #[must_use]
    pub fn guild_id(&self) -> Option<GuildId> {
        self.as_guild_channel().map(GuildChannel::guild_id)
    }

    /// Display name. DMs have none.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.as_guild_channel().map(GuildChannel::name)
    }

    #[must_use]
    pub fn as_guild_channel(&self) -> Option<&dyn GuildChannel> {
        match self {
            Self::GuildText(c) | Self::GuildNews(c) => Some(c),
            Self::Dm(_) => None,
            Self::GuildVoice(c) | Self::GuildStageVoice(c) => Some(c),
            Self::GuildCategory(c) => Some(c),
            Self::GuildThread(c) => Some(c),
            Self::GuildForum(c) => Some(c),
        }
    }

    #[must_use]
    pub fn as_message_channel(&self) -> Option<&dyn MessageChannel> {
        match self {
            Self::GuildText(c) | Self::GuildNews(c) => Some(c),
            Self::Dm(c) => Some(c),
            Self::GuildVoice(c) | Self::GuildStageVoice(c) => Some(c),
            Self::GuildThread(c) => Some(c),
            Self::GuildCategory(_) | Self::GuildForum(_) => None,
        }
    }

    #[must_use]
    pub const fn is_message_channel(&self) -> bool {
        !matches!(self, Self::GuildCategory(_) | Self::GuildForum(_))
    }

    #[must_use]
    pub const fn as_audio_channel(&self) -> Option<&GuildVoiceChannel> {
        match self {
            Self::GuildVoice(c) | Self::GuildStageVoice(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_audio_channel_mut(&mut self) -> Option<&mut GuildVoiceChannel> {
        match self {
            Self::GuildVoice(c) | Self::GuildStageVoice(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_thread(&self) -> Option<&GuildThread> {
        match self {
            Self::GuildThread(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id())
    }
}
