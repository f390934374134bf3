use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Channel, ChannelId, EmojiId, Guild, GuildId, Member, MessageId, RoleId, User};
use crate::application::Client;

/// Message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum MessageKind {
    #[default]
    Default = 0,
    RecipientAdd = 1,
    RecipientRemove = 2,
    Call = 3,
    ChannelNameChange = 4,
    ChannelIconChange = 5,
    ChannelPinnedMessage = 6,
    UserJoin = 7,
    GuildBoost = 8,
    ThreadCreated = 18,
    Reply = 19,
    ChatInputCommand = 20,
    ThreadStarterMessage = 21,
    ContextMenuCommand = 23,
    AutoModerationAction = 24,
    /// Any type this crate does not distinguish.
    Other = u8::MAX,
}

impl From<u8> for MessageKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Default,
            1 => Self::RecipientAdd,
            2 => Self::RecipientRemove,
            3 => Self::Call,
            4 => Self::ChannelNameChange,
            5 => Self::ChannelIconChange,
            6 => Self::ChannelPinnedMessage,
            7 => Self::UserJoin,
            8 => Self::GuildBoost,
            18 => Self::ThreadCreated,
            19 => Self::Reply,
            20 => Self::ChatInputCommand,
            21 => Self::ThreadStarterMessage,
            23 => Self::ContextMenuCommand,
            24 => Self::AutoModerationAction,
            _ => Self::Other,
        }
    }
}

impl MessageKind {
    /// Returns true if this is a regular user message.
    #[must_use]
    pub const fn is_regular(self) -> bool {
        matches!(self, Self::Default | Self::Reply)
    }

    #[must_use]
    pub const fn is_system(self) -> bool {
        !self.is_regular()
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, serde::Deserialize)]
    pub struct MessageFlags: u64 {
        const CROSSPOSTED = 1 << 0;
        const IS_CROSSPOST = 1 << 1;
        const SUPPRESS_EMBEDS = 1 << 2;
        const SOURCE_MESSAGE_DELETED = 1 << 3;
        const URGENT = 1 << 4;
        const HAS_THREAD = 1 << 5;
        const EPHEMERAL = 1 << 6;
        const LOADING = 1 << 7;
        const SUPPRESS_NOTIFICATIONS = 1 << 12;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: u64,
    pub filename: String,
    pub size: u64,
    pub url: String,
    pub content_type: Option<String>,
}

impl Attachment {
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_ref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Rich embed, reduced to the fields commonly rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub color: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReactionEmoji {
    pub id: Option<EmojiId>,
    pub name: Option<String>,
    pub animated: bool,
}

impl ReactionEmoji {
    /// Unicode emoji have no id.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub emoji: ReactionEmoji,
    pub count: u32,
    pub me: bool,
}

/// Reference to another message (for replies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageReference {
    pub message_id: Option<MessageId>,
    pub channel_id: Option<ChannelId>,
    pub guild_id: Option<GuildId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) channel_id: ChannelId,
    pub(crate) guild_id: Option<GuildId>,
    pub(crate) author: User,
    pub(crate) member: Option<Member>,
    pub(crate) content: String,
    pub(crate) kind: MessageKind,
    pub(crate) timestamp: Option<DateTime<Utc>>,
    pub(crate) edited_timestamp: Option<DateTime<Utc>>,
    pub(crate) tts: bool,
    pub(crate) mention_everyone: bool,
    pub(crate) mentions: Vec<User>,
    pub(crate) mention_role_ids: Vec<RoleId>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) embeds: Vec<Embed>,
    pub(crate) reactions: Vec<Reaction>,
    pub(crate) pinned: bool,
    pub(crate) webhook_id: Option<u64>,
    pub(crate) flags: MessageFlags,
    pub(crate) message_reference: Option<MessageReference>,
}

impl Message {
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    /// Author of the message. When the message came with member data this is
    /// the member's user.
    #[must_use]
    pub const fn author(&self) -> &User {
        &self.author
    }

    #[must_use]
    pub const fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    #[must_use]
    pub const fn edited_timestamp(&self) -> Option<DateTime<Utc>> {
        self.edited_timestamp
    }

    #[must_use]
    pub const fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    #[must_use]
    pub const fn is_tts(&self) -> bool {
        self.tts
    }

    #[must_use]
    pub const fn mentions_everyone(&self) -> bool {
        self.mention_everyone
    }

    #[must_use]
    pub fn mentions(&self) -> &[User] {
        &self.mentions
    }

    #[must_use]
    pub fn mention_role_ids(&self) -> &[RoleId] {
        &self.mention_role_ids
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    #[must_use]
    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.pinned
    }

    #[must_use]
    pub const fn webhook_id(&self) -> Option<u64> {
        self.webhook_id
    }

    #[must_use]
    pub const fn flags(&self) -> MessageFlags {
        self.flags
    }

    #[must_use]
    pub const fn message_reference(&self) -> Option<&MessageReference> {
        self.message_reference.as_ref()
    }

    #[must_use]
    pub const fn is_dm(&self) -> bool {
        self.guild_id.is_none()
    }

    #[must_use]
    pub fn channel(&self, client: &Client) -> Option<Arc<Channel>> {
        client.caches().channels().get(&self.channel_id)
    }

    #[must_use]
    pub fn guild(&self, client: &Client) -> Option<Arc<Guild>> {
        self.guild_id
            .and_then(|id| client.caches().guilds().get(&id))
    }

    /// The replied-to message, if it is still cached.
    #[must_use]
    pub fn referenced_message(&self, client: &Client) -> Option<Arc<Message>> {
        let reference = self.message_reference?;
        let message_id = reference.message_id?;
        let channel_id = reference.channel_id.unwrap_or(self.channel_id);
        client.caches().messages().get(channel_id, message_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::entities::user::fixtures::user;

    pub fn message(id: u64, channel_id: u64, guild_id: Option<u64>, content: &str) -> Message {
        Message {
            id: MessageId(id),
            channel_id: ChannelId(channel_id),
            guild_id: guild_id.map(GuildId),
            author: user(500, "author"),
            member: None,
            content: content.to_string(),
            kind: MessageKind::Default,
            timestamp: None,
            edited_timestamp: None,
            tts: false,
            mention_everyone: false,
            mentions: Vec::new(),
            mention_role_ids: Vec::new(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            reactions: Vec::new(),
            pinned: false,
            webhook_id: None,
            flags: MessageFlags::empty(),
            message_reference: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, MessageKind::Default, true ; "default")]
    #[test_case(19, MessageKind::Reply, true ; "reply")]
    #[test_case(7, MessageKind::UserJoin, false ; "join")]
    #[test_case(250, MessageKind::Other, false ; "unknown")]
    fn test_kind(raw: u8, expected: MessageKind, regular: bool) {
        let kind = MessageKind::from(raw);
        assert_eq!(kind, expected);
        assert_eq!(kind.is_regular(), regular);
    }

    #[test]
    fn test_dm_detection() {
        assert!(fixtures::message(1, 2, None, "hi").is_dm());
        assert!(!fixtures::message(1, 2, Some(3), "hi").is_dm());
    }
}
