//! Interactions (slash commands, components, modals) and their responses.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use super::{
    ApplicationId, Channel, ChannelId, GuildId, InteractionId, Member, Message, MessageId, Role,
    RoleId, User, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum InteractionKind {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    ApplicationCommandAutocomplete = 4,
    ModalSubmit = 5,
}

impl TryFrom<u8> for InteractionKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::ApplicationCommandAutocomplete,
            5 => Self::ModalSubmit,
            other => return Err(other),
        })
    }
}

/// Entities referenced by command options, fully built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedData {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) members: HashMap<UserId, Member>,
    pub(crate) roles: HashMap<RoleId, Role>,
    pub(crate) channels: HashMap<ChannelId, Channel>,
    pub(crate) messages: HashMap<MessageId, Message>,
}

impl ResolvedData {
    #[must_use]
    pub const fn users(&self) -> &HashMap<UserId, User> {
        &self.users
    }

    #[must_use]
    pub const fn members(&self) -> &HashMap<UserId, Member> {
        &self.members
    }

    #[must_use]
    pub const fn roles(&self) -> &HashMap<RoleId, Role> {
        &self.roles
    }

    #[must_use]
    pub const fn channels(&self) -> &HashMap<ChannelId, Channel> {
        &self.channels
    }

    #[must_use]
    pub const fn messages(&self) -> &HashMap<MessageId, Message> {
        &self.messages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.members.is_empty()
            && self.roles.is_empty()
            && self.channels.is_empty()
            && self.messages.is_empty()
    }
}

/// Command, component or modal payload of an interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionData {
    pub(crate) name: Option<String>,
    pub(crate) custom_id: Option<String>,
    pub(crate) options: serde_json::Value,
    pub(crate) resolved: ResolvedData,
}

impl InteractionData {
    /// Command name for application commands.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Component or modal custom id.
    #[must_use]
    pub fn custom_id(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    /// Raw option tree.
    #[must_use]
    pub const fn options(&self) -> &serde_json::Value {
        &self.options
    }

    #[must_use]
    pub const fn resolved(&self) -> &ResolvedData {
        &self.resolved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub(crate) id: InteractionId,
    pub(crate) application_id: ApplicationId,
    pub(crate) kind: InteractionKind,
    pub(crate) token: String,
    pub(crate) version: u8,
    pub(crate) guild_id: Option<GuildId>,
    pub(crate) channel_id: Option<ChannelId>,
    pub(crate) member: Option<Member>,
    pub(crate) user: User,
    pub(crate) data: Option<InteractionData>,
    pub(crate) message: Option<Message>,
    pub(crate) locale: Option<String>,
    pub(crate) guild_locale: Option<String>,
}

impl Interaction {
    #[must_use]
    pub const fn id(&self) -> InteractionId {
        self.id
    }

    #[must_use]
    pub const fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        self.kind
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    #[must_use]
    pub const fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    /// Present when invoked inside a guild.
    #[must_use]
    pub const fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    /// Invoking user. Taken from the member in guilds.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn data(&self) -> Option<&InteractionData> {
        self.data.as_ref()
    }

    /// Message a component was attached to.
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    #[must_use]
    pub fn guild_locale(&self) -> Option<&str> {
        self.guild_locale.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionResponseType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    ApplicationCommandAutocompleteResult = 8,
    Modal = 9,
}

impl Serialize for InteractionResponseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Reply body for an interaction, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl InteractionResponse {
    #[must_use]
    pub const fn pong() -> Self {
        Self {
            kind: InteractionResponseType::Pong,
            data: None,
        }
    }

    #[must_use]
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(serde_json::json!({ "content": content.into() })),
        }
    }

    #[must_use]
    pub const fn deferred() -> Self {
        Self {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data: None,
        }
    }
}
