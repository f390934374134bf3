//! Catalog of dispatch event tags understood by the handler registry.
//!
//! The list is append-only: tags are never renamed or removed so recorded
//! traffic keeps decoding the same way.

use std::fmt;

macro_rules! gateway_event_types {
    ($($variant:ident => $tag:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum GatewayEventType {
            $($variant),*
        }

        impl GatewayEventType {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Looks up a wire tag. Unknown tags yield `None`.
            #[must_use]
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)*
                    _ => None,
                }
            }

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),*
                }
            }
        }
    };
}

gateway_event_types! {
    Ready => "READY",
    Resumed => "RESUMED",
    GuildCreate => "GUILD_CREATE",
    GuildUpdate => "GUILD_UPDATE",
    GuildDelete => "GUILD_DELETE",
    GuildMemberAdd => "GUILD_MEMBER_ADD",
    GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
    GuildMemberRemove => "GUILD_MEMBER_REMOVE",
    GuildMembersChunk => "GUILD_MEMBERS_CHUNK",
    GuildRoleCreate => "GUILD_ROLE_CREATE",
    GuildRoleUpdate => "GUILD_ROLE_UPDATE",
    GuildRoleDelete => "GUILD_ROLE_DELETE",
    GuildEmojisUpdate => "GUILD_EMOJIS_UPDATE",
    ChannelCreate => "CHANNEL_CREATE",
    ChannelUpdate => "CHANNEL_UPDATE",
    ChannelDelete => "CHANNEL_DELETE",
    ThreadCreate => "THREAD_CREATE",
    ThreadUpdate => "THREAD_UPDATE",
    ThreadDelete => "THREAD_DELETE",
    ThreadMembersUpdate => "THREAD_MEMBERS_UPDATE",
    MessageCreate => "MESSAGE_CREATE",
    MessageUpdate => "MESSAGE_UPDATE",
    MessageDelete => "MESSAGE_DELETE",
    MessageDeleteBulk => "MESSAGE_DELETE_BULK",
    MessageReactionAdd => "MESSAGE_REACTION_ADD",
    MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
    MessageReactionRemoveAll => "MESSAGE_REACTION_REMOVE_ALL",
    TypingStart => "TYPING_START",
    UserUpdate => "USER_UPDATE",
    VoiceStateUpdate => "VOICE_STATE_UPDATE",
    VoiceServerUpdate => "VOICE_SERVER_UPDATE",
    InteractionCreate => "INTERACTION_CREATE",
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_every_tag_roundtrips() {
        for event_type in GatewayEventType::ALL {
            assert_eq!(GatewayEventType::from_tag(event_type.as_str()), Some(*event_type));
        }
    }

    #[test_case("PRESENCE_UPDATE" ; "unsupported tag")]
    #[test_case("message_create" ; "wrong case")]
    #[test_case("" ; "empty")]
    fn test_unknown_tags(tag: &str) {
        assert_eq!(GatewayEventType::from_tag(tag), None);
    }
}
