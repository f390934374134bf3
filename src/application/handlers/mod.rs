//! Registry of gateway event handlers.
//!
//! Each wire tag maps to exactly one payload shape and one handler. A
//! handler updates the cache through the entity builder and returns the
//! events to dispatch, in order.

mod channel;
mod guild;
mod interaction;
mod member;
mod message;
mod session;
mod voice;

use serde::de::DeserializeOwned;

use crate::application::Client;
use crate::application::events::EventKind;
use crate::infrastructure::discord::gateway::GatewayEventType;

type Handler<P> = fn(&Client, u64, P) -> Vec<EventKind>;

fn run<P: DeserializeOwned>(
    client: &Client,
    sequence: u64,
    payload: &[u8],
    handler: Handler<P>,
) -> Result<Vec<EventKind>, serde_json::Error> {
    let decoded = serde_json::from_slice(payload)?;
    Ok(handler(client, sequence, decoded))
}

/// Decodes `payload` as the shape registered for `event_type` and runs its
/// handler.
///
/// # Errors
///
/// Returns the serde error when the payload does not match the shape.
pub(crate) fn handle(
    client: &Client,
    event_type: GatewayEventType,
    sequence: u64,
    payload: &[u8],
) -> Result<Vec<EventKind>, serde_json::Error> {
    use GatewayEventType as T;

    match event_type {
        T::Ready => run(client, sequence, payload, session::ready),
        T::Resumed => run(client, sequence, payload, session::resumed),
        T::UserUpdate => run(client, sequence, payload, session::user_update),
        T::GuildCreate => run(client, sequence, payload, guild::guild_create),
        T::GuildUpdate => run(client, sequence, payload, guild::guild_update),
        T::GuildDelete => run(client, sequence, payload, guild::guild_delete),
        T::GuildRoleCreate => run(client, sequence, payload, guild::role_create),
        T::GuildRoleUpdate => run(client, sequence, payload, guild::role_update),
        T::GuildRoleDelete => run(client, sequence, payload, guild::role_delete),
        T::GuildEmojisUpdate => run(client, sequence, payload, guild::emojis_update),
        T::GuildMemberAdd => run(client, sequence, payload, member::member_add),
        T::GuildMemberUpdate => run(client, sequence, payload, member::member_update),
        T::GuildMemberRemove => run(client, sequence, payload, member::member_remove),
        T::GuildMembersChunk => run(client, sequence, payload, member::members_chunk),
        T::ChannelCreate => run(client, sequence, payload, channel::channel_create),
        T::ChannelUpdate => run(client, sequence, payload, channel::channel_update),
        T::ChannelDelete => run(client, sequence, payload, channel::channel_delete),
        T::ThreadCreate => run(client, sequence, payload, channel::thread_create),
        T::ThreadUpdate => run(client, sequence, payload, channel::thread_update),
        T::ThreadDelete => run(client, sequence, payload, channel::thread_delete),
        T::ThreadMembersUpdate => run(client, sequence, payload, channel::thread_members_update),
        T::MessageCreate => run(client, sequence, payload, message::message_create),
        T::MessageUpdate => run(client, sequence, payload, message::message_update),
        T::MessageDelete => run(client, sequence, payload, message::message_delete),
        T::MessageDeleteBulk => run(client, sequence, payload, message::message_delete_bulk),
        T::MessageReactionAdd => run(client, sequence, payload, message::reaction_add),
        T::MessageReactionRemove => run(client, sequence, payload, message::reaction_remove),
        T::MessageReactionRemoveAll => {
            run(client, sequence, payload, message::reaction_remove_all)
        }
        T::TypingStart => run(client, sequence, payload, message::typing_start),
        T::VoiceStateUpdate => run(client, sequence, payload, voice::voice_state_update),
        T::VoiceServerUpdate => run(client, sequence, payload, voice::voice_server_update),
        T::InteractionCreate => run(client, sequence, payload, interaction::interaction_create),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    use crate::domain::entities::{ChannelId, GuildId};
    use crate::infrastructure::cache::CacheFlags;
    use crate::infrastructure::config::ClientConfig;

    fn names(events: &[EventKind]) -> Vec<&'static str> {
        events.iter().map(EventKind::name).collect()
    }

    #[test]
    fn test_every_tag_has_a_handler_that_rejects_garbage() {
        let client = Client::builder().build();
        for tag in GatewayEventType::ALL {
            if *tag == GatewayEventType::Resumed {
                continue;
            }
            assert!(
                handle(&client, *tag, 1, br#""garbage""#).is_err(),
                "{tag} accepted a string payload"
            );
        }
    }

    #[test]
    fn test_resumed_accepts_any_payload() {
        let client = Client::builder().build();
        let events = handle(&client, GatewayEventType::Resumed, 3, b"null").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "Resumed");
    }

    #[test_case(
        br#"{"id":"20","type":0,"guild_id":"10","name":"general"}"#,
        &["ChannelCreate", "GuildChannelCreate"] ;
        "guild text channel"
    )]
    #[test_case(
        br#"{"id":"21","type":1}"#,
        &["ChannelCreate", "DmChannelCreate"] ;
        "dm channel"
    )]
    fn test_channel_create_fans_out_by_scope(payload: &[u8], expected: &[&str]) {
        let client = Client::builder().build();
        let events = handle(&client, GatewayEventType::ChannelCreate, 1, payload).unwrap();
        assert_eq!(names(&events), expected);
    }

    #[test]
    fn test_channel_update_and_delete_fan_out() {
        let client = Client::builder().build();
        let guild_channel = br#"{"id":"20","type":0,"guild_id":"10","name":"general"}"#;
        let renamed = br#"{"id":"20","type":0,"guild_id":"10","name":"lobby"}"#;
        let dm = br#"{"id":"21","type":1}"#;

        handle(&client, GatewayEventType::ChannelCreate, 1, guild_channel).unwrap();
        let events = handle(&client, GatewayEventType::ChannelUpdate, 2, renamed).unwrap();
        assert_eq!(names(&events), ["ChannelUpdate", "GuildChannelUpdate"]);
        let EventKind::GuildChannelUpdate(update) = &events[1] else {
            panic!("expected a guild channel update");
        };
        assert_eq!(update.guild_id, GuildId(10));
        assert_eq!(
            update.old_channel.as_ref().and_then(|c| c.name()),
            Some("general")
        );

        let events = handle(&client, GatewayEventType::ChannelDelete, 3, renamed).unwrap();
        assert_eq!(names(&events), ["ChannelDelete", "GuildChannelDelete"]);
        assert!(client.caches().channels().get(&ChannelId(20)).is_none());

        let events = handle(&client, GatewayEventType::ChannelUpdate, 4, dm).unwrap();
        assert_eq!(names(&events), ["ChannelUpdate", "DmChannelUpdate"]);
        let events = handle(&client, GatewayEventType::ChannelDelete, 5, dm).unwrap();
        assert_eq!(names(&events), ["ChannelDelete", "DmChannelDelete"]);
    }

    #[test]
    fn test_emoji_diff_needs_the_emoji_cache() {
        let update = br#"{"guild_id":"10","emojis":[{"id":"7","name":"wave"}]}"#;

        let cached = Client::builder().build();
        let events = handle(&cached, GatewayEventType::GuildEmojisUpdate, 1, update).unwrap();
        assert_eq!(names(&events), ["EmojisUpdate", "EmojiCreate"]);
        let events = handle(&cached, GatewayEventType::GuildEmojisUpdate, 2, update).unwrap();
        assert_eq!(names(&events), ["EmojisUpdate"]);

        let uncached = Client::builder()
            .with_config(
                ClientConfig::default()
                    .with_cache_flags(CacheFlags::default().difference(CacheFlags::EMOJIS)),
            )
            .build();
        for sequence in 1..=2 {
            let events =
                handle(&uncached, GatewayEventType::GuildEmojisUpdate, sequence, update).unwrap();
            assert_eq!(names(&events), ["EmojisUpdate"]);
        }
    }
}
