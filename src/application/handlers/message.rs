use std::sync::Arc;

use chrono::DateTime;

use crate::application::Client;
use crate::application::events::{
    DmMessageCreate, DmMessageDelete, DmMessageUpdate, EventKind, GuildMessageCreate,
    GuildMessageDelete, GuildMessageUpdate, MessageCreate, MessageDelete, MessageReactionAdd,
    MessageReactionRemove, MessageReactionRemoveAll, MessageUpdate, UserTypingStart,
};
use crate::application::services::entity_builder::{CacheStrategy, build_reaction_emoji};
use crate::domain::entities::{
    ChannelId, GuildId, Member, Message, MessageId, Reaction, ReactionEmoji,
};
use crate::infrastructure::discord::dto::{MemberPayload, MessagePayload};
use crate::infrastructure::discord::gateway::payloads::{
    MessageDeleteBulkPayload, MessageDeletePayload, MessageReactionPayload,
    MessageReactionRemoveAllPayload, TypingStartPayload,
};

fn member_with_user(
    client: &Client,
    guild_id: Option<GuildId>,
    member: Option<&MemberPayload>,
) -> Option<Arc<Member>> {
    let guild_id = guild_id?;
    let member = member.filter(|member| member.user.is_some())?;
    Some(
        client
            .entity_builder()
            .create_member(guild_id, member, None, CacheStrategy::Yes),
    )
}

pub(super) fn message_create(client: &Client, _sequence: u64, payload: MessagePayload) -> Vec<EventKind> {
    let message = client
        .entity_builder()
        .create_message(&payload, CacheStrategy::Yes);

    let scoped = match message.guild_id() {
        Some(guild_id) => GuildMessageCreate {
            guild_id,
            message: message.clone(),
        }
        .into(),
        None => DmMessageCreate {
            message: message.clone(),
        }
        .into(),
    };
    vec![MessageCreate { message }.into(), scoped]
}

pub(super) fn message_update(client: &Client, _sequence: u64, payload: MessagePayload) -> Vec<EventKind> {
    let old_message = client
        .caches()
        .messages()
        .get(payload.channel_id, payload.id);
    let message = client
        .entity_builder()
        .create_message(&payload, CacheStrategy::Yes);

    let scoped = match message.guild_id() {
        Some(guild_id) => GuildMessageUpdate {
            guild_id,
            message: message.clone(),
            old_message: old_message.clone(),
        }
        .into(),
        None => DmMessageUpdate {
            message: message.clone(),
            old_message: old_message.clone(),
        }
        .into(),
    };
    vec![
        MessageUpdate {
            message,
            old_message,
        }
        .into(),
        scoped,
    ]
}

fn deleted(
    client: &Client,
    channel_id: ChannelId,
    message_id: MessageId,
    guild_id: Option<GuildId>,
) -> [EventKind; 2] {
    let message = client.caches().messages().remove(channel_id, message_id);
    let scoped = match guild_id {
        Some(guild_id) => GuildMessageDelete {
            guild_id,
            message_id,
            channel_id,
            message: message.clone(),
        }
        .into(),
        None => DmMessageDelete {
            message_id,
            channel_id,
            message: message.clone(),
        }
        .into(),
    };
    [
        MessageDelete {
            message_id,
            channel_id,
            guild_id,
            message,
        }
        .into(),
        scoped,
    ]
}

pub(super) fn message_delete(
    client: &Client,
    _sequence: u64,
    payload: MessageDeletePayload,
) -> Vec<EventKind> {
    deleted(client, payload.channel_id, payload.id, payload.guild_id).into()
}

pub(super) fn message_delete_bulk(
    client: &Client,
    _sequence: u64,
    payload: MessageDeleteBulkPayload,
) -> Vec<EventKind> {
    payload
        .ids
        .iter()
        .flat_map(|id| deleted(client, payload.channel_id, *id, payload.guild_id))
        .collect()
}

fn update_reactions(
    client: &Client,
    channel_id: ChannelId,
    message_id: MessageId,
    f: impl FnOnce(&mut Vec<Reaction>),
) {
    client
        .caches()
        .messages()
        .update(channel_id, message_id, |message: &mut Message| {
            f(&mut message.reactions);
        });
}

fn add_reaction(reactions: &mut Vec<Reaction>, emoji: &ReactionEmoji, me: bool) {
    if let Some(reaction) = reactions.iter_mut().find(|reaction| reaction.emoji == *emoji) {
        reaction.count += 1;
        reaction.me |= me;
    } else {
        reactions.push(Reaction {
            emoji: emoji.clone(),
            count: 1,
            me,
        });
    }
}

fn remove_reaction(reactions: &mut Vec<Reaction>, emoji: &ReactionEmoji, me: bool) {
    if let Some(reaction) = reactions.iter_mut().find(|reaction| reaction.emoji == *emoji) {
        reaction.count = reaction.count.saturating_sub(1);
        if me {
            reaction.me = false;
        }
    }
    reactions.retain(|reaction| reaction.count > 0);
}

pub(super) fn reaction_add(
    client: &Client,
    _sequence: u64,
    payload: MessageReactionPayload,
) -> Vec<EventKind> {
    let emoji = build_reaction_emoji(&payload.emoji);
    let me = client.self_user_id() == Some(payload.user_id);
    update_reactions(client, payload.channel_id, payload.message_id, |reactions| {
        add_reaction(reactions, &emoji, me);
    });
    let member = member_with_user(client, payload.guild_id, payload.member.as_ref());

    vec![
        MessageReactionAdd {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            member,
            emoji,
        }
        .into(),
    ]
}

pub(super) fn reaction_remove(
    client: &Client,
    _sequence: u64,
    payload: MessageReactionPayload,
) -> Vec<EventKind> {
    let emoji = build_reaction_emoji(&payload.emoji);
    let me = client.self_user_id() == Some(payload.user_id);
    update_reactions(client, payload.channel_id, payload.message_id, |reactions| {
        remove_reaction(reactions, &emoji, me);
    });

    vec![
        MessageReactionRemove {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            emoji,
        }
        .into(),
    ]
}

pub(super) fn reaction_remove_all(
    client: &Client,
    _sequence: u64,
    payload: MessageReactionRemoveAllPayload,
) -> Vec<EventKind> {
    update_reactions(client, payload.channel_id, payload.message_id, Vec::clear);
    vec![
        MessageReactionRemoveAll {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
        }
        .into(),
    ]
}

pub(super) fn typing_start(
    client: &Client,
    _sequence: u64,
    payload: TypingStartPayload,
) -> Vec<EventKind> {
    let member = member_with_user(client, payload.guild_id, payload.member.as_ref());
    vec![
        UserTypingStart {
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            user_id: payload.user_id,
            timestamp: DateTime::from_timestamp(payload.timestamp, 0).unwrap_or_default(),
            member,
        }
        .into(),
    ]
}
