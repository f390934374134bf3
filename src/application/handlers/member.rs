use crate::application::Client;
use crate::application::events::{
    EventKind, GuildMemberJoin, GuildMemberLeave, GuildMemberUpdate, GuildMembersChunk,
};
use crate::application::services::entity_builder::CacheStrategy;
use crate::domain::entities::GuildId;
use crate::infrastructure::discord::gateway::payloads::{
    GuildMemberEventPayload, GuildMemberRemovePayload, GuildMembersChunkPayload,
};

fn adjust_member_count(client: &Client, guild_id: GuildId, joined: bool) {
    client.caches().guilds().update(&guild_id, |guild| {
        guild.member_count = guild.member_count.map(|count| {
            if joined {
                count + 1
            } else {
                count.saturating_sub(1)
            }
        });
    });
}

pub(super) fn member_add(
    client: &Client,
    _sequence: u64,
    payload: GuildMemberEventPayload,
) -> Vec<EventKind> {
    let member = client.entity_builder().create_member(
        payload.guild_id,
        &payload.member,
        None,
        CacheStrategy::Yes,
    );
    adjust_member_count(client, payload.guild_id, true);
    vec![GuildMemberJoin { member }.into()]
}

pub(super) fn member_update(
    client: &Client,
    _sequence: u64,
    payload: GuildMemberEventPayload,
) -> Vec<EventKind> {
    let old_member = payload.member.user.as_ref().and_then(|user| {
        client
            .caches()
            .members()
            .get(payload.guild_id, user.id)
    });
    let member = client.entity_builder().create_member(
        payload.guild_id,
        &payload.member,
        None,
        CacheStrategy::Yes,
    );
    vec![GuildMemberUpdate { member, old_member }.into()]
}

pub(super) fn member_remove(
    client: &Client,
    _sequence: u64,
    payload: GuildMemberRemovePayload,
) -> Vec<EventKind> {
    let member = client
        .caches()
        .members()
        .remove(payload.guild_id, payload.user.id);
    adjust_member_count(client, payload.guild_id, false);
    let user = client
        .entity_builder()
        .create_user(&payload.user, CacheStrategy::No);
    vec![
        GuildMemberLeave {
            guild_id: payload.guild_id,
            user,
            member,
        }
        .into(),
    ]
}

pub(super) fn members_chunk(
    client: &Client,
    _sequence: u64,
    payload: GuildMembersChunkPayload,
) -> Vec<EventKind> {
    let builder = client.entity_builder();
    let members: Vec<_> = payload
        .members
        .iter()
        .filter(|member| member.user.is_some())
        .map(|member| builder.create_member(payload.guild_id, member, None, CacheStrategy::Yes))
        .collect();

    client.chunking().handle_chunk(&payload, &members);

    vec![
        GuildMembersChunk {
            guild_id: payload.guild_id,
            chunk_index: payload.chunk_index,
            chunk_count: payload.chunk_count,
            members,
            not_found: payload.not_found,
            nonce: payload.nonce,
        }
        .into(),
    ]
}
