use std::collections::HashMap;

use tracing::{debug, warn};

use super::voice::set_connected;
use crate::application::Client;
use crate::application::events::{
    EmojiCreate, EmojiDelete, EmojiUpdate, EmojisUpdate, EventKind, GuildAvailable, GuildJoin,
    GuildLeave, GuildReady, GuildUnavailable, GuildUpdate, GuildsReady, RoleCreate, RoleDelete,
    RoleUpdate,
};
use crate::application::services::entity_builder::CacheStrategy;
use crate::infrastructure::cache::CacheFlags;
use crate::infrastructure::discord::dto::GuildPayload;
use crate::infrastructure::discord::gateway::payloads::{
    GuildEmojisUpdatePayload, GuildRoleDeletePayload, GuildRoleEventPayload, UnavailableGuild,
};

pub(super) fn guild_create(client: &Client, _sequence: u64, payload: GuildPayload) -> Vec<EventKind> {
    let caches = client.caches();
    let builder = client.entity_builder();
    let guild_id = payload.id;
    let was_unready = caches.is_guild_unready(guild_id);
    let was_unavailable = caches.is_guild_unavailable(guild_id);

    // the guild goes in first so member policies can see its owner
    let guild = builder.create_guild(&payload, CacheStrategy::Yes);

    for role in &payload.roles {
        builder.create_role(guild_id, role, CacheStrategy::Yes);
    }
    for channel in payload.channels.iter().chain(&payload.threads) {
        if let Err(e) = builder.create_channel(channel, Some(guild_id), CacheStrategy::Yes) {
            warn!(guild_id = %guild_id, channel_id = %channel.id, error = %e, "Skipping guild channel");
        }
    }
    for voice_state in &payload.voice_states {
        let voice_state = builder.create_voice_state(guild_id, voice_state, CacheStrategy::Yes);
        if let Some(channel_id) = voice_state.channel_id() {
            set_connected(client, channel_id, voice_state.user_id(), true);
        }
    }
    for member in payload.members.iter().filter(|member| member.user.is_some()) {
        builder.create_member(guild_id, member, None, CacheStrategy::Yes);
    }
    for emoji in &payload.emojis {
        builder.create_emoji(guild_id, emoji, CacheStrategy::Yes);
    }

    if was_unready {
        caches.set_guild_unready(guild_id, false);
        let mut events = vec![EventKind::from(GuildReady { guild })];
        if caches.unready_guild_count() == 0 {
            debug!("All guilds from READY received");
            events.push(
                GuildsReady {
                    guild_count: caches.guilds().len(),
                }
                .into(),
            );
        }
        events
    } else if was_unavailable {
        caches.set_guild_unavailable(guild_id, false);
        vec![GuildAvailable { guild }.into()]
    } else {
        vec![GuildJoin { guild }.into()]
    }
}

pub(super) fn guild_update(client: &Client, _sequence: u64, payload: GuildPayload) -> Vec<EventKind> {
    let old_guild = client.caches().guilds().get(&payload.id);
    let guild = client
        .entity_builder()
        .create_guild(&payload, CacheStrategy::Yes);

    // ownership feeds the default member policy
    if let Some(old) = &old_guild
        && old.owner_id() != guild.owner_id()
    {
        client
            .caches()
            .reevaluate_member(guild.id(), old.owner_id());
    }

    vec![GuildUpdate { guild, old_guild }.into()]
}

pub(super) fn guild_delete(
    client: &Client,
    _sequence: u64,
    payload: UnavailableGuild,
) -> Vec<EventKind> {
    let caches = client.caches();
    let guild = caches.remove_guild(payload.id);

    if payload.unavailable {
        caches.set_guild_unavailable(payload.id, true);
        vec![GuildUnavailable { guild_id: payload.id }.into()]
    } else {
        vec![
            GuildLeave {
                guild_id: payload.id,
                guild,
            }
            .into(),
        ]
    }
}

pub(super) fn role_create(
    client: &Client,
    _sequence: u64,
    payload: GuildRoleEventPayload,
) -> Vec<EventKind> {
    let role = client
        .entity_builder()
        .create_role(payload.guild_id, &payload.role, CacheStrategy::Yes);
    vec![
        RoleCreate {
            guild_id: payload.guild_id,
            role,
        }
        .into(),
    ]
}

pub(super) fn role_update(
    client: &Client,
    _sequence: u64,
    payload: GuildRoleEventPayload,
) -> Vec<EventKind> {
    let old_role = client
        .caches()
        .roles()
        .get(payload.guild_id, payload.role.id);
    let role = client
        .entity_builder()
        .create_role(payload.guild_id, &payload.role, CacheStrategy::Yes);
    vec![
        RoleUpdate {
            guild_id: payload.guild_id,
            role,
            old_role,
        }
        .into(),
    ]
}

pub(super) fn role_delete(
    client: &Client,
    _sequence: u64,
    payload: GuildRoleDeletePayload,
) -> Vec<EventKind> {
    let role = client
        .caches()
        .roles()
        .remove(payload.guild_id, payload.role_id);
    vec![
        RoleDelete {
            guild_id: payload.guild_id,
            role_id: payload.role_id,
            role,
        }
        .into(),
    ]
}

/// Diffs the new emoji list against the cache. Without an emoji cache there
/// is nothing to diff and only `EmojisUpdate` is emitted.
pub(super) fn emojis_update(
    client: &Client,
    _sequence: u64,
    payload: GuildEmojisUpdatePayload,
) -> Vec<EventKind> {
    let guild_id = payload.guild_id;
    if !client.caches().flags().contains(CacheFlags::EMOJIS) {
        let builder = client.entity_builder();
        let emojis = payload
            .emojis
            .iter()
            .map(|emoji| builder.create_emoji(guild_id, emoji, CacheStrategy::No))
            .collect();
        return vec![EmojisUpdate { guild_id, emojis }.into()];
    }

    let mut previous: HashMap<_, _> = client
        .caches()
        .emojis()
        .group_all(guild_id)
        .into_iter()
        .map(|emoji| (emoji.id(), emoji))
        .collect();

    let builder = client.entity_builder();
    let emojis: Vec<_> = payload
        .emojis
        .iter()
        .map(|emoji| builder.create_emoji(guild_id, emoji, CacheStrategy::Yes))
        .collect();

    let mut changes = Vec::new();
    for emoji in &emojis {
        match previous.remove(&emoji.id()) {
            None => changes.push(EmojiCreate { emoji: emoji.clone() }.into()),
            Some(old_emoji) if old_emoji != *emoji => changes.push(
                EmojiUpdate {
                    emoji: emoji.clone(),
                    old_emoji,
                }
                .into(),
            ),
            Some(_) => {}
        }
    }
    for (emoji_id, emoji) in previous {
        client.caches().emojis().remove(guild_id, emoji_id);
        changes.push(EmojiDelete { emoji }.into());
    }

    let mut events = vec![EventKind::from(EmojisUpdate { guild_id, emojis })];
    events.extend(changes);
    events
}
