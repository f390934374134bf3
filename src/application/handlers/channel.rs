use std::sync::Arc;

use tracing::warn;

use crate::application::Client;
use crate::application::events::{
    ChannelCreate, ChannelDelete, ChannelUpdate, DmChannelCreate, DmChannelDelete,
    DmChannelUpdate, EventKind, GuildChannelCreate, GuildChannelDelete, GuildChannelUpdate,
    ThreadCreate, ThreadDelete, ThreadMemberAdd, ThreadMemberRemove, ThreadUpdate,
};
use crate::application::services::entity_builder::{BuildError, CacheStrategy};
use crate::domain::entities::{Channel, ThreadMember, UserId};
use crate::infrastructure::discord::dto::{ChannelPayload, ThreadMemberPayload};
use crate::infrastructure::discord::gateway::payloads::{
    ThreadDeletePayload, ThreadMembersUpdatePayload,
};

fn build(client: &Client, payload: &ChannelPayload, strategy: CacheStrategy) -> Option<Arc<Channel>> {
    client
        .entity_builder()
        .create_channel(payload, None, strategy)
        .map_err(|e: BuildError| {
            warn!(channel_id = %payload.id, error = %e, "Dropping channel event");
        })
        .ok()
}

/// A thread member's user id, falling back to the client's own id for the
/// membership object embedded in `THREAD_CREATE`.
fn thread_member_user_id(client: &Client, payload: &ThreadMemberPayload) -> Option<UserId> {
    payload
        .user_id
        .or_else(|| {
            payload
                .member
                .as_ref()
                .and_then(|member| member.user.as_ref())
                .map(|user| user.id)
        })
        .or_else(|| client.self_user_id())
}

pub(super) fn channel_create(client: &Client, _sequence: u64, payload: ChannelPayload) -> Vec<EventKind> {
    let Some(channel) = build(client, &payload, CacheStrategy::Yes) else {
        return Vec::new();
    };
    let scoped = match channel.guild_id() {
        Some(guild_id) => GuildChannelCreate {
            guild_id,
            channel: channel.clone(),
        }
        .into(),
        None => DmChannelCreate {
            channel: channel.clone(),
        }
        .into(),
    };
    vec![ChannelCreate { channel }.into(), scoped]
}

pub(super) fn channel_update(client: &Client, _sequence: u64, payload: ChannelPayload) -> Vec<EventKind> {
    let old_channel = client.caches().channels().get(&payload.id);
    let Some(channel) = build(client, &payload, CacheStrategy::Yes) else {
        return Vec::new();
    };
    let scoped = match channel.guild_id() {
        Some(guild_id) => GuildChannelUpdate {
            guild_id,
            channel: channel.clone(),
            old_channel: old_channel.clone(),
        }
        .into(),
        None => DmChannelUpdate {
            channel: channel.clone(),
            old_channel: old_channel.clone(),
        }
        .into(),
    };
    vec![
        ChannelUpdate {
            channel,
            old_channel,
        }
        .into(),
        scoped,
    ]
}

pub(super) fn channel_delete(client: &Client, _sequence: u64, payload: ChannelPayload) -> Vec<EventKind> {
    let caches = client.caches();
    let removed = caches.channels().remove(&payload.id);
    caches.messages().remove_group(payload.id);

    let Some(channel) = removed.or_else(|| build(client, &payload, CacheStrategy::No)) else {
        return Vec::new();
    };
    let scoped = match channel.guild_id() {
        Some(guild_id) => GuildChannelDelete {
            guild_id,
            channel: channel.clone(),
        }
        .into(),
        None => DmChannelDelete {
            channel: channel.clone(),
        }
        .into(),
    };
    vec![ChannelDelete { channel }.into(), scoped]
}

pub(super) fn thread_create(client: &Client, _sequence: u64, payload: ChannelPayload) -> Vec<EventKind> {
    let Some(thread) = build(client, &payload, CacheStrategy::Yes) else {
        return Vec::new();
    };
    let thread_member = payload.member.as_ref().and_then(|member| {
        let user_id = thread_member_user_id(client, member)?;
        Some(client.entity_builder().create_thread_member(
            payload.id,
            user_id,
            member,
            CacheStrategy::Yes,
        ))
    });
    vec![
        ThreadCreate {
            thread,
            thread_member,
        }
        .into(),
    ]
}

pub(super) fn thread_update(client: &Client, _sequence: u64, payload: ChannelPayload) -> Vec<EventKind> {
    let old_thread = client.caches().channels().get(&payload.id);
    build(client, &payload, CacheStrategy::Yes)
        .map(|thread| vec![ThreadUpdate { thread, old_thread }.into()])
        .unwrap_or_default()
}

pub(super) fn thread_delete(
    client: &Client,
    _sequence: u64,
    payload: ThreadDeletePayload,
) -> Vec<EventKind> {
    let caches = client.caches();
    let thread = caches.channels().remove(&payload.id);
    caches.thread_members().remove_group(payload.id);
    caches.messages().remove_group(payload.id);

    vec![
        ThreadDelete {
            thread_id: payload.id,
            guild_id: payload.guild_id,
            parent_id: payload.parent_id,
            thread,
        }
        .into(),
    ]
}

pub(super) fn thread_members_update(
    client: &Client,
    _sequence: u64,
    payload: ThreadMembersUpdatePayload,
) -> Vec<EventKind> {
    let caches = client.caches();
    let builder = client.entity_builder();
    caches.channels().update(&payload.id, |channel| {
        if let Channel::GuildThread(thread) = channel {
            thread.member_count = payload.member_count;
        }
    });

    let mut events = Vec::new();
    for added in &payload.added_members {
        let Some(user_id) = added.user_id.or_else(|| {
            added
                .member
                .as_ref()
                .and_then(|member| member.user.as_ref())
                .map(|user| user.id)
        }) else {
            warn!(thread_id = %payload.id, "Thread member without user id");
            continue;
        };
        let thread_member =
            builder.create_thread_member(payload.id, user_id, added, CacheStrategy::Yes);
        let member = added
            .member
            .as_ref()
            .filter(|member| member.user.is_some())
            .map(|member| builder.create_member(payload.guild_id, member, None, CacheStrategy::Yes));
        events.push(
            ThreadMemberAdd {
                thread_id: payload.id,
                guild_id: payload.guild_id,
                thread_member,
                member,
            }
            .into(),
        );
    }

    for user_id in &payload.removed_member_ids {
        let thread_member: Option<Arc<ThreadMember>> =
            caches.thread_members().remove(payload.id, *user_id);
        events.push(
            ThreadMemberRemove {
                thread_id: payload.id,
                guild_id: payload.guild_id,
                user_id: *user_id,
                thread_member,
            }
            .into(),
        );
    }
    events
}
