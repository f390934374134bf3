use tracing::debug;

use crate::application::Client;
use crate::application::events::{
    EventKind, GuildVoiceJoin, GuildVoiceLeave, GuildVoiceMove, GuildVoiceStateUpdate,
    VoiceServerUpdate,
};
use crate::application::services::entity_builder::CacheStrategy;
use crate::domain::entities::{ChannelId, UserId};
use crate::infrastructure::discord::dto::VoiceStatePayload;
use crate::infrastructure::discord::gateway::payloads::VoiceServerUpdatePayload;

/// Adds or removes `user_id` from an audio channel's connected set.
pub(super) fn set_connected(client: &Client, channel_id: ChannelId, user_id: UserId, connected: bool) {
    client.caches().channels().update(&channel_id, |channel| {
        if let Some(voice) = channel.as_audio_channel_mut() {
            if connected {
                voice.connect(user_id);
            } else {
                voice.disconnect(user_id);
            }
        }
    });
}

pub(super) fn voice_state_update(
    client: &Client,
    _sequence: u64,
    payload: VoiceStatePayload,
) -> Vec<EventKind> {
    let Some(guild_id) = payload.guild_id else {
        debug!(user_id = %payload.user_id, "Ignoring voice state outside a guild");
        return Vec::new();
    };
    let caches = client.caches();
    let user_id = payload.user_id;
    let old_voice_state = caches.voice_states().get(guild_id, user_id);
    let old_channel_id = old_voice_state.as_ref().and_then(|state| state.channel_id());

    // a state without channel is a leave and is not kept
    let strategy = if payload.channel_id.is_some() {
        CacheStrategy::Yes
    } else {
        caches.voice_states().remove(guild_id, user_id);
        CacheStrategy::No
    };
    let voice_state = client
        .entity_builder()
        .create_voice_state(guild_id, &payload, strategy);

    if old_channel_id != payload.channel_id {
        if let Some(old_channel_id) = old_channel_id {
            set_connected(client, old_channel_id, user_id, false);
        }
        if let Some(channel_id) = payload.channel_id {
            set_connected(client, channel_id, user_id, true);
        }
    }
    caches.reevaluate_member(guild_id, user_id);

    let member = caches.members().get(guild_id, user_id).or_else(|| {
        payload
            .member
            .as_ref()
            .filter(|member| member.user.is_some())
            .map(|member| {
                client
                    .entity_builder()
                    .create_member(guild_id, member, None, CacheStrategy::No)
            })
    });

    let mut events = vec![EventKind::from(GuildVoiceStateUpdate {
        voice_state: voice_state.clone(),
        old_voice_state: old_voice_state.clone(),
        member: member.clone(),
    })];

    match (old_voice_state, old_channel_id, payload.channel_id) {
        (_, None, Some(_)) => events.push(
            GuildVoiceJoin {
                voice_state,
                member,
            }
            .into(),
        ),
        (Some(old_voice_state), Some(old), Some(new)) if old != new => events.push(
            GuildVoiceMove {
                voice_state,
                old_voice_state,
                member,
            }
            .into(),
        ),
        (Some(old_voice_state), Some(_), None) => events.push(
            GuildVoiceLeave {
                voice_state,
                old_voice_state,
                member,
            }
            .into(),
        ),
        _ => {}
    }
    events
}

pub(super) fn voice_server_update(
    _client: &Client,
    _sequence: u64,
    payload: VoiceServerUpdatePayload,
) -> Vec<EventKind> {
    vec![
        VoiceServerUpdate {
            guild_id: payload.guild_id,
            token: payload.token,
            endpoint: payload.endpoint,
        }
        .into(),
    ]
}
