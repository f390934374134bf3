use serde::de::IgnoredAny;
use tracing::info;

use crate::application::Client;
use crate::application::events::{EventKind, GuildsReady, Ready, Resumed, SelfUpdate};
use crate::infrastructure::discord::dto::UserPayload;
use crate::infrastructure::discord::gateway::payloads::ReadyPayload;

pub(super) fn ready(client: &Client, _sequence: u64, payload: ReadyPayload) -> Vec<EventKind> {
    let self_user = client.entity_builder().create_self_user(&payload.user);
    if let Some(application) = &payload.application {
        client.set_application_id(application.id);
    }

    let guild_ids: Vec<_> = payload.guilds.iter().map(|guild| guild.id).collect();
    for guild_id in &guild_ids {
        client.caches().set_guild_unready(*guild_id, true);
    }
    info!(
        user_id = %self_user.id(),
        guilds = guild_ids.len(),
        "Session ready"
    );

    let no_guilds = guild_ids.is_empty();
    let mut events = vec![EventKind::from(Ready {
        self_user,
        session_id: payload.session_id,
        resume_gateway_url: payload.resume_gateway_url,
        application_id: payload.application.map(|application| application.id),
        guild_ids,
    })];
    if no_guilds {
        events.push(GuildsReady { guild_count: 0 }.into());
    }
    events
}

pub(super) fn resumed(_client: &Client, _sequence: u64, _payload: IgnoredAny) -> Vec<EventKind> {
    vec![Resumed.into()]
}

pub(super) fn user_update(client: &Client, _sequence: u64, payload: UserPayload) -> Vec<EventKind> {
    let old_self_user = client.self_user();
    let self_user = client.entity_builder().create_self_user(&payload);
    vec![
        SelfUpdate {
            self_user,
            old_self_user,
        }
        .into(),
    ]
}
