use std::sync::Arc;

use bytes::Bytes;

use crate::domain::entities::{ApplicationId, GuildId, SelfUser};

/// Undecoded frame, dispatched ahead of the typed events when raw events are
/// enabled. Also emitted for tags without a handler.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_type: String,
    pub payload: Bytes,
}

#[derive(Debug, Clone)]
pub struct Ready {
    pub self_user: Arc<SelfUser>,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub application_id: Option<ApplicationId>,
    /// Guilds that will follow as `GUILD_CREATE`.
    pub guild_ids: Vec<GuildId>,
}

#[derive(Debug, Clone)]
pub struct Resumed;

#[derive(Debug, Clone)]
pub struct SelfUpdate {
    pub self_user: Arc<SelfUser>,
    pub old_self_user: Option<Arc<SelfUser>>,
}
