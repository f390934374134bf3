use std::sync::Arc;

use crate::domain::entities::{GuildId, Member, VoiceState};

/// Raw voice state change. Always emitted before the join, move or leave
/// event derived from it.
#[derive(Debug, Clone)]
pub struct GuildVoiceStateUpdate {
    pub voice_state: Arc<VoiceState>,
    pub old_voice_state: Option<Arc<VoiceState>>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct GuildVoiceJoin {
    pub voice_state: Arc<VoiceState>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct GuildVoiceMove {
    pub voice_state: Arc<VoiceState>,
    pub old_voice_state: Arc<VoiceState>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct GuildVoiceLeave {
    pub voice_state: Arc<VoiceState>,
    pub old_voice_state: Arc<VoiceState>,
    pub member: Option<Arc<Member>>,
}

#[derive(Debug, Clone)]
pub struct VoiceServerUpdate {
    pub guild_id: GuildId,
    pub token: String,
    pub endpoint: Option<String>,
}
