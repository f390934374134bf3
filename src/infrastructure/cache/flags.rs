use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Entity categories the cache keeps. A cleared flag turns every write of
    /// that kind into a no-op.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CacheFlags: u32 {
        const GUILDS = 1 << 0;
        const CHANNELS = 1 << 1;
        const ROLES = 1 << 2;
        const MEMBERS = 1 << 3;
        const THREAD_MEMBERS = 1 << 4;
        const VOICE_STATES = 1 << 5;
        const EMOJIS = 1 << 6;
        const USERS = 1 << 7;
        const MESSAGES = 1 << 8;
    }
}

impl Default for CacheFlags {
    /// Everything except messages.
    fn default() -> Self {
        Self::all().difference(Self::MESSAGES)
    }
}
