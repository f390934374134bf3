//! Gateway intents: which event groups the transport subscribes to.

use serde::{Deserialize, Serialize};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayIntent {
    Guilds = 1 << 0,
    GuildMembers = 1 << 1,
    GuildModeration = 1 << 2,
    GuildExpressions = 1 << 3,
    GuildIntegrations = 1 << 4,
    GuildWebhooks = 1 << 5,
    GuildInvites = 1 << 6,
    GuildVoiceStates = 1 << 7,
    GuildPresences = 1 << 8,
    GuildMessages = 1 << 9,
    GuildMessageReactions = 1 << 10,
    GuildMessageTyping = 1 << 11,
    DirectMessages = 1 << 12,
    DirectMessageReactions = 1 << 13,
    DirectMessageTyping = 1 << 14,
    MessageContent = 1 << 15,
}

impl GatewayIntent {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Intents the platform only grants to allow-listed applications.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::GuildMembers | Self::GuildPresences | Self::MessageContent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayIntents(u32);

impl GatewayIntents {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn with(mut self, intent: GatewayIntent) -> Self {
        self.0 |= intent.as_u32();
        self
    }

    #[must_use]
    pub const fn has(self, intent: GatewayIntent) -> bool {
        (self.0 & intent.as_u32()) != 0
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Every non-privileged intent.
    #[must_use]
    pub const fn non_privileged() -> Self {
        Self::new()
            .with(GatewayIntent::Guilds)
            .with(GatewayIntent::GuildModeration)
            .with(GatewayIntent::GuildExpressions)
            .with(GatewayIntent::GuildIntegrations)
            .with(GatewayIntent::GuildWebhooks)
            .with(GatewayIntent::GuildInvites)
            .with(GatewayIntent::GuildVoiceStates)
            .with(GatewayIntent::GuildMessages)
            .with(GatewayIntent::GuildMessageReactions)
            .with(GatewayIntent::GuildMessageTyping)
            .with(GatewayIntent::DirectMessages)
            .with(GatewayIntent::DirectMessageReactions)
            .with(GatewayIntent::DirectMessageTyping)
    }

    #[must_use]
    pub const fn with_members(self) -> Self {
        self.with(GatewayIntent::GuildMembers)
    }

    #[must_use]
    pub const fn with_presences(self) -> Self {
        self.with(GatewayIntent::GuildPresences)
    }
}

impl From<GatewayIntents> for u32 {
    fn from(intents: GatewayIntents) -> Self {
        intents.as_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_builder() {
        let intents = GatewayIntents::non_privileged();
        assert!(intents.has(GatewayIntent::Guilds));
        assert!(intents.has(GatewayIntent::GuildVoiceStates));
        assert!(!intents.has(GatewayIntent::GuildMembers));

        let with_members = intents.with_members();
        assert!(with_members.has(GatewayIntent::GuildMembers));
    }

    #[test]
    fn test_intents_value() {
        let intents = GatewayIntents::new()
            .with(GatewayIntent::Guilds)
            .with(GatewayIntent::GuildMessages);

        assert_eq!(intents.as_u32(), (1 << 0) | (1 << 9));
        assert_eq!(serde_json::to_string(&intents).unwrap(), "513");
    }

    #[test]
    fn test_privileged() {
        assert!(GatewayIntent::GuildMembers.is_privileged());
        assert!(!GatewayIntent::GuildVoiceStates.is_privileged());
    }
}
