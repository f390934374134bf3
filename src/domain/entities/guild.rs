//! Guild entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Channel, ChannelId, GuildId, Member, Role, UserId, VoiceState};
use crate::application::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum VerificationLevel {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    VeryHigh = 4,
}

impl From<u8> for VerificationLevel {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            4 => Self::VeryHigh,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum PremiumTier {
    #[default]
    None = 0,
    Tier1 = 1,
    Tier2 = 2,
    Tier3 = 3,
}

impl From<u8> for PremiumTier {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Tier1,
            2 => Self::Tier2,
            3 => Self::Tier3,
            _ => Self::None,
        }
    }
}

/// Guild (server) information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guild {
    pub(crate) id: GuildId,
    pub(crate) name: String,
    pub(crate) icon: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) owner_id: UserId,
    pub(crate) afk_channel_id: Option<ChannelId>,
    pub(crate) system_channel_id: Option<ChannelId>,
    pub(crate) verification_level: VerificationLevel,
    pub(crate) premium_tier: PremiumTier,
    pub(crate) features: Vec<String>,
    pub(crate) member_count: Option<u64>,
    pub(crate) large: bool,
    pub(crate) unavailable: bool,
    pub(crate) joined_at: Option<DateTime<Utc>>,
}

impl Guild {
    /// Returns the guild ID.
    #[must_use]
    pub const fn id(&self) -> GuildId {
        self.id
    }

    /// Returns the guild name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the guild icon hash.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub const fn afk_channel_id(&self) -> Option<ChannelId> {
        self.afk_channel_id
    }

    #[must_use]
    pub const fn system_channel_id(&self) -> Option<ChannelId> {
        self.system_channel_id
    }

    #[must_use]
    pub const fn verification_level(&self) -> VerificationLevel {
        self.verification_level
    }

    #[must_use]
    pub const fn premium_tier(&self) -> PremiumTier {
        self.premium_tier
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Only present on the initial guild payload.
    #[must_use]
    pub const fn member_count(&self) -> Option<u64> {
        self.member_count
    }

    #[must_use]
    pub const fn is_large(&self) -> bool {
        self.large
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    #[must_use]
    pub const fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at
    }

    /// Looks up the owner in the member cache.
    #[must_use]
    pub fn owner(&self, client: &Client) -> Option<Arc<Member>> {
        client.caches().members().get(self.id, self.owner_id)
    }

    #[must_use]
    pub fn channels(&self, client: &Client) -> Vec<Arc<Channel>> {
        client
            .caches()
            .channels()
            .find_all(|channel| channel.guild_id() == Some(self.id))
    }

    #[must_use]
    pub fn roles(&self, client: &Client) -> Vec<Arc<Role>> {
        client.caches().roles().group_all(self.id)
    }

    #[must_use]
    pub fn members(&self, client: &Client) -> Vec<Arc<Member>> {
        client.caches().members().group_all(self.id)
    }

    #[must_use]
    pub fn voice_states(&self, client: &Client) -> Vec<Arc<VoiceState>> {
        client.caches().voice_states().group_all(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversions() {
        assert_eq!(VerificationLevel::from(3), VerificationLevel::High);
        assert_eq!(VerificationLevel::from(99), VerificationLevel::None);
        assert_eq!(PremiumTier::from(2), PremiumTier::Tier2);
    }
}
