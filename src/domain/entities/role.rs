use std::sync::Arc;

use serde::Serialize;

use super::{Guild, GuildId, RoleId};
use crate::application::Client;

/// Bot, integration and booster associations of a managed role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleTags {
    pub bot_id: Option<u64>,
    pub integration_id: Option<u64>,
    pub premium_subscriber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub(crate) id: RoleId,
    pub(crate) guild_id: GuildId,
    pub(crate) name: String,
    pub(crate) color: u32,
    pub(crate) hoist: bool,
    pub(crate) icon: Option<String>,
    pub(crate) unicode_emoji: Option<String>,
    pub(crate) position: i32,
    /// Raw permission bitset as sent by the platform.
    pub(crate) permissions: u64,
    pub(crate) managed: bool,
    pub(crate) mentionable: bool,
    pub(crate) tags: Option<RoleTags>,
}

impl Role {
    #[must_use]
    pub const fn id(&self) -> RoleId {
        self.id
    }

    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn color(&self) -> u32 {
        self.color
    }

    #[must_use]
    pub const fn is_hoisted(&self) -> bool {
        self.hoist
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn unicode_emoji(&self) -> Option<&str> {
        self.unicode_emoji.as_deref()
    }

    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    #[must_use]
    pub const fn permissions(&self) -> u64 {
        self.permissions
    }

    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    #[must_use]
    pub const fn is_mentionable(&self) -> bool {
        self.mentionable
    }

    #[must_use]
    pub const fn tags(&self) -> Option<&RoleTags> {
        self.tags.as_ref()
    }

    #[must_use]
    pub const fn is_everyone(&self) -> bool {
        self.id.0 == self.guild_id.0
    }

    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }

    #[must_use]
    pub fn guild(&self, client: &Client) -> Option<Arc<Guild>> {
        client.caches().guilds().get(&self.guild_id)
    }
}
