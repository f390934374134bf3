use std::sync::Arc;

use serde::Serialize;

use super::{EmojiId, Guild, GuildId, RoleId, User};
use crate::application::Client;

/// Custom guild emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emoji {
    pub(crate) id: EmojiId,
    pub(crate) guild_id: GuildId,
    pub(crate) name: String,
    pub(crate) role_ids: Vec<RoleId>,
    pub(crate) creator: Option<User>,
    pub(crate) require_colons: bool,
    pub(crate) managed: bool,
    pub(crate) animated: bool,
    pub(crate) available: bool,
}

impl Emoji {
    #[must_use]
    pub const fn id(&self) -> EmojiId {
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

    /// Roles allowed to use the emoji. Empty means everyone.
    #[must_use]
    pub fn role_ids(&self) -> &[RoleId] {
        &self.role_ids
    }

    #[must_use]
    pub const fn creator(&self) -> Option<&User> {
        self.creator.as_ref()
    }

    #[must_use]
    pub const fn requires_colons(&self) -> bool {
        self.require_colons
    }

    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.animated
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    #[must_use]
    pub fn mention(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{prefix}:{}:{}>", self.name, self.id)
    }

    #[must_use]
    pub fn guild(&self, client: &Client) -> Option<Arc<Guild>> {
        client.caches().guilds().get(&self.guild_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention() {
        let mut emoji = Emoji {
            id: EmojiId(41),
            guild_id: GuildId(1),
            name: "blob".to_string(),
            role_ids: Vec::new(),
            creator: None,
            require_colons: true,
            managed: false,
            animated: false,
            available: true,
        };
        assert_eq!(emoji.mention(), "<:blob:41>");

        emoji.animated = true;
        assert_eq!(emoji.mention(), "<a:blob:41>");
    }
}
