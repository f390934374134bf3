//! User entity.

use serde::Serialize;

use super::UserId;

bitflags::bitflags! {
    /// Public badges attached to a user.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, serde::Deserialize)]
    pub struct UserFlags: u64 {
        const STAFF = 1 << 0;
        const PARTNER = 1 << 1;
        const HYPESQUAD = 1 << 2;
        const BUG_HUNTER_LEVEL_1 = 1 << 3;
        const HYPESQUAD_BRAVERY = 1 << 6;
        const HYPESQUAD_BRILLIANCE = 1 << 7;
        const HYPESQUAD_BALANCE = 1 << 8;
        const PREMIUM_EARLY_SUPPORTER = 1 << 9;
        const TEAM_PSEUDO_USER = 1 << 10;
        const SYSTEM = 1 << 12;
        const BUG_HUNTER_LEVEL_2 = 1 << 14;
        const VERIFIED_BOT = 1 << 16;
        const VERIFIED_DEVELOPER = 1 << 17;
        const CERTIFIED_MODERATOR = 1 << 18;
        const BOT_HTTP_INTERACTIONS = 1 << 19;
        const ACTIVE_DEVELOPER = 1 << 22;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub(crate) id: UserId,
    pub(crate) username: String,
    pub(crate) discriminator: String,
    pub(crate) global_name: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) banner: Option<String>,
    pub(crate) accent_color: Option<u32>,
    pub(crate) bot: bool,
    pub(crate) system: bool,
    pub(crate) public_flags: UserFlags,
}

impl User {
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    #[must_use]
    pub fn global_name(&self) -> Option<&str> {
        self.global_name.as_deref()
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    #[must_use]
    pub const fn accent_color(&self) -> Option<u32> {
        self.accent_color
    }

    #[must_use]
    pub const fn is_bot(&self) -> bool {
        self.bot
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.system
    }

    #[must_use]
    pub const fn public_flags(&self) -> UserFlags {
        self.public_flags
    }

    /// Global name when set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// `username#1234` for legacy accounts, plain username for migrated ones.
    #[must_use]
    pub fn tag(&self) -> String {
        if self.discriminator == "0" || self.discriminator.is_empty() {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }

    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// The user the client is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfUser {
    pub(crate) user: User,
    pub(crate) mfa_enabled: bool,
    pub(crate) verified: bool,
    pub(crate) locale: Option<String>,
}

impl SelfUser {
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub const fn mfa_enabled(&self) -> bool {
        self.mfa_enabled
    }

    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user(id: u64, username: &str) -> User {
        User {
            id: UserId(id),
            username: username.to_string(),
            discriminator: "0".to_string(),
            global_name: None,
            avatar: None,
            banner: None,
            accent_color: None,
            bot: false,
            system: false,
            public_flags: UserFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_global_name() {
        let mut user = fixtures::user(1, "alice");
        assert_eq!(user.display_name(), "alice");

        user.global_name = Some("Alice A.".to_string());
        assert_eq!(user.display_name(), "Alice A.");
    }

    #[test]
    fn test_tag() {
        let mut user = fixtures::user(1, "legacy");
        assert_eq!(user.tag(), "legacy");

        user.discriminator = "1234".to_string();
        assert_eq!(user.tag(), "legacy#1234");
    }

    #[test]
    fn test_mention() {
        assert_eq!(fixtures::user(77, "bob").mention(), "<@77>");
    }
}
