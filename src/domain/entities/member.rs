use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Guild, GuildId, Role, RoleId, User, UserId, VoiceState};
use crate::application::Client;

/// Guild membership record. Owns the member's [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub(crate) guild_id: GuildId,
    pub(crate) user: User,
    pub(crate) nick: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) role_ids: Vec<RoleId>,
    pub(crate) joined_at: Option<DateTime<Utc>>,
    pub(crate) premium_since: Option<DateTime<Utc>>,
    pub(crate) communication_disabled_until: Option<DateTime<Utc>>,
    pub(crate) deaf: bool,
    pub(crate) mute: bool,
    pub(crate) pending: bool,
}

impl Member {
    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    /// Guild-specific avatar hash.
    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn role_ids(&self) -> &[RoleId] {
        &self.role_ids
    }

    #[must_use]
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }

    #[must_use]
    pub const fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at
    }

    #[must_use]
    pub const fn premium_since(&self) -> Option<DateTime<Utc>> {
        self.premium_since
    }

    #[must_use]
    pub const fn communication_disabled_until(&self) -> Option<DateTime<Utc>> {
        self.communication_disabled_until
    }

    /// Returns true while a timeout is in effect at `now`.
    #[must_use]
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        self.communication_disabled_until
            .is_some_and(|until| until > now)
    }

    #[must_use]
    pub const fn is_deaf(&self) -> bool {
        self.deaf
    }

    #[must_use]
    pub const fn is_mute(&self) -> bool {
        self.mute
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Nickname, then global name, then username.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.nick.as_deref().unwrap_or_else(|| self.user.display_name())
    }

    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user.id)
    }

    #[must_use]
    pub fn guild(&self, client: &Client) -> Option<Arc<Guild>> {
        client.caches().guilds().get(&self.guild_id)
    }

    /// Cached roles of this member, highest position first. Roles missing from
    /// the cache are skipped.
    #[must_use]
    pub fn roles(&self, client: &Client) -> Vec<Arc<Role>> {
        let roles = client.caches().roles();
        let mut resolved: Vec<_> = self
            .role_ids
            .iter()
            .filter_map(|id| roles.get(self.guild_id, *id))
            .collect();
        resolved.sort_by(|a, b| b.position().cmp(&a.position()));
        resolved
    }

    #[must_use]
    pub fn voice_state(&self, client: &Client) -> Option<Arc<VoiceState>> {
        client
            .caches()
            .voice_states()
            .get(self.guild_id, self.user.id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::entities::user::fixtures::user;

    pub fn member(guild_id: u64, user_id: u64, username: &str) -> Member {
        Member {
            guild_id: GuildId(guild_id),
            user: user(user_id, username),
            nick: None,
            avatar: None,
            role_ids: Vec::new(),
            joined_at: None,
            premium_since: None,
            communication_disabled_until: None,
            deaf: false,
            mute: false,
            pending: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_effective_name() {
        let mut member = fixtures::member(1, 2, "carol");
        assert_eq!(member.effective_name(), "carol");

        member.user.global_name = Some("Carol".to_string());
        assert_eq!(member.effective_name(), "Carol");

        member.nick = Some("cc".to_string());
        assert_eq!(member.effective_name(), "cc");
    }

    #[test]
    fn test_timeout() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut member = fixtures::member(1, 2, "dave");
        assert!(!member.is_timed_out(now));

        member.communication_disabled_until = Some(now + chrono::Duration::minutes(5));
        assert!(member.is_timed_out(now));
        assert!(!member.is_timed_out(now + chrono::Duration::minutes(10)));
    }

    #[test]
    fn test_has_role() {
        let mut member = fixtures::member(1, 2, "erin");
        member.role_ids = vec![RoleId(10), RoleId(11)];
        assert!(member.has_role(RoleId(11)));
        assert!(!member.has_role(RoleId(12)));
    }
}
