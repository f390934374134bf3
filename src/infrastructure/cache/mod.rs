//! In-memory entity cache.
//!
//! Writes go through the `put_*` methods, which honour [`CacheFlags`] and the
//! member/message [`CachePolicy`]. A rejected entity is still returned to the
//! caller, wrapped in a fresh `Arc` that nothing else references.

mod flags;
mod policy;
mod store;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

pub use flags::CacheFlags;
pub use policy::CachePolicy;
pub use store::{EntityCache, GroupedEntityCache};

use crate::domain::entities::{
    Channel, ChannelId, Emoji, EmojiId, Guild, GuildId, Member, Message, MessageId, Role, RoleId,
    ThreadMember, User, UserId, VoiceState,
};

pub struct Caches {
    flags: CacheFlags,
    member_policy: CachePolicy<Member>,
    message_policy: CachePolicy<Message>,

    users: EntityCache<UserId, User>,
    guilds: EntityCache<GuildId, Guild>,
    channels: EntityCache<ChannelId, Channel>,
    members: GroupedEntityCache<GuildId, UserId, Member>,
    roles: GroupedEntityCache<GuildId, RoleId, Role>,
    messages: GroupedEntityCache<ChannelId, MessageId, Message>,
    voice_states: GroupedEntityCache<GuildId, UserId, VoiceState>,
    emojis: GroupedEntityCache<GuildId, EmojiId, Emoji>,
    thread_members: GroupedEntityCache<ChannelId, UserId, ThreadMember>,

    unready_guilds: RwLock<HashSet<GuildId>>,
    unavailable_guilds: RwLock<HashSet<GuildId>>,
}

impl Caches {
    /// Creates caches with the default member and message policies.
    #[must_use]
    pub fn new(flags: CacheFlags) -> Self {
        Self::with_policies(flags, CachePolicy::default(), CachePolicy::default())
    }

    #[must_use]
    pub fn with_policies(
        flags: CacheFlags,
        member_policy: CachePolicy<Member>,
        message_policy: CachePolicy<Message>,
    ) -> Self {
        Self {
            flags,
            member_policy,
            message_policy,
            users: EntityCache::new(),
            guilds: EntityCache::new(),
            channels: EntityCache::new(),
            members: GroupedEntityCache::new(),
            roles: GroupedEntityCache::new(),
            messages: GroupedEntityCache::new(),
            voice_states: GroupedEntityCache::new(),
            emojis: GroupedEntityCache::new(),
            thread_members: GroupedEntityCache::new(),
            unready_guilds: RwLock::new(HashSet::new()),
            unavailable_guilds: RwLock::new(HashSet::new()),
        }
    }

    #[must_use]
    pub const fn flags(&self) -> CacheFlags {
        self.flags
    }

    #[must_use]
    pub const fn users(&self) -> &EntityCache<UserId, User> {
        &self.users
    }

    #[must_use]
    pub const fn guilds(&self) -> &EntityCache<GuildId, Guild> {
        &self.guilds
    }

    #[must_use]
    pub const fn channels(&self) -> &EntityCache<ChannelId, Channel> {
        &self.channels
    }

    #[must_use]
    pub const fn members(&self) -> &GroupedEntityCache<GuildId, UserId, Member> {
        &self.members
    }

    #[must_use]
    pub const fn roles(&self) -> &GroupedEntityCache<GuildId, RoleId, Role> {
        &self.roles
    }

    #[must_use]
    pub const fn messages(&self) -> &GroupedEntityCache<ChannelId, MessageId, Message> {
        &self.messages
    }

    #[must_use]
    pub const fn voice_states(&self) -> &GroupedEntityCache<GuildId, UserId, VoiceState> {
        &self.voice_states
    }

    #[must_use]
    pub const fn emojis(&self) -> &GroupedEntityCache<GuildId, EmojiId, Emoji> {
        &self.emojis
    }

    #[must_use]
    pub const fn thread_members(&self) -> &GroupedEntityCache<ChannelId, UserId, ThreadMember> {
        &self.thread_members
    }

    pub fn put_user(&self, user: User) -> Arc<User> {
        if self.flags.contains(CacheFlags::USERS) {
            self.users.set(user.id(), user)
        } else {
            Arc::new(user)
        }
    }

    pub fn put_guild(&self, guild: Guild) -> Arc<Guild> {
        if self.flags.contains(CacheFlags::GUILDS) {
            self.guilds.set(guild.id(), guild)
        } else {
            Arc::new(guild)
        }
    }

    pub fn put_channel(&self, channel: Channel) -> Arc<Channel> {
        if self.flags.contains(CacheFlags::CHANNELS) {
            self.channels.set(channel.id(), channel)
        } else {
            Arc::new(channel)
        }
    }

    pub fn put_role(&self, role: Role) -> Arc<Role> {
        if self.flags.contains(CacheFlags::ROLES) {
            self.roles.set(role.guild_id(), role.id(), role)
        } else {
            Arc::new(role)
        }
    }

    pub fn put_emoji(&self, emoji: Emoji) -> Arc<Emoji> {
        if self.flags.contains(CacheFlags::EMOJIS) {
            self.emojis.set(emoji.guild_id(), emoji.id(), emoji)
        } else {
            Arc::new(emoji)
        }
    }

    pub fn put_voice_state(&self, voice_state: VoiceState) -> Arc<VoiceState> {
        if self.flags.contains(CacheFlags::VOICE_STATES) {
            self.voice_states
                .set(voice_state.guild_id(), voice_state.user_id(), voice_state)
        } else {
            Arc::new(voice_state)
        }
    }

    pub fn put_thread_member(&self, thread_member: ThreadMember) -> Arc<ThreadMember> {
        if self.flags.contains(CacheFlags::THREAD_MEMBERS) {
            self.thread_members.set(
                thread_member.thread_id(),
                thread_member.user_id(),
                thread_member,
            )
        } else {
            Arc::new(thread_member)
        }
    }

    /// Stores the member if the flags and the member policy allow it. A
    /// member the policy no longer accepts is evicted.
    pub fn put_member(&self, member: Member) -> Arc<Member> {
        if !self.flags.contains(CacheFlags::MEMBERS) {
            return Arc::new(member);
        }
        if self.member_policy.allows(&member, self) {
            self.members.set(member.guild_id(), member.user_id(), member)
        } else {
            self.members.remove(member.guild_id(), member.user_id());
            Arc::new(member)
        }
    }

    pub fn put_message(&self, message: Message) -> Arc<Message> {
        if !self.flags.contains(CacheFlags::MESSAGES) {
            return Arc::new(message);
        }
        if self.message_policy.allows(&message, self) {
            self.messages
                .set(message.channel_id(), message.id(), message)
        } else {
            self.messages.remove(message.channel_id(), message.id());
            Arc::new(message)
        }
    }

    /// Re-runs the member policy against the cached entry, evicting it when
    /// it no longer matches. Used after the inputs of the policy changed
    /// (voice state, guild owner).
    pub fn reevaluate_member(&self, guild_id: GuildId, user_id: UserId) {
        let Some(member) = self.members.get(guild_id, user_id) else {
            return;
        };
        if !self.member_policy.allows(&member, self) {
            self.members.remove(guild_id, user_id);
        }
    }

    /// Drops everything cached under a guild: the guild itself, its channels
    /// and their messages and thread members, members, roles, voice states
    /// and emojis.
    pub fn remove_guild(&self, guild_id: GuildId) -> Option<Arc<Guild>> {
        let channel_ids: Vec<ChannelId> = self
            .channels
            .find_all(|channel| channel.guild_id() == Some(guild_id))
            .iter()
            .map(|channel| channel.id())
            .collect();
        for channel_id in &channel_ids {
            self.channels.remove(channel_id);
            self.messages.remove_group(*channel_id);
            self.thread_members.remove_group(*channel_id);
        }

        self.members.remove_group(guild_id);
        self.roles.remove_group(guild_id);
        self.voice_states.remove_group(guild_id);
        self.emojis.remove_group(guild_id);
        self.unready_guilds.write().remove(&guild_id);
        self.unavailable_guilds.write().remove(&guild_id);
        self.guilds.remove(&guild_id)
    }

    /// Marks a guild announced by READY as not yet received.
    pub fn set_guild_unready(&self, guild_id: GuildId, unready: bool) {
        let mut unready_guilds = self.unready_guilds.write();
        if unready {
            unready_guilds.insert(guild_id);
        } else {
            unready_guilds.remove(&guild_id);
        }
    }

    #[must_use]
    pub fn is_guild_unready(&self, guild_id: GuildId) -> bool {
        self.unready_guilds.read().contains(&guild_id)
    }

    #[must_use]
    pub fn unready_guild_count(&self) -> usize {
        self.unready_guilds.read().len()
    }

    pub fn set_guild_unavailable(&self, guild_id: GuildId, unavailable: bool) {
        let mut unavailable_guilds = self.unavailable_guilds.write();
        if unavailable {
            unavailable_guilds.insert(guild_id);
        } else {
            unavailable_guilds.remove(&guild_id);
        }
    }

    #[must_use]
    pub fn is_guild_unavailable(&self, guild_id: GuildId) -> bool {
        self.unavailable_guilds.read().contains(&guild_id)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let lookups = [
            self.users.hit_miss(),
            self.guilds.hit_miss(),
            self.channels.hit_miss(),
            self.members.hit_miss(),
            self.roles.hit_miss(),
            self.messages.hit_miss(),
            self.voice_states.hit_miss(),
            self.emojis.hit_miss(),
            self.thread_members.hit_miss(),
        ];
        let (hits, misses) = lookups
            .iter()
            .fold((0, 0), |(h, m), (hits, misses)| (h + hits, m + misses));

        CacheStats {
            users: self.users.len(),
            guilds: self.guilds.len(),
            channels: self.channels.len(),
            members: self.members.len(),
            roles: self.roles.len(),
            messages: self.messages.len(),
            voice_states: self.voice_states.len(),
            emojis: self.emojis.len(),
            thread_members: self.thread_members.len(),
            hits,
            misses,
        }
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new(CacheFlags::default())
    }
}

impl fmt::Debug for Caches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caches")
            .field("flags", &self.flags)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Entry counts per collection plus lookup counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub users: usize,
    pub guilds: usize,
    pub channels: usize,
    pub members: usize,
    pub roles: usize,
    pub messages: usize,
    pub voice_states: usize,
    pub emojis: usize,
    pub thread_members: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache: {} guilds, {} channels, {} users, {} members, {} roles, {} messages, \
             {} voice states, {} emojis, {} thread members, {:.1}% hit rate ({} hits, {} misses)",
            self.guilds,
            self.channels,
            self.users,
            self.members,
            self.roles,
            self.messages,
            self.voice_states,
            self.emojis,
            self.thread_members,
            self.hit_rate(),
            self.hits,
            self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::channel_fixtures;
    use crate::domain::entities::member::fixtures::member;
    use crate::domain::entities::message::fixtures::message;
    use crate::domain::entities::user::fixtures::user;
    use crate::domain::entities::voice_state::fixtures::voice_state;

    #[test]
    fn test_flags_disable_writes() {
        let caches = Caches::new(CacheFlags::GUILDS);

        let stored = caches.put_user(user(1, "a"));
        assert_eq!(stored.id(), UserId(1));
        assert!(caches.users().get(&UserId(1)).is_none());
    }

    #[test]
    fn test_member_policy_gates_and_evicts() {
        let caches = Caches::new(CacheFlags::default());

        caches.put_voice_state(voice_state(1, 2, Some(30)));
        caches.put_member(member(1, 2, "v"));
        assert!(caches.members().get(GuildId(1), UserId(2)).is_some());

        caches.put_voice_state(voice_state(1, 2, None));
        caches.reevaluate_member(GuildId(1), UserId(2));
        assert!(caches.members().get(GuildId(1), UserId(2)).is_none());
    }

    #[test]
    fn test_messages_need_flag_and_policy() {
        let all_policy = Caches::with_policies(
            CacheFlags::all(),
            CachePolicy::all(),
            CachePolicy::all(),
        );
        all_policy.put_message(message(1, 2, None, "dm"));
        assert_eq!(all_policy.messages().group_len(ChannelId(2)), 1);

        let no_flag =
            Caches::with_policies(CacheFlags::default(), CachePolicy::all(), CachePolicy::all());
        no_flag.put_message(message(1, 2, None, "dm"));
        assert!(no_flag.messages().is_empty());
    }

    #[test]
    fn test_remove_guild_cascades() {
        let caches =
            Caches::with_policies(CacheFlags::all(), CachePolicy::all(), CachePolicy::all());

        caches.put_channel(channel_fixtures::text(10, 1, "general"));
        caches.put_channel(channel_fixtures::text(20, 2, "other"));
        caches.put_member(member(1, 5, "m"));
        caches.put_message(message(100, 10, Some(1), "hi"));
        caches.set_guild_unready(GuildId(1), true);

        caches.remove_guild(GuildId(1));

        assert!(caches.channels().get(&ChannelId(10)).is_none());
        assert!(caches.channels().get(&ChannelId(20)).is_some());
        assert!(caches.members().group_all(GuildId(1)).is_empty());
        assert!(caches.messages().group_all(ChannelId(10)).is_empty());
        assert!(!caches.is_guild_unready(GuildId(1)));
    }

    #[test]
    fn test_stats_display() {
        let caches = Caches::default();
        caches.put_user(user(1, "a"));
        let _ = caches.users().get(&UserId(1));
        let _ = caches.users().get(&UserId(2));

        let stats = caches.stats();
        assert_eq!(stats.users, 1);
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!(stats.to_string().contains("1 users"));
        assert!(stats.to_string().contains("50.0% hit rate"));
    }
}
