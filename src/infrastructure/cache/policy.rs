//! Per-entity inclusion predicates.

use std::fmt;
use std::sync::Arc;

use super::Caches;
use crate::domain::entities::{Member, Message};

type Predicate<T> = dyn Fn(&T, &Caches) -> bool + Send + Sync;

/// Decides whether an entity of kind `T` is kept. Evaluated on every write;
/// an entity that stops matching is evicted on its next write.
pub struct CachePolicy<T> {
    predicate: Arc<Predicate<T>>,
}

impl<T> Clone for CachePolicy<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for CachePolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePolicy").finish_non_exhaustive()
    }
}

impl<T: 'static> CachePolicy<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &Caches) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(|_, _| true)
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(|_, _| false)
    }

    #[must_use]
    pub fn allows(&self, entity: &T, caches: &Caches) -> bool {
        (self.predicate)(entity, caches)
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::new(move |entity, caches| self.allows(entity, caches) && other.allows(entity, caches))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(move |entity, caches| self.allows(entity, caches) || other.allows(entity, caches))
    }
}

impl CachePolicy<Member> {
    /// Keeps guild owners.
    #[must_use]
    pub fn owner() -> Self {
        Self::new(|member, caches| {
            caches
                .guilds()
                .get(&member.guild_id())
                .is_some_and(|guild| guild.owner_id() == member.user_id())
        })
    }

    /// Keeps members currently connected to a voice channel.
    #[must_use]
    pub fn in_voice() -> Self {
        Self::new(|member, caches| {
            caches
                .voice_states()
                .get(member.guild_id(), member.user_id())
                .is_some_and(|state| state.channel_id().is_some())
        })
    }

    /// Keeps members still pending membership screening.
    #[must_use]
    pub fn pending() -> Self {
        Self::new(|member, _| member.is_pending())
    }
}

impl Default for CachePolicy<Member> {
    fn default() -> Self {
        Self::owner().or(Self::in_voice())
    }
}

impl CachePolicy<Message> {
    /// Keeps guild messages only.
    #[must_use]
    pub fn guild_only() -> Self {
        Self::new(|message, _| !message.is_dm())
    }
}

impl Default for CachePolicy<Message> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::member::fixtures::member;
    use crate::domain::entities::message::fixtures::message;
    use crate::domain::entities::voice_state::fixtures::voice_state;
    use crate::infrastructure::cache::CacheFlags;

    #[test]
    fn test_combinators() {
        let caches = Caches::new(CacheFlags::default());
        let subject = member(1, 2, "x");

        let yes = CachePolicy::<Member>::all();
        let no = CachePolicy::<Member>::none();

        assert!(yes.clone().or(no.clone()).allows(&subject, &caches));
        assert!(!yes.clone().and(no.clone()).allows(&subject, &caches));
        assert!(!no.clone().or(no).allows(&subject, &caches));
        assert!(yes.clone().and(yes).allows(&subject, &caches));
    }

    #[test]
    fn test_default_member_policy_owner_or_voice() {
        let caches = Caches::new(CacheFlags::default());
        let policy = CachePolicy::<Member>::default();
        let subject = member(1, 2, "x");

        assert!(!policy.allows(&subject, &caches));

        caches
            .voice_states()
            .set(subject.guild_id(), subject.user_id(), voice_state(1, 2, Some(30)));
        assert!(policy.allows(&subject, &caches));

        caches
            .voice_states()
            .set(subject.guild_id(), subject.user_id(), voice_state(1, 2, None));
        assert!(!policy.allows(&subject, &caches));
    }

    #[test]
    fn test_default_message_policy_is_none() {
        let caches = Caches::new(CacheFlags::all());
        let policy = CachePolicy::<Message>::default();
        assert!(!policy.allows(&message(1, 2, Some(3), "hi"), &caches));
        assert!(CachePolicy::<Message>::guild_only().allows(&message(1, 2, Some(3), "hi"), &caches));
    }
}
