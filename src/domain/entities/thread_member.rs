use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Channel, ChannelId, Member, UserId};
use crate::application::Client;

/// Membership of a user in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadMember {
    pub(crate) thread_id: ChannelId,
    pub(crate) user_id: UserId,
    pub(crate) join_timestamp: Option<DateTime<Utc>>,
    pub(crate) flags: u64,
}

impl ThreadMember {
    #[must_use]
    pub const fn thread_id(&self) -> ChannelId {
        self.thread_id
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub const fn join_timestamp(&self) -> Option<DateTime<Utc>> {
        self.join_timestamp
    }

    #[must_use]
    pub const fn flags(&self) -> u64 {
        self.flags
    }

    #[must_use]
    pub fn thread(&self, client: &Client) -> Option<Arc<Channel>> {
        client.caches().channels().get(&self.thread_id)
    }

    /// Guild member behind this thread membership, if cached.
    #[must_use]
    pub fn member(&self, client: &Client) -> Option<Arc<Member>> {
        let guild_id = self.thread(client)?.guild_id()?;
        client.caches().members().get(guild_id, self.user_id)
    }
}
