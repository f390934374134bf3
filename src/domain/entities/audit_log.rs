use std::collections::HashMap;

use serde::Serialize;

use super::{AuditLogEntryId, Channel, ChannelId, GuildId, User, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogChange {
    pub key: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogEntry {
    pub(crate) id: AuditLogEntryId,
    pub(crate) guild_id: GuildId,
    pub(crate) user_id: Option<UserId>,
    pub(crate) target_id: Option<u64>,
    pub(crate) action_type: u16,
    pub(crate) changes: Vec<AuditLogChange>,
    pub(crate) reason: Option<String>,
}

impl AuditLogEntry {
    #[must_use]
    pub const fn id(&self) -> AuditLogEntryId {
        self.id
    }

    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// User who performed the action.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    pub const fn target_id(&self) -> Option<u64> {
        self.target_id
    }

    #[must_use]
    pub const fn action_type(&self) -> u16 {
        self.action_type
    }

    #[must_use]
    pub fn changes(&self) -> &[AuditLogChange] {
        &self.changes
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// A page of audit log entries together with the users and threads they
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLog {
    pub(crate) guild_id: GuildId,
    pub(crate) entries: Vec<AuditLogEntry>,
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) threads: HashMap<ChannelId, Channel>,
}

impl AuditLog {
    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    #[must_use]
    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn users(&self) -> &HashMap<UserId, User> {
        &self.users
    }

    #[must_use]
    pub const fn threads(&self) -> &HashMap<ChannelId, Channel> {
        &self.threads
    }

    /// Actor of an entry, resolved from the users shipped with the page.
    #[must_use]
    pub fn actor(&self, entry: &AuditLogEntry) -> Option<&User> {
        entry.user_id.and_then(|id| self.users.get(&id))
    }
}
