//! Snowflake identifiers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds between the Unix epoch and the platform epoch (2015-01-01).
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

/// A 64-bit, time-sortable identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Snowflake(#[serde(with = "crate::domain::serde_utils::string_to_u64")] pub u64);

impl Snowflake {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which this id was generated.
    #[must_use]
    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> 22) + PLATFORM_EPOCH_MS
    }

    /// Creation time embedded in the id.
    #[must_use]
    pub fn created_at(self) -> DateTime<Utc> {
        i64::try_from(self.timestamp_ms())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_default()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn worker_id(self) -> u8 {
        ((self.0 & 0x003E_0000) >> 17) as u8
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn process_id(self) -> u8 {
        ((self.0 & 0x0001_F000) >> 12) as u8
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn increment(self) -> u16 {
        (self.0 & 0xFFF) as u16
    }
}

impl std::fmt::Display for Snowflake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "crate::domain::serde_utils::string_to_u64")] pub u64);

        impl $name {
            /// Returns the underlying u64 value.
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            /// Returns the untyped snowflake.
            #[must_use]
            pub const fn snowflake(self) -> Snowflake {
                Snowflake(self.0)
            }

            /// Creation time embedded in the id.
            #[must_use]
            pub fn created_at(self) -> DateTime<Utc> {
                self.snowflake().created_at()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<Snowflake> for $name {
            fn from(value: Snowflake) -> Self {
                Self(value.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Unique identifier for a user.
    UserId
);
snowflake_id!(
    /// Unique identifier for a guild (server).
    GuildId
);
snowflake_id!(
    /// Unique identifier for a channel or thread.
    ChannelId
);
snowflake_id!(
    /// Unique identifier for a role.
    RoleId
);
snowflake_id!(
    /// Unique identifier for a message.
    MessageId
);
snowflake_id!(
    /// Unique identifier for a custom emoji.
    EmojiId
);
snowflake_id!(
    /// Unique identifier for an application.
    ApplicationId
);
snowflake_id!(
    /// Unique identifier for an interaction.
    InteractionId
);
snowflake_id!(
    /// Unique identifier for an audit log entry.
    AuditLogEntryId
);

impl GuildId {
    /// The `@everyone` role shares its id with the guild.
    #[must_use]
    pub const fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_timestamp() {
        let id = Snowflake(175_928_847_299_117_063);
        assert_eq!(id.timestamp_ms(), 1_462_015_105_796);
        assert_eq!(id.created_at().timestamp_millis(), 1_462_015_105_796);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.process_id(), 0);
        assert_eq!(id.increment(), 7);
    }

    #[test]
    fn test_typed_id_display_and_parse() {
        let id: UserId = "123456789".parse().unwrap();
        assert_eq!(id, UserId(123_456_789));
        assert_eq!(format!("{id}"), "123456789");
    }

    #[test]
    fn test_typed_id_serializes_as_string() {
        let json = serde_json::to_string(&ChannelId(42)).unwrap();
        assert_eq!(json, "\"42\"");

        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChannelId(42));
    }

    #[test]
    fn test_ids_sort_by_creation() {
        let older = MessageId(175_928_847_299_117_063);
        let newer = MessageId(275_928_847_299_117_063);
        assert!(older < newer);
        assert!(older.created_at() < newer.created_at());
    }

    #[test]
    fn test_everyone_role() {
        assert_eq!(GuildId(9).everyone_role(), RoleId(9));
    }
}
