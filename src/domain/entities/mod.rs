//! Domain entity definitions.

mod audit_log;
mod channel;
mod emoji;
mod guild;
mod interaction;
pub(crate) mod member;
pub(crate) mod message;
mod role;
mod snowflake;
mod thread_member;
pub(crate) mod user;
pub(crate) mod voice_state;

pub use audit_log::{AuditLog, AuditLogChange, AuditLogEntry};
#[cfg(test)]
pub(crate) use channel::fixtures as channel_fixtures;
pub use channel::{
    Channel, ChannelKind, DmChannel, ForumTag, GuildCategoryChannel, GuildChannel,
    GuildChannelFields, GuildForumChannel, GuildTextChannel, GuildThread, GuildVoiceChannel,
    MessageChannel, ThreadMetadata, UnknownChannelKind,
};
pub use emoji::Emoji;
pub use guild::{Guild, PremiumTier, VerificationLevel};
pub use interaction::{
    Interaction, InteractionData, InteractionKind, InteractionResponse, InteractionResponseType,
    ResolvedData,
};
pub use member::Member;
pub use message::{
    Attachment, Embed, Message, MessageFlags, MessageKind, MessageReference, Reaction,
    ReactionEmoji,
};
pub use role::{Role, RoleTags};
pub use snowflake::{
    ApplicationId, AuditLogEntryId, ChannelId, EmojiId, GuildId, InteractionId, MessageId,
    PLATFORM_EPOCH_MS, RoleId, Snowflake, UserId,
};
pub use thread_member::ThreadMember;
pub use user::{SelfUser, User, UserFlags};
pub use voice_state::VoiceState;
