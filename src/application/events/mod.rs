//! Domain events delivered to listeners.
//!
//! Every event is an [`Event`]: the sequence number of the wire frame it came
//! from, a handle to the client and one [`EventKind`]. A single wire event
//! may fan out into several kinds (for example `MessageCreate` followed by
//! `GuildMessageCreate`, or `ChannelCreate` followed by `DmChannelCreate`).

mod channel;
mod guild;
mod interaction;
mod message;
mod session;
mod voice;

use std::fmt;

pub use channel::{
    ChannelCreate, ChannelDelete, ChannelUpdate, DmChannelCreate, DmChannelDelete,
    DmChannelUpdate, GuildChannelCreate, GuildChannelDelete, GuildChannelUpdate, ThreadCreate,
    ThreadDelete, ThreadMemberAdd, ThreadMemberRemove, ThreadUpdate,
};
pub use guild::{
    EmojiCreate, EmojiDelete, EmojiUpdate, EmojisUpdate, GuildAvailable, GuildJoin, GuildLeave,
    GuildMemberJoin, GuildMemberLeave, GuildMemberUpdate, GuildMembersChunk, GuildReady,
    GuildUnavailable, GuildUpdate, GuildsReady, RoleCreate, RoleDelete, RoleUpdate,
};
pub use interaction::{InteractionCreate, InteractionResponder};
pub use message::{
    DmMessageCreate, DmMessageDelete, DmMessageUpdate, GuildMessageCreate, GuildMessageDelete,
    GuildMessageUpdate, MessageCreate, MessageDelete, MessageReactionAdd, MessageReactionRemove,
    MessageReactionRemoveAll, MessageUpdate, UserTypingStart,
};
pub use session::{RawEvent, Ready, Resumed, SelfUpdate};
pub use voice::{
    GuildVoiceJoin, GuildVoiceLeave, GuildVoiceMove, GuildVoiceStateUpdate, VoiceServerUpdate,
};

use crate::application::Client;

/// Typed extraction of one event kind, used by collectors.
pub trait FromEvent: Clone + Send + Sync + 'static {
    fn from_event(event: &Event) -> Option<Self>;
}

macro_rules! event_kinds {
    ($($variant:ident),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EventKind {
            $($variant($variant)),*
        }

        impl EventKind {
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($variant)),*
                }
            }
        }

        $(
            impl FromEvent for $variant {
                fn from_event(event: &Event) -> Option<Self> {
                    match &event.kind {
                        EventKind::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$variant> for EventKind {
                fn from(inner: $variant) -> Self {
                    Self::$variant(inner)
                }
            }
        )*
    };
}

event_kinds! {
    RawEvent,
    Ready,
    Resumed,
    SelfUpdate,
    GuildJoin,
    GuildReady,
    GuildAvailable,
    GuildsReady,
    GuildUpdate,
    GuildLeave,
    GuildUnavailable,
    GuildMemberJoin,
    GuildMemberUpdate,
    GuildMemberLeave,
    GuildMembersChunk,
    RoleCreate,
    RoleUpdate,
    RoleDelete,
    EmojisUpdate,
    EmojiCreate,
    EmojiUpdate,
    EmojiDelete,
    ChannelCreate,
    GuildChannelCreate,
    DmChannelCreate,
    ChannelUpdate,
    GuildChannelUpdate,
    DmChannelUpdate,
    ChannelDelete,
    GuildChannelDelete,
    DmChannelDelete,
    ThreadCreate,
    ThreadUpdate,
    ThreadDelete,
    ThreadMemberAdd,
    ThreadMemberRemove,
    MessageCreate,
    GuildMessageCreate,
    DmMessageCreate,
    MessageUpdate,
    GuildMessageUpdate,
    DmMessageUpdate,
    MessageDelete,
    GuildMessageDelete,
    DmMessageDelete,
    MessageReactionAdd,
    MessageReactionRemove,
    MessageReactionRemoveAll,
    UserTypingStart,
    GuildVoiceStateUpdate,
    GuildVoiceJoin,
    GuildVoiceMove,
    GuildVoiceLeave,
    VoiceServerUpdate,
    InteractionCreate,
}

/// An immutable event as seen by listeners.
#[derive(Clone)]
pub struct Event {
    client: Client,
    sequence: u64,
    kind: EventKind,
}

impl Event {
    #[must_use]
    pub fn new(client: Client, sequence: u64, kind: impl Into<EventKind>) -> Self {
        Self {
            client,
            sequence,
            kind: kind.into(),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Sequence number of the originating gateway frame. Zero for events
    /// that did not come from the gateway.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Shorthand for `E::from_event(self)`.
    #[must_use]
    pub fn downcast<E: FromEvent>(&self) -> Option<E> {
        E::from_event(self)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("sequence", &self.sequence)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
