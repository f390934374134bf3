//! Wire payload to domain entity conversion.
//!
//! Every entity in the crate is created here. Each `create_*` resolves nested
//! sub-payloads first (a member without a user gets the surrounding user
//! spliced in) and then stores the result according to a [`CacheStrategy`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::Client;
use crate::domain::entities::{
    Attachment, AuditLog, AuditLogChange, AuditLogEntry, Channel, ChannelId, ChannelKind,
    DmChannel, Embed, Emoji, EmojiId, ForumTag, Guild, GuildCategoryChannel, GuildChannelFields,
    GuildForumChannel, GuildId, GuildTextChannel, GuildThread, GuildVoiceChannel, Interaction,
    InteractionData, InteractionKind, Member, Message, MessageFlags, MessageKind,
    MessageReference, Reaction, ReactionEmoji, ResolvedData, Role, RoleTags, SelfUser,
    ThreadMember, ThreadMetadata, UnknownChannelKind, User, UserFlags, UserId, VoiceState,
};
use crate::infrastructure::discord::dto::{
    AuditLogPayload, ChannelPayload, EmojiPayload, GuildPayload, InteractionPayload,
    MemberPayload, MessagePayload, PartialEmojiPayload, ResolvedPayload, RolePayload,
    ThreadMemberPayload, UserPayload, VoiceStatePayload,
};

/// Whether a freshly built entity goes into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    Yes,
    No,
    /// Cache only while the gateway is connected; used for REST results,
    /// which would otherwise never be invalidated.
    NoWs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    UnknownChannelKind(#[from] UnknownChannelKind),
    #[error("unknown interaction type {0}")]
    UnknownInteractionKind(u8),
}

/// Borrowed view over a [`Client`] that builds entities.
pub struct EntityBuilder<'a> {
    client: &'a Client,
}

impl<'a> EntityBuilder<'a> {
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn should_cache(&self, strategy: CacheStrategy) -> bool {
        match strategy {
            CacheStrategy::Yes => true,
            CacheStrategy::No => false,
            CacheStrategy::NoWs => self.client.connection_status().is_connected(),
        }
    }

    pub fn create_user(&self, payload: &UserPayload, strategy: CacheStrategy) -> Arc<User> {
        let user = build_user(payload);
        if self.should_cache(strategy) {
            self.client.caches().put_user(user)
        } else {
            Arc::new(user)
        }
    }

    /// Builds the connected account and installs it on the client.
    pub fn create_self_user(&self, payload: &UserPayload) -> Arc<SelfUser> {
        let user = self.create_user(payload, CacheStrategy::Yes);
        let self_user = Arc::new(SelfUser {
            user: (*user).clone(),
            mfa_enabled: payload.mfa_enabled,
            verified: payload.verified,
            locale: payload.locale.clone(),
        });
        self.client.set_self_user(Arc::clone(&self_user));
        self_user
    }

    /// Builds the guild itself. Nested collections are left to the caller.
    pub fn create_guild(&self, payload: &GuildPayload, strategy: CacheStrategy) -> Arc<Guild> {
        let guild = Guild {
            id: payload.id,
            name: payload.name.clone(),
            icon: payload.icon.clone(),
            description: payload.description.clone(),
            owner_id: payload.owner_id,
            afk_channel_id: payload.afk_channel_id,
            system_channel_id: payload.system_channel_id,
            verification_level: payload.verification_level.into(),
            premium_tier: payload.premium_tier.into(),
            features: payload.features.clone(),
            member_count: payload.member_count,
            large: payload.large,
            unavailable: payload.unavailable,
            joined_at: payload.joined_at,
        };
        if self.should_cache(strategy) {
            self.client.caches().put_guild(guild)
        } else {
            Arc::new(guild)
        }
    }

    /// Builds a member of `guild_id`. `outer_user` is spliced in when the
    /// member payload carries no user of its own.
    ///
    /// # Panics
    ///
    /// Panics if neither the payload nor `outer_user` provides a user. The
    /// dispatcher catches the panic and drops the event.
    pub fn create_member(
        &self,
        guild_id: GuildId,
        payload: &MemberPayload,
        outer_user: Option<&UserPayload>,
        strategy: CacheStrategy,
    ) -> Arc<Member> {
        let Some(member) = build_member(guild_id, payload, outer_user) else {
            panic!("member payload for guild {guild_id} has no user to resolve");
        };
        if self.should_cache(strategy) {
            self.create_user_from(&member.user);
            self.client.caches().put_member(member)
        } else {
            Arc::new(member)
        }
    }

    fn create_user_from(&self, user: &User) {
        self.client.caches().put_user(user.clone());
    }

    pub fn create_role(
        &self,
        guild_id: GuildId,
        payload: &RolePayload,
        strategy: CacheStrategy,
    ) -> Arc<Role> {
        let role = build_role(guild_id, payload);
        if self.should_cache(strategy) {
            self.client.caches().put_role(role)
        } else {
            Arc::new(role)
        }
    }

    /// Builds a channel of any kind. Guild channels nested in a guild payload
    /// omit their guild id, so it can be passed in.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownChannelKind` for a type this crate does
    /// not model.
    pub fn create_channel(
        &self,
        payload: &ChannelPayload,
        guild_id: Option<GuildId>,
        strategy: CacheStrategy,
    ) -> Result<Arc<Channel>, BuildError> {
        let mut channel = build_channel(payload, guild_id)?;

        // a rebuilt voice channel keeps the members already connected to it
        if let Some(voice) = channel.as_audio_channel_mut()
            && let Some(cached) = self.client.caches().channels().get(&payload.id)
            && let Some(cached_voice) = cached.as_audio_channel()
        {
            voice
                .connected_member_ids
                .clone_from(&cached_voice.connected_member_ids);
        }

        if !self.should_cache(strategy) {
            return Ok(Arc::new(channel));
        }
        for recipient in &payload.recipients {
            self.create_user(recipient, strategy);
        }
        Ok(self.client.caches().put_channel(channel))
    }

    pub fn create_thread_member(
        &self,
        thread_id: ChannelId,
        user_id: UserId,
        payload: &ThreadMemberPayload,
        strategy: CacheStrategy,
    ) -> Arc<ThreadMember> {
        let thread_member = ThreadMember {
            thread_id: payload.id.unwrap_or(thread_id),
            user_id,
            join_timestamp: payload.join_timestamp,
            flags: payload.flags,
        };
        if self.should_cache(strategy) {
            self.client.caches().put_thread_member(thread_member)
        } else {
            Arc::new(thread_member)
        }
    }

    /// Builds a voice state. An embedded member is built and cached
    /// alongside.
    pub fn create_voice_state(
        &self,
        guild_id: GuildId,
        payload: &VoiceStatePayload,
        strategy: CacheStrategy,
    ) -> Arc<VoiceState> {
        let guild_id = payload.guild_id.unwrap_or(guild_id);
        let voice_state = VoiceState {
            guild_id,
            channel_id: payload.channel_id,
            user_id: payload.user_id,
            session_id: payload.session_id.clone(),
            deaf: payload.deaf,
            mute: payload.mute,
            self_deaf: payload.self_deaf,
            self_mute: payload.self_mute,
            self_stream: payload.self_stream,
            self_video: payload.self_video,
            suppress: payload.suppress,
            request_to_speak_timestamp: payload.request_to_speak_timestamp,
        };
        let stored = if self.should_cache(strategy) {
            self.client.caches().put_voice_state(voice_state)
        } else {
            Arc::new(voice_state)
        };

        // stored first so an in-voice member policy sees the new state
        if let Some(member) = payload.member.as_ref().filter(|m| m.user.is_some()) {
            self.create_member(guild_id, member, None, strategy);
        }
        stored
    }

    /// Builds an emoji. Unicode emojis have no id and are never cached.
    pub fn create_emoji(
        &self,
        guild_id: GuildId,
        payload: &EmojiPayload,
        strategy: CacheStrategy,
    ) -> Arc<Emoji> {
        let emoji = Emoji {
            id: payload.id.unwrap_or_default(),
            guild_id,
            name: payload.name.clone().unwrap_or_default(),
            role_ids: payload.roles.clone(),
            creator: payload.user.as_ref().map(build_user),
            require_colons: payload.require_colons,
            managed: payload.managed,
            animated: payload.animated,
            available: payload.available,
        };
        if payload.id.is_some() && self.should_cache(strategy) {
            self.client.caches().put_emoji(emoji)
        } else {
            Arc::new(emoji)
        }
    }

    /// Builds a message. A guild message's member gets the author spliced in
    /// and the member's user becomes the displayed author.
    pub fn create_message(&self, payload: &MessagePayload, strategy: CacheStrategy) -> Arc<Message> {
        let message = build_message(payload);
        if !self.should_cache(strategy) {
            return Arc::new(message);
        }

        self.create_user_from(&message.author);
        for mention in &message.mentions {
            self.create_user_from(mention);
        }
        if let Some(member) = &message.member {
            self.client.caches().put_member(member.clone());
        }
        self.client.caches().put_message(message)
    }

    /// Builds an interaction with all of its resolved data. Interactions
    /// themselves are never cached.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::UnknownInteractionKind` for an unsupported type.
    ///
    /// # Panics
    ///
    /// Panics if the payload carries neither a user nor a member with a user.
    pub fn create_interaction(
        &self,
        payload: &InteractionPayload,
        strategy: CacheStrategy,
    ) -> Result<Arc<Interaction>, BuildError> {
        let kind = InteractionKind::try_from(payload.kind)
            .map_err(BuildError::UnknownInteractionKind)?;

        let member = match (payload.guild_id, &payload.member) {
            (Some(guild_id), Some(member)) => Some(self.create_member(
                guild_id,
                member,
                payload.user.as_ref(),
                strategy,
            )),
            _ => None,
        };
        let user = match (&member, &payload.user) {
            (Some(member), _) => member.user.clone(),
            (None, Some(user)) => (*self.create_user(user, strategy)).clone(),
            (None, None) => panic!("interaction {} has no invoking user", payload.id),
        };

        let data = payload.data.as_ref().map(|data| InteractionData {
            name: data.name.clone(),
            custom_id: data.custom_id.clone(),
            options: data.options.clone(),
            resolved: data
                .resolved
                .as_ref()
                .map(|resolved| self.create_resolved(payload.guild_id, resolved, strategy))
                .unwrap_or_default(),
        });

        Ok(Arc::new(Interaction {
            id: payload.id,
            application_id: payload.application_id,
            kind,
            token: payload.token.clone(),
            version: payload.version,
            guild_id: payload.guild_id,
            channel_id: payload.channel_id,
            member: member.map(|member| (*member).clone()),
            user,
            data,
            message: payload
                .message
                .as_ref()
                .map(|message| (*self.create_message(message, strategy)).clone()),
            locale: payload.locale.clone(),
            guild_locale: payload.guild_locale.clone(),
        }))
    }

    fn create_resolved(
        &self,
        guild_id: Option<GuildId>,
        payload: &ResolvedPayload,
        strategy: CacheStrategy,
    ) -> ResolvedData {
        let users = payload
            .users
            .iter()
            .map(|(id, user)| (*id, (*self.create_user(user, strategy)).clone()))
            .collect();

        // resolved members carry their user in the sibling map
        let members = guild_id
            .map(|guild_id| {
                payload
                    .members
                    .iter()
                    .filter_map(|(id, member)| {
                        let user = payload.users.get(id);
                        let member = build_member(guild_id, member, user)?;
                        let member = if self.should_cache(strategy) {
                            self.client.caches().put_member(member)
                        } else {
                            Arc::new(member)
                        };
                        Some((*id, (*member).clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let roles = guild_id
            .map(|guild_id| {
                payload
                    .roles
                    .iter()
                    .map(|(id, role)| (*id, (*self.create_role(guild_id, role, strategy)).clone()))
                    .collect()
            })
            .unwrap_or_default();

        let channels = payload
            .channels
            .iter()
            .filter_map(|(id, channel)| match build_channel(channel, guild_id) {
                Ok(channel) => Some((*id, channel)),
                Err(e) => {
                    debug!(channel_id = %id, error = %e, "Skipping resolved channel");
                    None
                }
            })
            .collect();

        let messages = payload
            .messages
            .iter()
            .map(|(id, message)| (*id, (*self.create_message(message, strategy)).clone()))
            .collect();

        ResolvedData {
            users,
            members,
            roles,
            channels,
            messages,
        }
    }

    /// Builds an audit log page together with the users and threads it
    /// references.
    pub fn create_audit_log(
        &self,
        guild_id: GuildId,
        payload: &AuditLogPayload,
        strategy: CacheStrategy,
    ) -> AuditLog {
        let users = payload
            .users
            .iter()
            .map(|user| (user.id, (*self.create_user(user, strategy)).clone()))
            .collect();

        let threads = payload
            .threads
            .iter()
            .filter_map(|thread| {
                self.create_channel(thread, Some(guild_id), strategy)
                    .map_err(|e| debug!(channel_id = %thread.id, error = %e, "Skipping audit log thread"))
                    .ok()
                    .map(|channel| (thread.id, (*channel).clone()))
            })
            .collect::<HashMap<_, _>>();

        let entries = payload
            .audit_log_entries
            .iter()
            .map(|entry| AuditLogEntry {
                id: entry.id,
                guild_id,
                user_id: entry.user_id,
                target_id: entry.target_id.map(|id| id.as_u64()),
                action_type: entry.action_type,
                changes: entry
                    .changes
                    .iter()
                    .map(|change| AuditLogChange {
                        key: change.key.clone(),
                        old_value: change.old_value.clone(),
                        new_value: change.new_value.clone(),
                    })
                    .collect(),
                reason: entry.reason.clone(),
            })
            .collect();

        AuditLog {
            guild_id,
            entries,
            users,
            threads,
        }
    }
}

fn build_user(payload: &UserPayload) -> User {
    User {
        id: payload.id,
        username: payload.username.clone(),
        discriminator: payload.discriminator.clone(),
        global_name: payload.global_name.clone(),
        avatar: payload.avatar.clone(),
        banner: payload.banner.clone(),
        accent_color: payload.accent_color,
        bot: payload.bot,
        system: payload.system,
        public_flags: UserFlags::from_bits_retain(payload.public_flags),
    }
}

fn build_member(
    guild_id: GuildId,
    payload: &MemberPayload,
    outer_user: Option<&UserPayload>,
) -> Option<Member> {
    let user = payload.user.as_ref().or(outer_user)?;
    Some(Member {
        guild_id,
        user: build_user(user),
        nick: payload.nick.clone(),
        avatar: payload.avatar.clone(),
        role_ids: payload.roles.clone(),
        joined_at: payload.joined_at,
        premium_since: payload.premium_since,
        communication_disabled_until: payload.communication_disabled_until,
        deaf: payload.deaf,
        mute: payload.mute,
        pending: payload.pending,
    })
}

fn build_role(guild_id: GuildId, payload: &RolePayload) -> Role {
    Role {
        id: payload.id,
        guild_id,
        name: payload.name.clone(),
        color: payload.color,
        hoist: payload.hoist,
        icon: payload.icon.clone(),
        unicode_emoji: payload.unicode_emoji.clone(),
        position: payload.position,
        permissions: payload.permissions,
        managed: payload.managed,
        mentionable: payload.mentionable,
        tags: payload.tags.as_ref().map(|tags| RoleTags {
            bot_id: tags.bot_id.map(|id| id.as_u64()),
            integration_id: tags.integration_id.map(|id| id.as_u64()),
            premium_subscriber: tags.premium_subscriber,
        }),
    }
}

fn build_channel(payload: &ChannelPayload, guild_id: Option<GuildId>) -> Result<Channel, BuildError> {
    let kind = ChannelKind::try_from(payload.kind)?;
    let fields = || GuildChannelFields {
        id: payload.id,
        guild_id: payload.guild_id.or(guild_id).unwrap_or_default(),
        name: payload.name.clone().unwrap_or_default(),
        position: payload.position,
        parent_id: payload.parent_id,
        nsfw: payload.nsfw,
    };
    let text = || GuildTextChannel {
        fields: fields(),
        topic: payload.topic.clone(),
        last_message_id: payload.last_message_id,
        rate_limit_per_user: payload.rate_limit_per_user,
    };
    let voice = || GuildVoiceChannel {
        fields: fields(),
        bitrate: payload.bitrate,
        user_limit: payload.user_limit,
        rtc_region: payload.rtc_region.clone(),
        topic: payload.topic.clone(),
        last_message_id: payload.last_message_id,
        connected_member_ids: HashSet::new(),
    };

    Ok(match kind {
        ChannelKind::GuildText => Channel::GuildText(text()),
        ChannelKind::GuildNews => Channel::GuildNews(text()),
        ChannelKind::Dm => Channel::Dm(DmChannel {
            id: payload.id,
            recipient_id: payload.recipients.first().map(|user| user.id),
            last_message_id: payload.last_message_id,
        }),
        ChannelKind::GuildVoice => Channel::GuildVoice(voice()),
        ChannelKind::GuildStageVoice => Channel::GuildStageVoice(voice()),
        ChannelKind::GuildCategory => Channel::GuildCategory(GuildCategoryChannel { fields: fields() }),
        ChannelKind::NewsThread | ChannelKind::PublicThread | ChannelKind::PrivateThread => {
            Channel::GuildThread(GuildThread {
                fields: fields(),
                kind,
                owner_id: payload.owner_id,
                last_message_id: payload.last_message_id,
                message_count: payload.message_count,
                member_count: payload.member_count,
                rate_limit_per_user: payload.rate_limit_per_user,
                metadata: payload
                    .thread_metadata
                    .as_ref()
                    .map(|meta| ThreadMetadata {
                        archived: meta.archived,
                        auto_archive_duration: meta.auto_archive_duration,
                        archive_timestamp: meta.archive_timestamp,
                        locked: meta.locked,
                        invitable: meta.invitable,
                    })
                    .unwrap_or_default(),
            })
        }
        ChannelKind::GuildForum => Channel::GuildForum(GuildForumChannel {
            fields: fields(),
            topic: payload.topic.clone(),
            available_tags: payload
                .available_tags
                .iter()
                .map(|tag| ForumTag {
                    id: tag.id.as_u64(),
                    name: tag.name.clone(),
                    moderated: tag.moderated,
                    emoji_name: tag.emoji_name.clone(),
                })
                .collect(),
            last_message_id: payload.last_message_id,
        }),
    })
}

pub(crate) fn build_reaction_emoji(payload: &PartialEmojiPayload) -> ReactionEmoji {
    ReactionEmoji {
        id: payload.id.filter(|id| *id != EmojiId::default()),
        name: payload.name.clone(),
        animated: payload.animated,
    }
}

fn build_message(payload: &MessagePayload) -> Message {
    let member = payload
        .guild_id
        .zip(payload.member.as_ref())
        .and_then(|(guild_id, member)| build_member(guild_id, member, Some(&payload.author)));
    let author = member
        .as_ref()
        .map_or_else(|| build_user(&payload.author), |member| member.user.clone());

    Message {
        id: payload.id,
        channel_id: payload.channel_id,
        guild_id: payload.guild_id,
        author,
        member,
        content: payload.content.clone(),
        kind: MessageKind::from(payload.kind),
        timestamp: payload.timestamp,
        edited_timestamp: payload.edited_timestamp,
        tts: payload.tts,
        mention_everyone: payload.mention_everyone,
        mentions: payload.mentions.iter().map(build_user).collect(),
        mention_role_ids: payload.mention_roles.clone(),
        attachments: payload
            .attachments
            .iter()
            .map(|attachment| Attachment {
                id: attachment.id.as_u64(),
                filename: attachment.filename.clone(),
                size: attachment.size,
                url: attachment.url.clone(),
                content_type: attachment.content_type.clone(),
            })
            .collect(),
        embeds: payload
            .embeds
            .iter()
            .map(|embed| Embed {
                title: embed.title.clone(),
                description: embed.description.clone(),
                url: embed.url.clone(),
                color: embed.color,
            })
            .collect(),
        reactions: payload
            .reactions
            .iter()
            .map(|reaction| Reaction {
                emoji: build_reaction_emoji(&reaction.emoji),
                count: reaction.count,
                me: reaction.me,
            })
            .collect(),
        pinned: payload.pinned,
        webhook_id: payload.webhook_id.map(|id| id.as_u64()),
        flags: MessageFlags::from_bits_retain(payload.flags),
        message_reference: payload.message_reference.map(|reference| MessageReference {
            message_id: reference.message_id,
            channel_id: reference.channel_id,
            guild_id: reference.guild_id,
        }),
    }
}
