//! The client handle shared by events, listeners and entity navigation.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::oneshot;

use crate::application::events::FromEvent;
use crate::application::services::collector::Collector;
use crate::application::services::entity_builder::{CacheStrategy, EntityBuilder};
use crate::application::services::event_manager::{EventListener, EventManager};
use crate::application::services::member_chunking::MemberChunkingManager;
use crate::domain::connection::ConnectionStatus;
use crate::domain::entities::{
    ApplicationId, AuditLog, Channel, ChannelId, GuildId, InteractionResponse, Member, Message,
    MessageId, Role, RoleId, SelfUser, User, UserId,
};
use crate::domain::errors::{GatewayError, RestError, RestResult};
use crate::domain::intents::GatewayIntents;
use crate::domain::ports::{GatewayCommand, GatewayPort, RestPort};
use crate::infrastructure::cache::{CachePolicy, Caches};
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::discord::dto::{MessageCreateRequest, MessageUpdateRequest};

struct ClientInner {
    config: ClientConfig,
    caches: Caches,
    event_manager: EventManager,
    chunking: MemberChunkingManager,
    gateway: Option<Arc<dyn GatewayPort>>,
    rest: Option<Arc<dyn RestPort>>,
    self_user: RwLock<Option<Arc<SelfUser>>>,
    application_id: RwLock<Option<ApplicationId>>,
}

/// Cheaply clonable handle to the client state.
#[derive(Clone)]
pub struct Client(Arc<ClientInner>);

impl Client {
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.0.config
    }

    #[must_use]
    pub fn caches(&self) -> &Caches {
        &self.0.caches
    }

    #[must_use]
    pub fn event_manager(&self) -> &EventManager {
        &self.0.event_manager
    }

    #[must_use]
    pub fn chunking(&self) -> &MemberChunkingManager {
        &self.0.chunking
    }

    #[must_use]
    pub fn entity_builder(&self) -> EntityBuilder<'_> {
        EntityBuilder::new(self)
    }

    #[must_use]
    pub fn gateway(&self) -> Option<&Arc<dyn GatewayPort>> {
        self.0.gateway.as_ref()
    }

    #[must_use]
    pub fn rest(&self) -> Option<&Arc<dyn RestPort>> {
        self.0.rest.as_ref()
    }

    /// Status of the attached gateway; `Disconnected` without one.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.0
            .gateway
            .as_ref()
            .map_or(ConnectionStatus::Disconnected, |gateway| gateway.status())
    }

    /// Intents of the attached gateway, or the configured hint.
    #[must_use]
    pub fn intents(&self) -> GatewayIntents {
        self.0
            .gateway
            .as_ref()
            .map_or(self.0.config.intents, |gateway| gateway.intents())
    }

    #[must_use]
    pub fn self_user(&self) -> Option<Arc<SelfUser>> {
        self.0.self_user.read().clone()
    }

    /// Id of the connected account.
    #[must_use]
    pub fn self_user_id(&self) -> Option<UserId> {
        self.0.self_user.read().as_ref().map(|user| user.id())
    }

    /// Replaces the self user, returning the previous one.
    pub(crate) fn set_self_user(&self, self_user: Arc<SelfUser>) -> Option<Arc<SelfUser>> {
        self.0.self_user.write().replace(self_user)
    }

    #[must_use]
    pub fn application_id(&self) -> Option<ApplicationId> {
        *self.0.application_id.read()
    }

    pub(crate) fn set_application_id(&self, application_id: ApplicationId) {
        *self.0.application_id.write() = Some(application_id);
    }

    pub fn add_event_listeners<I>(&self, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn EventListener>>,
    {
        self.0.event_manager.add_event_listeners(listeners);
    }

    pub fn remove_event_listeners(&self, listeners: &[Arc<dyn EventListener>]) {
        self.0.event_manager.remove_event_listeners(listeners);
    }

    /// Entry point for frames received over the gateway.
    pub async fn handle_gateway(&self, event_type: &str, sequence: u64, payload: &[u8]) {
        self.0
            .event_manager
            .handle_gateway(self, event_type, sequence, payload)
            .await;
    }

    /// Entry point for interactions received over HTTP. The response is sent
    /// on `reply`.
    pub async fn handle_http(&self, reply: oneshot::Sender<InteractionResponse>, payload: &[u8]) {
        self.0.event_manager.handle_http(self, reply, payload).await;
    }

    /// Starts collecting events of type `E` that pass `filter`.
    #[must_use]
    pub fn collector<E, F>(&self, filter: F) -> Collector<E>
    where
        E: FromEvent,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Collector::new(self, filter)
    }

    /// Resolves with the first event of type `E` that passes `filter`.
    pub async fn wait_for<E, F>(&self, filter: F) -> Option<E>
    where
        E: FromEvent,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let mut collector = self.collector(filter);
        let event = collector.next().await;
        collector.teardown();
        event
    }

    fn rest_port(&self) -> RestResult<&Arc<dyn RestPort>> {
        self.0.rest.as_ref().ok_or(RestError::NotConfigured)
    }

    fn gateway_port(&self) -> Result<&Arc<dyn GatewayPort>, GatewayError> {
        self.0
            .gateway
            .as_ref()
            .ok_or_else(GatewayError::not_connected)
    }

    /// Fetches a user over REST.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn fetch_user(&self, user_id: UserId) -> RestResult<Arc<User>> {
        let payload = self.rest_port()?.get_user(user_id).await?;
        Ok(self
            .entity_builder()
            .create_user(&payload, CacheStrategy::NoWs))
    }

    /// Fetches a guild member over REST.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn fetch_member(&self, guild_id: GuildId, user_id: UserId) -> RestResult<Arc<Member>> {
        let payload = self.rest_port()?.get_member(guild_id, user_id).await?;
        if payload.user.is_none() {
            return Err(RestError::unexpected("member payload without user"));
        }
        Ok(self
            .entity_builder()
            .create_member(guild_id, &payload, None, CacheStrategy::NoWs))
    }

    /// Fetches a channel over REST.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if the request fails or the channel type is unknown.
    pub async fn fetch_channel(&self, channel_id: ChannelId) -> RestResult<Arc<Channel>> {
        let payload = self.rest_port()?.get_channel(channel_id).await?;
        self.entity_builder()
            .create_channel(&payload, None, CacheStrategy::NoWs)
            .map_err(|e| RestError::unexpected(e.to_string()))
    }

    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn send_message(
        &self,
        channel_id: ChannelId,
        request: MessageCreateRequest,
    ) -> RestResult<Arc<Message>> {
        let payload = self
            .rest_port()?
            .create_message(channel_id, request)
            .await?;
        Ok(self
            .entity_builder()
            .create_message(&payload, CacheStrategy::NoWs))
    }

    /// Edits a message.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        request: MessageUpdateRequest,
    ) -> RestResult<Arc<Message>> {
        let payload = self
            .rest_port()?
            .update_message(channel_id, message_id, request)
            .await?;
        Ok(self
            .entity_builder()
            .create_message(&payload, CacheStrategy::NoWs))
    }

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> RestResult<()> {
        self.rest_port()?
            .delete_message(channel_id, message_id)
            .await
    }

    /// Opens (or reuses) the DM channel with a user.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if the request fails or the channel is not a DM.
    pub async fn open_dm(&self, recipient_id: UserId) -> RestResult<Arc<Channel>> {
        let payload = self.rest_port()?.create_dm(recipient_id).await?;
        self.entity_builder()
            .create_channel(&payload, None, CacheStrategy::NoWs)
            .map_err(|e| RestError::unexpected(e.to_string()))
    }

    /// Fetches every role of a guild.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn fetch_roles(&self, guild_id: GuildId) -> RestResult<Vec<Arc<Role>>> {
        let payloads = self.rest_port()?.get_roles(guild_id).await?;
        let builder = self.entity_builder();
        Ok(payloads
            .iter()
            .map(|payload| builder.create_role(guild_id, payload, CacheStrategy::NoWs))
            .collect())
    }

    /// Fetches the most recent audit log entries of a guild.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn fetch_audit_log(&self, guild_id: GuildId, limit: u8) -> RestResult<AuditLog> {
        let payload = self.rest_port()?.get_audit_log(guild_id, limit).await?;
        Ok(self
            .entity_builder()
            .create_audit_log(guild_id, &payload, CacheStrategy::NoWs))
    }

    /// Grants a role to a member.
    ///
    /// # Errors
    ///
    /// Returns `RestError` if no REST port is attached or the request fails.
    pub async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> RestResult<()> {
        self.rest_port()?
            .add_member_role(guild_id, user_id, role_id)
            .await
    }

    /// Joins, moves within or leaves (`channel_id: None`) voice in a guild.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if no gateway is attached or the send fails.
    pub async fn update_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
        self_mute: bool,
        self_deaf: bool,
    ) -> Result<(), GatewayError> {
        self.gateway_port()?
            .send(GatewayCommand::UpdateVoiceState {
                guild_id,
                channel_id,
                self_mute,
                self_deaf,
            })
            .await
    }

    /// Leaves voice in a guild.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if no gateway is attached or the send fails.
    pub async fn disconnect_voice(&self, guild_id: GuildId) -> Result<(), GatewayError> {
        self.update_voice_state(guild_id, None, false, false).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.0.config)
            .field("caches", &self.0.caches)
            .field("gateway", &self.0.gateway.is_some())
            .field("rest", &self.0.rest.is_some())
            .field("self_user_id", &self.self_user_id())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    gateway: Option<Arc<dyn GatewayPort>>,
    rest: Option<Arc<dyn RestPort>>,
    member_policy: Option<CachePolicy<Member>>,
    message_policy: Option<CachePolicy<Message>>,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl ClientBuilder {
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn GatewayPort>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    #[must_use]
    pub fn with_rest(mut self, rest: Arc<dyn RestPort>) -> Self {
        self.rest = Some(rest);
        self
    }

    #[must_use]
    pub fn with_member_cache_policy(mut self, policy: CachePolicy<Member>) -> Self {
        self.member_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_message_cache_policy(mut self, policy: CachePolicy<Message>) -> Self {
        self.message_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_event_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    #[must_use]
    pub fn build(self) -> Client {
        let caches = Caches::with_policies(
            self.config.cache_flags,
            self.member_policy.unwrap_or_default(),
            self.message_policy.unwrap_or_default(),
        );
        let event_manager = EventManager::new(self.config.async_events, self.config.raw_events);
        event_manager.add_event_listeners(self.listeners);

        Client(Arc::new(ClientInner {
            config: self.config,
            caches,
            event_manager,
            chunking: MemberChunkingManager::new(),
            gateway: self.gateway,
            rest: self.rest,
            self_user: RwLock::new(None),
            application_id: RwLock::new(None),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::{MockGateway, MockRestPort};
    use crate::infrastructure::discord::dto::UserPayload;
    use mockall::predicate::eq;

    fn user_payload(id: u64) -> UserPayload {
        serde_json::from_value(serde_json::json!({ "id": id.to_string(), "username": "fetched" }))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_user_caches_only_with_gateway() {
        let mut rest = MockRestPort::new();
        rest.expect_get_user()
            .with(eq(UserId(7)))
            .times(2)
            .returning(|id| Ok(user_payload(id.as_u64())));
        let rest: Arc<dyn RestPort> = Arc::new(rest);

        let offline = Client::builder().with_rest(Arc::clone(&rest)).build();
        let user = offline.fetch_user(UserId(7)).await.unwrap();
        assert_eq!(user.username(), "fetched");
        assert!(offline.caches().users().get(&UserId(7)).is_none());

        let online = Client::builder()
            .with_rest(rest)
            .with_gateway(Arc::new(MockGateway::new(GatewayIntents::non_privileged())))
            .build();
        online.fetch_user(UserId(7)).await.unwrap();
        assert!(online.caches().users().get(&UserId(7)).is_some());
    }

    #[tokio::test]
    async fn test_rest_errors_are_returned() {
        let mut rest = MockRestPort::new();
        rest.expect_delete_message()
            .returning(|_, _| Err(RestError::api(404, "Unknown Message")));
        let client = Client::builder().with_rest(Arc::new(rest)).build();

        let result = client.delete_message(ChannelId(1), MessageId(2)).await;
        assert!(result.unwrap_err().is_not_found());

        let bare = Client::builder().build();
        assert!(matches!(
            bare.fetch_user(UserId(1)).await,
            Err(RestError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_fetch_member_without_user_is_rejected() {
        let mut rest = MockRestPort::new();
        rest.expect_get_member().returning(|_, _| {
            Ok(serde_json::from_value(serde_json::json!({ "roles": [] })).unwrap())
        });
        let client = Client::builder().with_rest(Arc::new(rest)).build();

        let result = client.fetch_member(GuildId(1), UserId(2)).await;
        assert!(matches!(result, Err(RestError::Unexpected { .. })));
    }

    #[tokio::test]
    async fn test_voice_commands() {
        let gateway = Arc::new(MockGateway::new(GatewayIntents::non_privileged()));
        let client = Client::builder().with_gateway(gateway.clone()).build();

        client
            .update_voice_state(GuildId(1), Some(ChannelId(2)), true, false)
            .await
            .unwrap();
        client.disconnect_voice(GuildId(1)).await.unwrap();

        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1],
            GatewayCommand::UpdateVoiceState {
                guild_id: GuildId(1),
                channel_id: None,
                self_mute: false,
                self_deaf: false,
            }
        );

        let detached = Client::builder().build();
        assert!(matches!(
            detached.disconnect_voice(GuildId(1)).await,
            Err(GatewayError::NotConnected)
        ));
    }

    #[test]
    fn test_intents_fall_back_to_config() {
        let config = ClientConfig::default().with_intents(GatewayIntents::new());
        let client = Client::builder().with_config(config).build();
        assert_eq!(client.intents(), GatewayIntents::new());
        assert_eq!(client.connection_status(), ConnectionStatus::Disconnected);
    }
}
