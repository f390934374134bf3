//! Correlates bulk member requests with the chunks answering them.
//!
//! A request registers a random nonce, sends `REQUEST_GUILD_MEMBERS` and
//! receives members on a channel as `GUILD_MEMBERS_CHUNK` events carrying
//! that nonce arrive. The channel closes after the last chunk or on cancel.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::Client;
use crate::domain::entities::{GuildId, Member, UserId};
use crate::domain::errors::ChunkingError;
use crate::domain::intents::GatewayIntent;
use crate::domain::ports::{GatewayCommand, RequestGuildMembers};
use crate::infrastructure::discord::gateway::payloads::GuildMembersChunkPayload;

/// Nonces are capped at this many characters by the platform.
pub const NONCE_LENGTH: usize = 32;

pub type MemberFilter = Arc<dyn Fn(&Member) -> bool + Send + Sync>;
type NonceSource = Box<dyn Fn() -> String + Send + Sync>;
type RequestTable = Arc<RwLock<HashMap<String, Arc<ChunkRequest>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Sent, no chunk yet.
    Pending,
    Receiving,
    Complete,
    Cancelled,
}

struct RequestInner {
    state: ChunkState,
    sink: Option<mpsc::UnboundedSender<Arc<Member>>>,
}

struct ChunkRequest {
    guild_id: GuildId,
    filter: Option<MemberFilter>,
    inner: Mutex<RequestInner>,
}

impl ChunkRequest {
    fn state(&self) -> ChunkState {
        self.inner.lock().state
    }

    /// Closes the sink. Returns false if it was already closed.
    fn close(&self, state: ChunkState) -> bool {
        let mut inner = self.inner.lock();
        let open = inner.sink.take().is_some();
        if open {
            inner.state = state;
        }
        open
    }
}

/// Receiving side of a member request.
pub type MemberReceiver = mpsc::UnboundedReceiver<Arc<Member>>;

/// Cancels one member request. Idempotent, and safe while chunks are still
/// arriving.
#[derive(Clone)]
pub struct ChunkCancel {
    nonce: String,
    request: Arc<ChunkRequest>,
    requests: RequestTable,
}

impl ChunkCancel {
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    #[must_use]
    pub fn state(&self) -> ChunkState {
        self.request.state()
    }

    pub fn cancel(&self) {
        {
            // the nonce may already belong to a newer request
            let mut requests = self.requests.write();
            if requests
                .get(&self.nonce)
                .is_some_and(|live| Arc::ptr_eq(live, &self.request))
            {
                requests.remove(&self.nonce);
            }
        }
        if self.request.close(ChunkState::Cancelled) {
            debug!(nonce = %self.nonce, "Member request cancelled");
        }
    }
}

impl fmt::Debug for ChunkCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkCancel").field("nonce", &self.nonce).finish()
    }
}

fn random_nonce() -> String {
    let mut nonce = uuid::Uuid::new_v4().simple().to_string();
    nonce.truncate(NONCE_LENGTH);
    nonce
}

pub struct MemberChunkingManager {
    requests: RequestTable,
    nonce_source: NonceSource,
}

impl Default for MemberChunkingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberChunkingManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_nonce_source(random_nonce)
    }

    /// Uses `source` to generate nonces. Collisions with live requests are
    /// retried.
    #[must_use]
    pub fn with_nonce_source<F>(source: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            nonce_source: Box::new(source),
        }
    }

    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.requests.read().len()
    }

    /// Members with the given ids, collected until the last chunk.
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_members(
        &self,
        client: &Client,
        guild_id: GuildId,
        user_ids: Vec<UserId>,
    ) -> Result<Vec<Arc<Member>>, ChunkingError> {
        let (receiver, cancel) = self.request_members_chan(client, guild_id, user_ids).await?;
        Self::collect(receiver, cancel).await
    }

    /// Members whose username starts with `query`, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_members_with_query(
        &self,
        client: &Client,
        guild_id: GuildId,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Arc<Member>>, ChunkingError> {
        let (receiver, cancel) = self
            .request_members_with_query_chan(client, guild_id, query, limit)
            .await?;
        Self::collect(receiver, cancel).await
    }

    /// Every member of the guild.
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_all_members(
        &self,
        client: &Client,
        guild_id: GuildId,
    ) -> Result<Vec<Arc<Member>>, ChunkingError> {
        let (receiver, cancel) = self.request_all_members_chan(client, guild_id).await?;
        Self::collect(receiver, cancel).await
    }

    /// Every member of the guild that passes `filter`. Rejected members are
    /// dropped without notice.
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_members_with_filter<F>(
        &self,
        client: &Client,
        guild_id: GuildId,
        filter: F,
    ) -> Result<Vec<Arc<Member>>, ChunkingError>
    where
        F: Fn(&Member) -> bool + Send + Sync + 'static,
    {
        let (receiver, cancel) = self
            .request_members_with_filter_chan(client, guild_id, filter)
            .await?;
        Self::collect(receiver, cancel).await
    }

    /// Streaming variant of [`Self::request_members`].
    ///
    /// # Errors
    ///
    /// `NoGateway` without an attached gateway, `MissingIntent` without the
    /// guild members intent, `Gateway` if the command cannot be sent.
    pub async fn request_members_chan(
        &self,
        client: &Client,
        guild_id: GuildId,
        user_ids: Vec<UserId>,
    ) -> Result<(MemberReceiver, ChunkCancel), ChunkingError> {
        self.request(client, guild_id, None, 0, user_ids, None)
            .await
    }

    /// Streaming variant of [`Self::request_members_with_query`].
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_members_with_query_chan(
        &self,
        client: &Client,
        guild_id: GuildId,
        query: &str,
        limit: u32,
    ) -> Result<(MemberReceiver, ChunkCancel), ChunkingError> {
        self.request(client, guild_id, Some(query.to_string()), limit, Vec::new(), None)
            .await
    }

    /// Streaming variant of [`Self::request_all_members`].
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_all_members_chan(
        &self,
        client: &Client,
        guild_id: GuildId,
    ) -> Result<(MemberReceiver, ChunkCancel), ChunkingError> {
        self.request(client, guild_id, None, 0, Vec::new(), None)
            .await
    }

    /// Streaming variant of [`Self::request_members_with_filter`].
    ///
    /// # Errors
    ///
    /// See [`Self::request_members_chan`].
    pub async fn request_members_with_filter_chan<F>(
        &self,
        client: &Client,
        guild_id: GuildId,
        filter: F,
    ) -> Result<(MemberReceiver, ChunkCancel), ChunkingError>
    where
        F: Fn(&Member) -> bool + Send + Sync + 'static,
    {
        self.request(client, guild_id, None, 0, Vec::new(), Some(Arc::new(filter)))
            .await
    }

    async fn request(
        &self,
        client: &Client,
        guild_id: GuildId,
        query: Option<String>,
        limit: u32,
        user_ids: Vec<UserId>,
        filter: Option<MemberFilter>,
    ) -> Result<(MemberReceiver, ChunkCancel), ChunkingError> {
        let gateway = client.gateway().ok_or(ChunkingError::NoGateway)?;
        if !gateway.intents().has(GatewayIntent::GuildMembers) {
            return Err(ChunkingError::MissingIntent);
        }

        let (sink, receiver) = mpsc::unbounded_channel();
        let request = Arc::new(ChunkRequest {
            guild_id,
            filter,
            inner: Mutex::new(RequestInner {
                state: ChunkState::Pending,
                sink: Some(sink),
            }),
        });
        let nonce = self.register(Arc::clone(&request));
        let cancel = ChunkCancel {
            nonce: nonce.clone(),
            request,
            requests: Arc::clone(&self.requests),
        };

        let command = GatewayCommand::RequestGuildMembers(RequestGuildMembers {
            guild_id,
            query,
            limit,
            presences: false,
            user_ids,
            nonce: nonce.clone(),
        });
        if let Err(e) = gateway.send(command).await {
            cancel.cancel();
            return Err(e.into());
        }

        debug!(guild_id = %guild_id, nonce = %nonce, "Member request sent");
        Ok((receiver, cancel))
    }

    /// Inserts `request` under a nonce no live request uses.
    fn register(&self, request: Arc<ChunkRequest>) -> String {
        let mut requests = self.requests.write();
        loop {
            let nonce = (self.nonce_source)();
            if !requests.contains_key(&nonce) {
                requests.insert(nonce.clone(), request);
                return nonce;
            }
        }
    }

    async fn collect(
        mut receiver: MemberReceiver,
        cancel: ChunkCancel,
    ) -> Result<Vec<Arc<Member>>, ChunkingError> {
        let mut members = Vec::new();
        while let Some(member) = receiver.recv().await {
            members.push(member);
        }
        match cancel.state() {
            ChunkState::Cancelled => Err(ChunkingError::Cancelled),
            _ => Ok(members),
        }
    }

    /// Forwards the members of one chunk to the request it answers. Chunks
    /// with an unknown or missing nonce are ignored.
    pub fn handle_chunk(&self, chunk: &GuildMembersChunkPayload, members: &[Arc<Member>]) {
        let Some(nonce) = chunk.nonce.as_deref() else {
            return;
        };
        let Some(request) = self.requests.read().get(nonce).cloned() else {
            debug!(nonce, guild_id = %chunk.guild_id, "Chunk for unknown member request");
            return;
        };
        if request.guild_id != chunk.guild_id {
            debug!(nonce, guild_id = %chunk.guild_id, "Chunk guild does not match request");
            return;
        }

        {
            let mut inner = request.inner.lock();
            if let Some(sink) = &inner.sink {
                for member in members {
                    if request.filter.as_ref().is_none_or(|filter| filter(member)) {
                        // a dropped receiver only means nobody listens anymore
                        let _ = sink.send(Arc::clone(member));
                    }
                }
                inner.state = ChunkState::Receiving;
            }
        }

        if chunk.is_last() {
            self.requests.write().remove(nonce);
            request.close(ChunkState::Complete);
            debug!(
                nonce,
                guild_id = %chunk.guild_id,
                chunks = chunk.chunk_count,
                "Member request complete"
            );
        }
    }
}

impl fmt::Debug for MemberChunkingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberChunkingManager")
            .field("pending_requests", &self.pending_requests())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::member::fixtures::member;
    use crate::domain::intents::GatewayIntents;
    use crate::domain::ports::mocks::MockGateway;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chunk(nonce: &str, index: u32, count: u32) -> GuildMembersChunkPayload {
        GuildMembersChunkPayload {
            guild_id: GuildId(1),
            members: Vec::new(),
            chunk_index: index,
            chunk_count: count,
            not_found: Vec::new(),
            nonce: Some(nonce.to_string()),
        }
    }

    fn client_with(gateway: Arc<MockGateway>) -> Client {
        Client::builder().with_gateway(gateway).build()
    }

    #[test]
    fn test_random_nonce_length() {
        assert_eq!(random_nonce().len(), NONCE_LENGTH);
        assert_ne!(random_nonce(), random_nonce());
    }

    #[test]
    fn test_register_retries_colliding_nonces() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = {
            let calls = Arc::clone(&calls);
            MemberChunkingManager::with_nonce_source(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                // first two calls collide
                if n < 2 { "same".to_string() } else { format!("n{n}") }
            })
        };
        let request = || {
            Arc::new(ChunkRequest {
                guild_id: GuildId(1),
                filter: None,
                inner: Mutex::new(RequestInner {
                    state: ChunkState::Pending,
                    sink: None,
                }),
            })
        };

        assert_eq!(manager.register(request()), "same");
        assert_eq!(manager.register(request()), "n2");
        assert_eq!(manager.pending_requests(), 2);
    }

    #[tokio::test]
    async fn test_request_without_intent_fails() {
        let gateway = Arc::new(MockGateway::new(GatewayIntents::non_privileged()));
        let client = client_with(gateway.clone());

        let result = client
            .chunking()
            .request_all_members_chan(&client, GuildId(1))
            .await;

        assert!(matches!(result, Err(ChunkingError::MissingIntent)));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_request_without_gateway_fails() {
        let client = Client::builder().build();
        let result = client
            .chunking()
            .request_members(&client, GuildId(1), vec![UserId(2)])
            .await;
        assert!(matches!(result, Err(ChunkingError::NoGateway)));
    }

    #[tokio::test]
    async fn test_send_failure_deregisters() {
        let gateway = Arc::new(MockGateway::failing(
            GatewayIntents::non_privileged().with_members(),
        ));
        let client = client_with(gateway);

        let result = client
            .chunking()
            .request_all_members_chan(&client, GuildId(1))
            .await;

        assert!(matches!(result, Err(ChunkingError::Gateway(_))));
        assert_eq!(client.chunking().pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_chunks_close_after_last_with_filter() {
        let gateway = Arc::new(MockGateway::new(
            GatewayIntents::non_privileged().with_members(),
        ));
        let client = client_with(gateway.clone());
        let chunking = client.chunking();

        let (mut receiver, cancel) = chunking
            .request_members_with_filter_chan(&client, GuildId(1), |member| {
                member.user_id().as_u64() % 2 == 0
            })
            .await
            .unwrap();

        let sent = gateway.sent();
        let GatewayCommand::RequestGuildMembers(request) = &sent[0] else {
            panic!("expected a member request");
        };
        assert_eq!(request.nonce, cancel.nonce());

        let first = [Arc::new(member(1, 2, "a")), Arc::new(member(1, 3, "b"))];
        let second = [Arc::new(member(1, 4, "c"))];
        chunking.handle_chunk(&chunk(cancel.nonce(), 0, 2), &first);
        chunking.handle_chunk(&chunk(cancel.nonce(), 1, 2), &second);
        // arrives after completion and is ignored
        chunking.handle_chunk(&chunk(cancel.nonce(), 1, 2), &second);

        let mut received = Vec::new();
        while let Some(member) = receiver.recv().await {
            received.push(member.user_id());
        }
        assert_eq!(received, vec![UserId(2), UserId(4)]);
        assert_eq!(chunking.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_closes_channel() {
        let gateway = Arc::new(MockGateway::new(
            GatewayIntents::non_privileged().with_members(),
        ));
        let client = client_with(gateway);
        let chunking = client.chunking();

        let (mut receiver, cancel) = chunking
            .request_all_members_chan(&client, GuildId(1))
            .await
            .unwrap();
        chunking.handle_chunk(&chunk(cancel.nonce(), 0, 3), &[Arc::new(member(1, 2, "a"))]);

        cancel.cancel();
        cancel.cancel();
        chunking.handle_chunk(&chunk(cancel.nonce(), 1, 3), &[Arc::new(member(1, 3, "b"))]);

        assert_eq!(receiver.recv().await.unwrap().user_id(), UserId(2));
        assert!(receiver.recv().await.is_none());
        assert_eq!(chunking.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_distinct_nonces() {
        let gateway = Arc::new(MockGateway::new(
            GatewayIntents::non_privileged().with_members(),
        ));
        let client = client_with(gateway.clone());

        let (first, second) = tokio::join!(
            client.chunking().request_all_members_chan(&client, GuildId(1)),
            client.chunking().request_all_members_chan(&client, GuildId(1)),
        );
        let (_, first) = first.unwrap();
        let (_, second) = second.unwrap();

        assert_ne!(first.nonce(), second.nonce());
        assert_eq!(gateway.sent().len(), 2);
        assert_eq!(client.chunking().pending_requests(), 2);
    }
}
