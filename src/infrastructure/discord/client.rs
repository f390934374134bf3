//! REST adapter over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{
    AuditLogPayload, ChannelPayload, ErrorResponse, MemberPayload, MessageCreateRequest,
    MessagePayload, MessageUpdateRequest, RateLimitResponse, RolePayload, UserPayload,
};
use crate::domain::entities::{ChannelId, GuildId, MessageId, RoleId, UserId};
use crate::domain::errors::{RestError, RestResult};
use crate::domain::ports::RestPort;

pub const API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!("gatecord (", env!("CARGO_PKG_REPOSITORY"), ", ", env!("CARGO_PKG_VERSION"), ")");

#[derive(Debug, Serialize)]
struct CreateDmRequest {
    recipient_id: UserId,
}

/// [`RestPort`] backed by `reqwest`. Requests are sent as-is: no retries and
/// no rate limit bookkeeping.
pub struct HttpRestClient {
    client: Client,
    base_url: String,
    authorization: String,
}

impl HttpRestClient {
    /// Creates a client for a bot token.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(token: &str) -> RestResult<Self> {
        Self::with_base_url(token, API_BASE)
    }

    /// Creates a client against a custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(token: &str, base_url: impl Into<String>) -> RestResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RestError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: format!("Bot {token}"),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(header::AUTHORIZATION, &self.authorization)
    }

    async fn send(&self, route: &str, request: RequestBuilder) -> RestResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            warn!(route, error = %e, "REST request failed");
            if e.is_timeout() {
                RestError::network("request timed out")
            } else if e.is_connect() {
                RestError::network("failed to connect to API")
            } else {
                RestError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = Self::handle_error_response(status, response).await;
            warn!(route, status = status.as_u16(), error = %error, "REST request rejected");
            return Err(error);
        }
        debug!(route, status = status.as_u16(), "REST request succeeded");
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, route: &str, request: RequestBuilder) -> RestResult<T> {
        let response = self.send(route, request).await?;
        response.json().await.map_err(|e| {
            warn!(route, error = %e, "Failed to parse REST response");
            RestError::decode(e.to_string())
        })
    }

    async fn empty(&self, route: &str, request: RequestBuilder) -> RestResult<()> {
        self.send(route, request).await.map(|_| ())
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> RestError {
        let body = response.bytes().await.unwrap_or_default();
        error_for_status(status, &body)
    }
}

/// Maps a non-success response onto [`RestError`].
fn error_for_status(status: StatusCode, body: &[u8]) -> RestError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_ms = serde_json::from_slice::<RateLimitResponse>(body)
            .map_or(5000, |limit| (limit.retry_after * 1000.0).ceil() as u64);
        return RestError::RateLimited { retry_after_ms };
    }

    let message = serde_json::from_slice::<ErrorResponse>(body)
        .map_or_else(|_| format!("HTTP {status}"), |error| error.message);

    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            RestError::network("API is temporarily unavailable")
        }
        _ => RestError::api(status.as_u16(), message),
    }
}

#[async_trait]
impl RestPort for HttpRestClient {
    async fn get_user(&self, user_id: UserId) -> RestResult<UserPayload> {
        self.json("get_user", self.request(Method::GET, &format!("/users/{user_id}")))
            .await
    }

    async fn get_member(&self, guild_id: GuildId, user_id: UserId) -> RestResult<MemberPayload> {
        let path = format!("/guilds/{guild_id}/members/{user_id}");
        self.json("get_member", self.request(Method::GET, &path)).await
    }

    async fn get_channel(&self, channel_id: ChannelId) -> RestResult<ChannelPayload> {
        let path = format!("/channels/{channel_id}");
        self.json("get_channel", self.request(Method::GET, &path)).await
    }

    async fn create_message(
        &self,
        channel_id: ChannelId,
        request: MessageCreateRequest,
    ) -> RestResult<MessagePayload> {
        let path = format!("/channels/{channel_id}/messages");
        self.json("create_message", self.request(Method::POST, &path).json(&request))
            .await
    }

    async fn update_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        request: MessageUpdateRequest,
    ) -> RestResult<MessagePayload> {
        let path = format!("/channels/{channel_id}/messages/{message_id}");
        self.json("update_message", self.request(Method::PATCH, &path).json(&request))
            .await
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> RestResult<()> {
        let path = format!("/channels/{channel_id}/messages/{message_id}");
        self.empty("delete_message", self.request(Method::DELETE, &path))
            .await
    }

    async fn create_dm(&self, recipient_id: UserId) -> RestResult<ChannelPayload> {
        let body = CreateDmRequest { recipient_id };
        self.json(
            "create_dm",
            self.request(Method::POST, "/users/@me/channels").json(&body),
        )
        .await
    }

    async fn get_roles(&self, guild_id: GuildId) -> RestResult<Vec<RolePayload>> {
        let path = format!("/guilds/{guild_id}/roles");
        self.json("get_roles", self.request(Method::GET, &path)).await
    }

    async fn get_audit_log(&self, guild_id: GuildId, limit: u8) -> RestResult<AuditLogPayload> {
        let path = format!("/guilds/{guild_id}/audit-logs");
        self.json(
            "get_audit_log",
            self.request(Method::GET, &path).query(&[("limit", limit.clamp(1, 100))]),
        )
        .await
    }

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> RestResult<()> {
        let path = format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}");
        self.empty("add_member_role", self.request(Method::PUT, &path))
            .await
    }
}

impl std::fmt::Debug for HttpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
