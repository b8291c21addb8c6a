use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderName};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::flow;
use crate::auth::{AuthMode, ClientConfig, Credentials};
use crate::error::{ApiError, ClientError};
use crate::events::{ClientEvent, EventBus, TokenPayload};

use super::http::{HttpClient, HttpResponse, ReqwestClient};
use super::query::{classify_id, IdKind, QueryParams};
use super::types::*;

const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Maximum refresh cycles before the session is treated as unrecoverable
const MAX_REFRESH_ATTEMPTS: u32 = 2;

/// Lifecycle of the client's credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    /// App mode, fetching a client-credentials token
    AwaitingToken,
    /// User mode, fetching the current user's profile
    AwaitingUser,
    Ready,
}

/// Filters and pass-through options for the streams endpoint
#[derive(Debug, Clone, Default)]
pub struct StreamsOptions {
    /// Channel filters, classified as numeric id or login per entry
    pub channels: Vec<String>,
    pub game_id: Option<String>,
    pub language: Option<String>,
    pub first: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Pass-through options for the bits leaderboard endpoint
#[derive(Debug, Clone, Default)]
pub struct BitsLeaderboardOptions {
    pub count: Option<u32>,
    pub period: Option<String>,
    pub started_at: Option<chrono::DateTime<Utc>>,
    pub user_id: Option<String>,
}

/// Raw options for the custom request passthrough
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: String,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    fn validate(&self) -> Result<(), ClientError> {
        const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
        if !METHODS.contains(&self.method.to_ascii_uppercase().as_str()) {
            return Err(ClientError::Validation(format!(
                "unsupported HTTP method: {}",
                self.method
            )));
        }
        Ok(())
    }
}

/// Twitch Helix API client
///
/// Generic over the HTTP client implementation for testability. Owns the
/// credential state and runs the validate-refresh-retry protocol on failing
/// dispatches.
pub struct TwitchClient<H: HttpClient = ReqwestClient> {
    http: H,
    credentials: Arc<RwLock<Credentials>>,
    state: Arc<RwLock<LifecycleState>>,
    user: Arc<RwLock<Option<User>>>,
    refresh_attempts: Arc<AtomicU32>,
    events: EventBus,
}

impl TwitchClient<ReqwestClient> {
    /// Creates a client with the default HTTP implementation
    ///
    /// Fails with `ClientError::Construction` when the config violates the
    /// credential invariant.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_http(config, ReqwestClient::new())
    }
}

impl<H: HttpClient> TwitchClient<H> {
    fn with_http(config: ClientConfig, http: H) -> Result<Self, ClientError> {
        let credentials = Credentials::from_config(config)?;
        Ok(Self {
            http,
            credentials: Arc::new(RwLock::new(credentials)),
            state: Arc::new(RwLock::new(LifecycleState::Uninitialized)),
            user: Arc::new(RwLock::new(None)),
            refresh_attempts: Arc::new(AtomicU32::new(0)),
            events: EventBus::new(),
        })
    }

    /// Returns a receiver for client events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Gets the current access token
    pub async fn access_token(&self) -> Option<String> {
        self.credentials.read().await.access_token.clone()
    }

    /// Gets the current lifecycle state
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Gets the login of the user fetched during user-mode initialization
    pub async fn user_login(&self) -> Option<String> {
        self.user.read().await.as_ref().map(|u| u.login.clone())
    }

    /// Gets the id of the user fetched during user-mode initialization
    pub async fn user_id(&self) -> Option<String> {
        self.user.read().await.as_ref().map(|u| u.id.clone())
    }

    /// Performs the initial token or profile fetch
    ///
    /// App mode requests a client-credentials token; user mode fetches the
    /// profile behind the supplied token. Emits `ClientEvent::Ready` once
    /// the fetch completes.
    pub async fn init(&self) -> Result<(), ClientError> {
        let mode = { self.credentials.read().await.mode };

        match mode {
            AuthMode::App => {
                *self.state.write().await = LifecycleState::AwaitingToken;

                let (client_id, secret) = {
                    let creds = self.credentials.read().await;
                    (creds.client_id.clone(), creds.client_secret.clone())
                };
                let secret = secret.ok_or_else(|| {
                    ClientError::Construction("app mode requires a client secret".to_string())
                })?;

                let token =
                    flow::client_credentials_grant(&self.http, &client_id, &secret).await?;

                let mut creds = self.credentials.write().await;
                creds.expires_at = Some(Utc::now() + Duration::seconds(token.expires_in));
                creds.access_token = Some(token.access_token);
            }
            AuthMode::User => {
                *self.state.write().await = LifecycleState::AwaitingUser;

                let user = self.fetch_current_user().await?;
                tracing::info!("authenticated as {}", user.login);
                *self.user.write().await = Some(user);
            }
        }

        *self.state.write().await = LifecycleState::Ready;
        self.events.emit(ClientEvent::Ready);
        Ok(())
    }
}

// Request dispatch and the refresh protocol
impl<H: HttpClient> TwitchClient<H> {
    /// Dispatches a request with auth headers, refreshing the token and
    /// retrying once when the server rejects it
    ///
    /// The failing response is surfaced unchanged when the validator still
    /// vouches for the current token, when the server reports the token
    /// itself as unusable, or when the retry also fails.
    async fn dispatch(
        &self,
        method: &str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let url = format!("{}{}", HELIX_BASE_URL, path);
        let mut retried = false;

        loop {
            let (client_id, token) = self.auth_state().await?;
            let headers = auth_headers(&client_id, &token);

            let response = if method == "GET" {
                self.http.get_response(&url, &headers).await
            } else {
                self.http.send_request(method, &url, &headers, body).await
            }
            .map_err(ClientError::Network)?;

            if response.is_success() {
                return Ok(response);
            }

            let api_error = ApiError::from_response(&response);
            tracing::warn!("{} {} failed: {}", method, path, api_error);
            self.events.emit(ClientEvent::Error(api_error.clone()));

            if api_error.is_token_rejection() {
                return Err(ClientError::AuthFatal(api_error.message));
            }

            if retried {
                return Err(ClientError::Http(api_error));
            }

            // A token the validator still vouches for means the failure was
            // not caused by auth; refreshing would not help.
            if flow::validate_token(&self.http, &token).await?.is_some() {
                return Err(ClientError::Http(api_error));
            }

            self.refresh_access_token().await?;
            retried = true;
        }
    }

    async fn auth_state(&self) -> Result<(String, String), ClientError> {
        let creds = self.credentials.read().await;
        let token = creds.access_token.clone().ok_or_else(|| {
            ClientError::Construction(
                "no access token held; app-mode clients acquire one during init".to_string(),
            )
        })?;
        Ok((creds.client_id.clone(), token))
    }

    /// Requests a new token and overwrites the in-memory credentials
    ///
    /// Bounded by the instance-lifetime attempt counter; the bound is a
    /// circuit breaker and never resets.
    async fn refresh_access_token(&self) -> Result<(), ClientError> {
        let attempts = self.refresh_attempts.fetch_add(1, Ordering::SeqCst);
        if attempts >= MAX_REFRESH_ATTEMPTS {
            return Err(ClientError::AuthFatal(format!(
                "token refresh attempted {} times; giving up",
                attempts
            )));
        }

        let mut creds = self.credentials.write().await;
        let token = match creds.mode {
            AuthMode::App => {
                let secret = creds.client_secret.as_deref().ok_or_else(|| {
                    ClientError::AuthFatal(
                        "client secret required for the client-credentials grant".to_string(),
                    )
                })?;
                flow::client_credentials_grant(&self.http, &creds.client_id, secret).await?
            }
            AuthMode::User => {
                let refresh = creds
                    .refresh_token
                    .as_deref()
                    .ok_or_else(|| ClientError::from(flow::AuthError::NoRefreshToken))?;
                flow::refresh_grant(
                    &self.http,
                    &creds.client_id,
                    creds.client_secret.as_deref(),
                    refresh,
                )
                .await?
            }
        };

        tracing::info!("access token refreshed (attempt {})", attempts + 1);

        creds.access_token = Some(token.access_token.clone());
        if token.refresh_token.is_some() {
            creds.refresh_token = token.refresh_token.clone();
        }
        creds.expires_at = Some(Utc::now() + Duration::seconds(token.expires_in));
        drop(creds);

        self.events.emit(ClientEvent::TokenRefreshed(TokenPayload {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        }));

        Ok(())
    }

    async fn get_api<T: DeserializeOwned + Send>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.dispatch("GET", path, None).await?;
        response.json().map_err(ClientError::Network)
    }

    /// Makes an authenticated GET request and returns the raw parsed body
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let path = normalize_path(path);
        let response = self.dispatch("GET", &path, None).await?;
        parse_body(&response)
    }

    /// Makes an authenticated POST request and returns the raw parsed body
    ///
    /// Runs the same validate-refresh-retry protocol as GET.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let path = normalize_path(path);
        let response = self.dispatch("POST", &path, Some(body)).await?;
        parse_body(&response)
    }

    /// Performs a raw request with caller-supplied options
    ///
    /// Auth headers and the base URL are injected and the leading slash is
    /// normalized, but failures are only logged; no refresh is attempted.
    pub async fn send(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, ClientError> {
        options.validate()?;
        if path.trim().is_empty() {
            return Err(ClientError::Validation(
                "request path must not be empty".to_string(),
            ));
        }

        let path = normalize_path(path);
        let url = format!("{}{}", HELIX_BASE_URL, path);

        let (client_id, token) = self.auth_state().await?;
        let mut headers = auth_headers(&client_id, &token);
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::Validation(format!("invalid header name: {}", e)))?;
            let value = value
                .parse()
                .map_err(|_| ClientError::Validation(format!("invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        let method = options.method.to_ascii_uppercase();
        let response = self
            .http
            .send_request(&method, &url, &headers, options.body.as_ref())
            .await
            .map_err(ClientError::Network)?;

        if !response.is_success() {
            let api_error = ApiError::from_response(&response);
            tracing::warn!("{} {} failed: {}", method, path, api_error);
            return Err(ClientError::Http(api_error));
        }

        parse_body(&response)
    }
}

// User-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// Gets users by id or login
    ///
    /// Each identifier is classified by the id sniffer and mapped to `id=`
    /// or `login=` in input order.
    pub async fn get_users(&self, ids: &[&str]) -> Result<UsersResponse, ClientError> {
        let mut query = QueryParams::new();
        for id in ids {
            match classify_id(id) {
                IdKind::Id => query.push("id", id),
                IdKind::Login => query.push("login", id),
            }
        }

        self.get_api(&format!("/users{}", query.build())).await
    }

    /// Gets the profile behind the current user token
    ///
    /// App tokens are not tied to a user, so this always fails on an
    /// app-mode instance.
    pub async fn get_current_user(&self) -> Result<User, ClientError> {
        if self.credentials.read().await.mode == AuthMode::App {
            return Err(ClientError::Construction(
                "an app access token is not tied to a user; user-mode credentials are required"
                    .to_string(),
            ));
        }

        self.fetch_current_user().await
    }

    async fn fetch_current_user(&self) -> Result<User, ClientError> {
        let response: UsersResponse = self.get_api("/users").await?;
        response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Network(anyhow::anyhow!("user profile response was empty")))
    }
}

// Stream-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// Gets streams matching the given filters
    ///
    /// Pagination is passed through; callers manage cursors themselves.
    pub async fn get_streams(
        &self,
        options: StreamsOptions,
    ) -> Result<StreamsResponse, ClientError> {
        let mut query = QueryParams::new();
        for channel in &options.channels {
            match classify_id(channel) {
                IdKind::Id => query.push("user_id", channel),
                IdKind::Login => query.push("user_login", channel),
            }
        }
        query.push_opt("game_id", options.game_id.as_deref());
        query.push_opt("language", options.language.as_deref());
        query.push_opt("first", options.first.map(|f| f.to_string()).as_deref());
        query.push_opt("after", options.after.as_deref());
        query.push_opt("before", options.before.as_deref());

        self.get_api(&format!("/streams{}", query.build())).await
    }
}

// Channel-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// Gets channels a user follows, one page per call
    pub async fn get_followed_channels(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<FollowedChannelsResponse, ClientError> {
        let mut query = QueryParams::new();
        query.push("user_id", user_id);
        query.push_opt("after", cursor);

        self.get_api(&format!("/channels/followed{}", query.build()))
            .await
    }

    /// Gets a broadcaster's subscriptions, one page per call
    ///
    /// Requires a user token with the broadcaster's authorization.
    pub async fn get_broadcaster_subscriptions(
        &self,
        broadcaster_id: &str,
        cursor: Option<&str>,
    ) -> Result<SubscriptionsResponse, ClientError> {
        let mut query = QueryParams::new();
        query.push("broadcaster_id", broadcaster_id);
        query.push_opt("after", cursor);

        self.get_api(&format!("/subscriptions{}", query.build()))
            .await
    }
}

// Bits-related methods
impl<H: HttpClient> TwitchClient<H> {
    /// Gets the bits leaderboard for the authorized broadcaster
    ///
    /// Requires a user token.
    pub async fn get_bits_leaderboard(
        &self,
        options: BitsLeaderboardOptions,
    ) -> Result<BitsLeaderboardResponse, ClientError> {
        let mut query = QueryParams::new();
        query.push_opt("count", options.count.map(|c| c.to_string()).as_deref());
        query.push_opt("period", options.period.as_deref());
        query.push_opt(
            "started_at",
            options.started_at.map(|t| t.to_rfc3339()).as_deref(),
        );
        query.push_opt("user_id", options.user_id.as_deref());

        self.get_api(&format!("/bits/leaderboard{}", query.build()))
            .await
    }
}

fn auth_headers(client_id: &str, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        format!("Bearer {}", token).parse().unwrap(),
    );
    headers.insert("Client-Id", client_id.parse().unwrap());
    headers
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn parse_body(response: &HttpResponse) -> Result<serde_json::Value, ClientError> {
    if response.body.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    response.json().map_err(ClientError::Network)
}

/// Test-only constructor for dependency injection
#[cfg(test)]
impl<H: HttpClient> TwitchClient<H> {
    /// Creates a client with a custom HTTP implementation
    pub fn with_http_client(config: ClientConfig, http: H) -> Result<Self, ClientError> {
        Self::with_http(config, http)
    }
}
