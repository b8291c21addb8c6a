use chrono::{DateTime, Utc};

use crate::error::ClientError;

/// Construction-time configuration
///
/// Credentials must be resolvable from this config alone; there is no
/// process-wide fallback.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Requests an app token via the client-credentials grant instead of
    /// using a supplied user token
    pub app_mode: bool,
}

/// How the client authenticates against the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Client-credentials grant, public data only
    App,
    /// Externally obtained user token
    User,
}

/// In-memory credential state, mutated in place when a refresh succeeds
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub mode: AuthMode,
    /// Advisory expiry derived from the last token or validate response
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Validates the construction invariant and builds the credential state
    ///
    /// Exactly one of {app mode with no access token} or {user mode with an
    /// access token} is accepted.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        if config.client_id.is_empty() {
            return Err(ClientError::Construction(
                "a client id is required".to_string(),
            ));
        }

        if config.app_mode {
            if config.access_token.is_some() {
                return Err(ClientError::Construction(
                    "app mode acquires its token via the client-credentials grant; \
                     supplying an access token conflicts with it"
                        .to_string(),
                ));
            }
            if config.client_secret.is_none() {
                return Err(ClientError::Construction(
                    "app mode requires a client secret".to_string(),
                ));
            }
        } else if config.access_token.is_none() {
            return Err(ClientError::Construction(
                "user mode requires an externally obtained access token".to_string(),
            ));
        }

        Ok(Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            access_token: config.access_token,
            refresh_token: config.refresh_token,
            mode: if config.app_mode {
                AuthMode::App
            } else {
                AuthMode::User
            },
            expires_at: None,
        })
    }

    /// Checks whether the held token is past its advisory expiry
    ///
    /// An unknown expiry counts as not expired; the server remains the
    /// authority through the validation endpoint.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }
}
