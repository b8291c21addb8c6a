use serde::Deserialize;

use crate::twitch::http::HttpResponse;

/// Error payload built from a failing API response
///
/// Mirrors the Helix error body where one is present; otherwise the raw
/// response text is carried in `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub error: Option<String>,
    pub status: u16,
    pub message: String,
}

/// Error body shape returned by Helix and the OAuth host
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Builds an error from any response with status >= 400
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(body) => Self {
                error: body.error,
                status: response.status,
                message: body.message.unwrap_or_else(|| response.body.clone()),
            },
            Err(_) => Self {
                error: None,
                status: response.status,
                message: response.body.clone(),
            },
        }
    }

    /// Whether the server message indicates the token itself was rejected
    ///
    /// This class of failure cannot be repaired by a refresh.
    pub fn is_token_rejection(&self) -> bool {
        self.message
            .to_ascii_lowercase()
            .contains("missing authorization token")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            Some(error) => write!(f, "{} {}: {}", self.status, error, self.message),
            None => write!(f, "{}: {}", self.status, self.message),
        }
    }
}

/// Client errors
///
/// `Construction` and `AuthFatal` are unrecoverable; `Http` is retried once
/// through the refresh protocol before it reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    Construction(String),
    #[error("authentication is unrecoverable: {0}")]
    AuthFatal(String),
    #[error("API error {0}")]
    Http(ApiError),
    #[error("invalid request options: {0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(#[source] anyhow::Error),
}
