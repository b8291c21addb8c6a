use serde::Deserialize;

use crate::error::ClientError;
use crate::twitch::http::HttpClient;

pub(crate) const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub(crate) const VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";

/// Token endpoint errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("no refresh token held")]
    NoRefreshToken,
    #[error("network error: {0}")]
    Network(#[from] anyhow::Error),
    #[error("failed to parse token response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<AuthError> for ClientError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Network(e) => ClientError::Network(e),
            AuthError::Parse(e) => ClientError::Network(e.into()),
            other => ClientError::AuthFatal(other.to_string()),
        }
    }
}

/// Response from the token endpoint for both grant types
///
/// The client-credentials grant returns no refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response from token validation
///
/// App tokens are not tied to a user, so `login` and `user_id` are absent
/// for them.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    pub client_id: String,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub expires_in: i64,
}

/// Requests an app token via the client-credentials grant
pub(crate) async fn client_credentials_grant<H: HttpClient>(
    http: &H,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse, AuthError> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", "client_credentials"),
    ];

    request_token(http, &params).await
}

/// Exchanges a refresh token for a new user token
pub(crate) async fn refresh_grant<H: HttpClient>(
    http: &H,
    client_id: &str,
    client_secret: Option<&str>,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let mut params = vec![
        ("client_id", client_id),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = client_secret {
        params.push(("client_secret", secret));
    }

    request_token(http, &params).await
}

async fn request_token<H: HttpClient>(
    http: &H,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = http.post_form(TOKEN_URL, params).await?;

    if !response.is_success() {
        return Err(AuthError::Rejected {
            status: response.status,
            body: response.body,
        });
    }

    Ok(serde_json::from_str(&response.body)?)
}

/// Validates an access token against the OAuth host
///
/// The status code is the verdict: a successful response returns the parsed
/// token metadata, anything else reports the token as invalid.
pub(crate) async fn validate_token<H: HttpClient>(
    http: &H,
    access_token: &str,
) -> Result<Option<ValidateResponse>, AuthError> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(value) = format!("OAuth {}", access_token).parse() {
        headers.insert("Authorization", value);
    }

    let response = http.get_response(VALIDATE_URL, &headers).await?;

    if !response.is_success() {
        tracing::debug!("token validation returned {}", response.status);
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&response.body)?))
}
