//! Native Google API client over reqwest.
//!
//! Token format is compatible with the `token.json` written by Python's
//! google-auth library, so an existing authorized token can be dropped in.
//! The consent flow itself is not handled here; tokens are only refreshed.
//!
//! Modules:
//! - calendar: Google Calendar API v3 event insert
//! - gmail: Gmail API v1 message send

pub mod calendar;
pub mod gmail;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Google OAuth2 scopes the token must carry.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/gmail.send",
];

// ============================================================================
// Token types (must be compatible with Python's google-auth token format)
// ============================================================================

/// OAuth2 token payload persisted as JSON.
///
/// Field names match what Python's `google.oauth2.credentials.Credentials.to_json()`
/// produces. Both `token` and `access_token` are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    #[serde(alias = "access_token")]
    pub token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Token expiry time (ISO 8601)
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default, alias = "email")]
    pub account: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token expired or revoked")]
    AuthExpired,
    #[error("Token not found at {0}")]
    TokenNotFound(PathBuf),
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GoogleApiError {
    /// Transport failures and 429/408/5xx statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            GoogleApiError::Http(e) => e.is_timeout() || e.is_connect(),
            GoogleApiError::ApiError { status, .. } => {
                *status == 429 || *status == 408 || *status >= 500
            }
            _ => false,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(500);

/// Wait before attempt `attempt + 1`: 500ms, then 1s.
fn backoff(attempt: u32) -> Duration {
    BACKOFF_STEP * attempt
}

/// POST `body` as JSON with a bearer token and decode the JSON reply.
///
/// Up to three attempts; only errors that [`GoogleApiError::is_retryable`]
/// accepts are tried again.
pub(crate) async fn post_json<B, R>(
    url: Url,
    access_token: &str,
    body: &B,
) -> Result<R, GoogleApiError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let client = reqwest::Client::new();
    let mut attempt = 1;
    loop {
        let sent = client
            .post(url.clone())
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await;
        let err = match sent {
            Ok(resp) if resp.status().is_success() => return Ok(resp.json().await?),
            Ok(resp) => error_for_response(resp).await,
            Err(e) => GoogleApiError::Http(e),
        };

        if attempt >= MAX_ATTEMPTS || !err.is_retryable() {
            return Err(err);
        }
        let delay = backoff(attempt);
        log::warn!(
            "POST {} failed on attempt {}/{}: {} (retrying in {:?})",
            url.path(),
            attempt,
            MAX_ATTEMPTS,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Map a non-success response to a typed error, consuming the body.
async fn error_for_response(resp: reqwest::Response) -> GoogleApiError {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return GoogleApiError::AuthExpired;
    }
    let body = resp.text().await.unwrap_or_default();
    GoogleApiError::ApiError {
        status: status.as_u16(),
        message: body,
    }
}

// ============================================================================
// Token I/O
// ============================================================================

pub fn load_token(path: &Path) -> Result<GoogleToken, GoogleApiError> {
    if !path.exists() {
        return Err(GoogleApiError::TokenNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_token(path: &Path, token: &GoogleToken) -> Result<(), GoogleApiError> {
    let json = serde_json::to_string_pretty(token)?;
    crate::util::atomic_write_str(path, &json)?;
    Ok(())
}

// ============================================================================
// Token refresh
// ============================================================================

/// Check if a token is expired based on its expiry field.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    match &token.expiry {
        None => true, // No expiry = assume expired, try refresh
        Some(expiry_str) => {
            // Python stores expiry as "2026-02-08T12:00:00.000000Z" or similar
            match chrono::DateTime::parse_from_rfc3339(&expiry_str.replace('Z', "+00:00"))
                .or_else(|_| chrono::DateTime::parse_from_rfc3339(expiry_str))
            {
                Ok(expiry) => {
                    // Consider expired if within 60 seconds of expiry
                    let now = chrono::Utc::now();
                    expiry <= now + chrono::Duration::seconds(60)
                }
                Err(_) => true,
            }
        }
    }
}

/// Refresh an access token and persist the updated token at `path`.
pub async fn refresh_access_token(
    path: &Path,
    token: &GoogleToken,
) -> Result<GoogleToken, GoogleApiError> {
    let refresh_token = token
        .refresh_token
        .as_ref()
        .ok_or(GoogleApiError::AuthExpired)?;

    let mut form = vec![
        ("client_id", token.client_id.as_str()),
        ("refresh_token", refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let client = reqwest::Client::new();
    let resp = client.post(&token.token_uri).form(&form).send().await?;
    let status = resp.status();
    let body_text = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(map_refresh_error(status.as_u16(), &body_text));
    }
    let body: serde_json::Value = serde_json::from_str(&body_text)?;

    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| GoogleApiError::RefreshFailed("No access_token in response".into()))?;

    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    let mut new_token = token.clone();
    new_token.token = access_token.to_string();
    new_token.expiry = Some(expiry.to_rfc3339());

    save_token(path, &new_token)?;
    log::info!("Refreshed Google access token (expires in {}s)", expires_in);

    Ok(new_token)
}

fn map_refresh_error(status: u16, body: &str) -> GoogleApiError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return GoogleApiError::AuthExpired;
    }
    GoogleApiError::RefreshFailed(format!("HTTP {}: {}", status, body))
}

/// Get a valid access token from `path`, refreshing if expired.
///
/// This is the entry point for all API calls.
pub async fn get_valid_access_token(path: &Path) -> Result<String, GoogleApiError> {
    let token = load_token(path)?;

    if is_token_expired(&token) {
        let refreshed = refresh_access_token(path, &token).await?;
        Ok(refreshed.token)
    } else {
        Ok(token.token)
    }
}

// ============================================================================
// Tests
// ============================================================================
