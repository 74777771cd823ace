//! Gmail API v1: send a plain-text message.
//!
//! The message is an RFC 2822 document, URL-safe base64 encoded into the
//! `raw` field of `users/me/messages/send`.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::Deserialize;
use url::Url;

use super::{post_json, GoogleApiError};

const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    id: String,
}

/// Render a minimal RFC 2822 message with CRLF line endings.
pub fn build_rfc2822(to: &str, subject: &str, body: &str) -> Result<String, GoogleApiError> {
    if to.contains(['\r', '\n']) || subject.contains(['\r', '\n']) {
        return Err(GoogleApiError::InvalidRequest(
            "header values must not contain line breaks".to_string(),
        ));
    }
    let body = body.replace("\r\n", "\n").replace('\n', "\r\n");
    Ok(format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        to, subject, body
    ))
}

/// Encode a message for the `raw` field.
pub fn encode_raw(message: &str) -> String {
    URL_SAFE.encode(message.as_bytes())
}

/// Send a message. Returns the Gmail message id.
pub async fn send_message(
    access_token: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<String, GoogleApiError> {
    let raw = encode_raw(&build_rfc2822(to, subject, body)?);
    let sent: SendResponse = post_json(
        Url::parse(SEND_URL)?,
        access_token,
        &serde_json::json!({ "raw": raw }),
    )
    .await?;
    log::debug!("Gmail accepted message {}", sent.id);
    Ok(sent.id)
}
