//! Boundary error type and the single classification site.
//!
//! The backend reports failures three ways: an identity-API JSON body with
//! `error_code`/`msg`/`error_description`, a row-API JSON body with a
//! PostgREST `code`, or a bare transport failure. All of them funnel
//! through [`ClientError::from_response`] / [`ClientError::from_transport`]
//! and come out carrying a typed [`ErrorKind`].

use kampos_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status, when the backend answered at all.
    pub status: Option<u16>,
}

impl ClientError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// The degraded stub fails every operation with this.
    #[must_use]
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Degraded, reason.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Classify a transport-level failure (DNS, connect, TLS, reset).
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() || err.is_request() {
            ErrorKind::Network
        } else {
            ErrorKind::Backend
        };
        Self::new(kind, err.to_string())
    }

    /// Classify a non-success response from either API surface.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).unwrap_or_default();

        let code = parsed
            .get("error_code")
            .or_else(|| parsed.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let message = parsed
            .get("error_description")
            .or_else(|| parsed.get("msg"))
            .or_else(|| parsed.get("message"))
            .or_else(|| parsed.get("error"))
            .and_then(|v| v.as_str())
            .map_or_else(|| fallback_message(status, body), str::to_string);

        let kind = classify(status, code, &message);
        Self {
            kind,
            message,
            status: Some(status),
        }
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("backend returned status {status}")
    } else {
        let mut text = body.trim().to_string();
        text.truncate(200);
        text
    }
}

/// The one place where backend codes and message text become a kind.
fn classify(status: u16, code: &str, message: &str) -> ErrorKind {
    // Structured codes first: identity API error_code, PostgREST code.
    match code {
        "PGRST116" => return ErrorKind::NoRows,
        "23505" | "user_already_exists" | "email_exists" => return ErrorKind::AlreadyRegistered,
        "42501" => return ErrorKind::PolicyViolation,
        "invalid_credentials" => return ErrorKind::InvalidCredentials,
        _ => {}
    }

    // Older backend versions only speak through the message.
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid login credentials") {
        return ErrorKind::InvalidCredentials;
    }
    if lower.contains("already registered") || lower.contains("already been registered") {
        return ErrorKind::AlreadyRegistered;
    }
    if lower.contains("invalid api key") || lower.contains("no api key found") {
        return ErrorKind::InvalidApiKey;
    }
    if lower.contains("row-level security") {
        return ErrorKind::PolicyViolation;
    }

    match status {
        401 | 403 => ErrorKind::InvalidApiKey,
        _ => ErrorKind::Backend,
    }
}
