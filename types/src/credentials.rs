//! Credential pair: backend endpoint URL plus API key(s).
//!
//! Invariants are enforced at construction: the URL must be HTTPS and both
//! URL and keys must be free of unresolved `{{ }}` deploy-time placeholders.
//! A value still carrying those markers means the deploy substitution step
//! never ran; treating it as a credential would only fail later and worse.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keys shorter than this cannot be real backend keys.
pub const MIN_API_KEY_LEN: usize = 20;

/// True when `value` still carries unresolved deploy-time template markers.
#[must_use]
pub fn contains_placeholder(value: &str) -> bool {
    value.contains("{{") || value.contains("}}")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("backend URL must not be empty")]
    EmptyUrl,
    #[error("backend URL must start with https:// (got {0})")]
    NotHttps(String),
    #[error("backend URL contains an unresolved deploy placeholder")]
    UrlPlaceholder,
    #[error("API key must be longer than {MIN_API_KEY_LEN} characters (got {0})")]
    KeyTooShort(usize),
    #[error("API key contains an unresolved deploy placeholder")]
    KeyPlaceholder,
}

/// HTTPS endpoint of the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendUrl(String);

impl BackendUrl {
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyUrl);
        }
        if contains_placeholder(trimmed) {
            return Err(CredentialError::UrlPlaceholder);
        }
        if !trimmed.starts_with("https://") && !is_loopback_http(trimmed) {
            return Err(CredentialError::NotHttps(trimmed.to_string()));
        }
        // Canonical form without a trailing slash so joins stay predictable.
        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the loopback carve-out; callers use it to pick a transport
    /// that tolerates plain HTTP.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        is_loopback_http(&self.0)
    }
}

/// Plain-HTTP loopback endpoints (local stacks, test harnesses) are the one
/// exception to the HTTPS invariant.
fn is_loopback_http(url: &str) -> bool {
    url.strip_prefix("http://")
        .is_some_and(|rest| rest.starts_with("127.0.0.1") || rest.starts_with("localhost"))
}

impl TryFrom<String> for BackendUrl {
    type Error = CredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendUrl> for String {
    fn from(value: BackendUrl) -> Self {
        value.0
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A backend API key (anonymous or service-role).
///
/// `Debug` redacts the value; keys must never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted, {} chars>)", self.0.len())
    }
}

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        let trimmed = value.trim();
        if contains_placeholder(trimmed) {
            return Err(CredentialError::KeyPlaceholder);
        }
        if trimmed.len() <= MIN_API_KEY_LEN {
            return Err(CredentialError::KeyTooShort(trimmed.len()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for ApiKey {
    type Error = CredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiKey> for String {
    fn from(value: ApiKey) -> Self {
        value.0
    }
}

/// Everything needed to address the hosted backend.
///
/// The service-role key is optional: it is only present in trusted execution
/// contexts and is never required for the ordinary sign-in path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub url: BackendUrl,
    pub anon_key: ApiKey,
    pub service_key: Option<ApiKey>,
}

impl CredentialPair {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_key: Option<String>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            url: BackendUrl::new(url)?,
            anon_key: ApiKey::new(anon_key)?,
            service_key: service_key.map(ApiKey::new).transpose()?,
        })
    }
}
