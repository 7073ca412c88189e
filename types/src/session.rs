//! Session and identity types issued by the backend.
//!
//! The backend owns session lifecycle; the client only caches the token
//! pair transiently in its persistent store and discards it on sign-out or
//! reinitialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::UserId;

/// Bearer token for authenticated calls. `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<redacted>)")
    }
}

/// Refresh token paired with an [`AccessToken`]. `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefreshToken(<redacted>)")
    }
}

/// Free-form metadata attached to the identity at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The authenticated identity as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Token pair plus identity, cached in the persistent store between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    /// Unix timestamp of expiry, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

#[cfg(test)]
mod tests {
    use super::{AccessToken, AuthUser, RefreshToken, Session, UserMetadata};
    use crate::profile::UserId;
    use uuid::Uuid;

    #[test]
    fn session_round_trips_through_json() {
        let session = Session {
            access_token: AccessToken::new("access-abc"),
            refresh_token: RefreshToken::new("refresh-def"),
            expires_at: Some(1_754_000_000),
            user: AuthUser {
                id: UserId::new(Uuid::new_v4()),
                email: "ana@exemplo.com".to_string(),
                user_metadata: UserMetadata {
                    full_name: Some("Ana".to_string()),
                    role: Some("profesor".to_string()),
                },
            },
        };

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn tokens_debug_redacted() {
        let debug = format!(
            "{:?} {:?}",
            AccessToken::new("secret-a"),
            RefreshToken::new("secret-r")
        );
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"7d9f0e9c-0000-4000-8000-000000000000","email":"x@y.gal"}"#,
        )
        .unwrap();
        assert!(user.user_metadata.full_name.is_none());
        assert!(user.user_metadata.role.is_none());
    }
}
