//! The mirrored `profiles` row.
//!
//! The backend owns this relation (with row-level security keyed to the
//! authenticated identity); the client keeps a best-effort denormalized
//! mirror of the identity in it. A missing row is a degraded but non-fatal
//! state: the identity remains the source of truth.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::AuthUser;

/// Role written for every account created through this application.
pub const DEFAULT_ROLE: &str = "profesor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the backend `profiles` relation.
///
/// `role` stays a plain string: the vocabulary belongs to the backend
/// schema, not to this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Minimal profile synthesized from identity metadata when the mirrored
    /// row is absent.
    #[must_use]
    pub fn from_identity(user: &AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.user_metadata.full_name.clone(),
            role: user
                .user_metadata
                .role
                .clone()
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ROLE, UserProfile};
    use crate::session::{AuthUser, UserMetadata};
    use uuid::Uuid;

    #[test]
    fn synthesized_profile_defaults_role() {
        let user = AuthUser {
            id: super::UserId::new(Uuid::new_v4()),
            email: "ana@exemplo.com".to_string(),
            user_metadata: UserMetadata {
                full_name: Some("Ana".to_string()),
                role: None,
            },
        };

        let profile = UserProfile::from_identity(&user);
        assert_eq!(profile.role, DEFAULT_ROLE);
        assert_eq!(profile.full_name.as_deref(), Some("Ana"));
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn synthesized_profile_keeps_metadata_role() {
        let user = AuthUser {
            id: super::UserId::new(Uuid::new_v4()),
            email: "x@exemplo.com".to_string(),
            user_metadata: UserMetadata {
                full_name: None,
                role: Some("direccion".to_string()),
            },
        };

        assert_eq!(UserProfile::from_identity(&user).role, "direccion");
    }
}
