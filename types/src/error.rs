//! Typed classification of backend failures.
//!
//! Classification happens exactly once, at the HTTP boundary in
//! `kampos-client`; everything above matches on [`ErrorKind`] instead of
//! probing error message substrings.

use serde::{Deserialize, Serialize};

/// What went wrong, as far as the caller needs to care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad email/password combination.
    InvalidCredentials,
    /// The identity already exists.
    AlreadyRegistered,
    /// The backend rejected the API key itself.
    InvalidApiKey,
    /// Single-row read matched no rows (the backend's "no rows" code).
    /// Distinguished from real errors: the mirrored profile may simply not
    /// have been written yet.
    NoRows,
    /// Row-level security rejected the operation.
    PolicyViolation,
    /// Transport-level failure: DNS, TLS, connect, reset.
    Network,
    /// The caller-side wall-clock budget expired. Synthetic; the in-flight
    /// request was not cancelled.
    Timeout,
    /// Missing or invalid credential pair.
    Configuration,
    /// The client handle was constructed in degraded mode and refuses all
    /// operations.
    Degraded,
    /// Anything else the backend reported.
    Backend,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::AlreadyRegistered => "already_registered",
            ErrorKind::InvalidApiKey => "invalid_api_key",
            ErrorKind::NoRows => "no_rows",
            ErrorKind::PolicyViolation => "policy_violation",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Degraded => "degraded",
            ErrorKind::Backend => "backend",
        }
    }

    /// A missing mirrored profile is recoverable by synthesizing one; every
    /// other kind propagates.
    #[must_use]
    pub fn is_missing_profile(self) -> bool {
        matches!(self, ErrorKind::NoRows)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
