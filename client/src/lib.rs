//! Backend service client for KamposXestion.
//!
//! # Architecture
//!
//! The hosted backend exposes two API surfaces under one endpoint:
//!
//! - [`BackendClient`] identity operations (`/auth/v1`): admin user
//!   creation, password grant, logout, identity lookup
//! - [`BackendClient`] row operations (`/rest/v1`): reads/writes/upserts on
//!   the `profiles` relation, filtered by the backend's row-level security
//!
//! The client never defines or enforces that schema; it assumes the backend
//! does (anonymous/authenticated insert allowed, each identity may
//! select/update only its own row).
//!
//! # Lifecycle
//!
//! [`ClientManager`] owns the shared handle: lazy construction from the
//! resolved credential pair, a one-shot fallback to the hardcoded
//! constants, a degraded stub when even those fail (construction never
//! panics - consuming code checks error state instead of crashing at
//! startup), and an explicit synchronous [`ClientManager::reinitialize`].
//!
//! # Error Handling
//!
//! Every non-success response is classified exactly once, here, into
//! [`kampos_types::ErrorKind`]; callers match on the kind and never probe
//! message substrings.

mod backend;
mod error;
mod manager;

pub use backend::{BackendClient, NewUser};
pub use error::ClientError;
pub use manager::ClientManager;

use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Process-wide HTTP client. Built once; hardened settings with a minimal
/// fallback if the full builder fails.
pub(crate) fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder()
            .https_only(true)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to build hardened HTTP client: {e}. Attempting minimal hardened fallback."
                );
                reqwest::Client::builder()
                    .https_only(true)
                    .redirect(reqwest::redirect::Policy::none())
                    .build()
                    .expect("Minimal hardened HTTP client must build; cannot proceed without TLS")
            })
    })
}

/// Loopback endpoints (local stacks, mock servers) speak plain HTTP; the
/// hardened pool would refuse them.
pub(crate) fn loopback_http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build loopback HTTP client: {e}");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Minimal HTTP client must build")
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}
