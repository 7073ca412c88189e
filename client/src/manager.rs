//! Client lifecycle: lazy construction, fallback, degraded stub, reset.
//!
//! The handle used to be a module-level mutable singleton in the original
//! front-end; here it is owned state inside a service object with a defined
//! construction and teardown contract. Everything except
//! [`ClientManager::reinitialize`] treats the handle as read-only after
//! acquisition.

use std::sync::{Arc, RwLock};

use kampos_config::{ConfigResolver, KeyStore, keys};
use kampos_types::{ApiKey, BackendUrl, CredentialError, CredentialPair, Session};

use crate::backend::BackendClient;
use crate::error::ClientError;

pub struct ClientManager {
    store: Option<Arc<KeyStore>>,
    resolver: ConfigResolver,
    slot: RwLock<Option<Arc<BackendClient>>>,
}

impl ClientManager {
    /// Store-backed manager when the platform offers a data directory,
    /// headless otherwise.
    #[must_use]
    pub fn new() -> Self {
        match KeyStore::open_default() {
            Some(store) => Self::with_store(Arc::new(store)),
            None => {
                tracing::warn!("No data directory available; running headless");
                Self {
                    store: None,
                    resolver: ConfigResolver::headless(),
                    slot: RwLock::new(None),
                }
            }
        }
    }

    #[must_use]
    pub fn with_store(store: Arc<KeyStore>) -> Self {
        Self {
            resolver: ConfigResolver::new(Arc::clone(&store)),
            store: Some(store),
            slot: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn store(&self) -> Option<&Arc<KeyStore>> {
        self.store.as_ref()
    }

    /// The shared handle, constructed on first access. Never fails: an
    /// unusable credential pair yields a degraded stub, not a panic.
    #[must_use]
    pub fn client(&self) -> Arc<BackendClient> {
        if let Ok(slot) = self.slot.read()
            && let Some(client) = slot.as_ref()
        {
            return Arc::clone(client);
        }

        let client = Arc::new(self.build_client());
        if let Ok(mut slot) = self.slot.write() {
            // Another caller may have raced us here; first write wins so
            // every caller shares one handle.
            if let Some(existing) = slot.as_ref() {
                return Arc::clone(existing);
            }
            *slot = Some(Arc::clone(&client));
        }
        client
    }

    /// A handle carrying the service-role key. Never cached in the shared
    /// slot; callers are trusted execution contexts only (registration,
    /// diagnostics).
    pub fn privileged_client(&self) -> Result<BackendClient, ClientError> {
        let pair = self
            .resolve_pair()
            .map_err(|err| ClientError::configuration(format!("invalid credential pair: {err}")))?;
        let Some(service_key) = pair.service_key else {
            return Err(ClientError::configuration(
                "service-role key is not configured in any source",
            ));
        };
        Ok(BackendClient::new(pair.url, service_key))
    }

    /// Discards the cached handle and every session remnant, forcing the
    /// next access to reconstruct from scratch. Synchronous, idempotent,
    /// and safe to call with no existing handle. The credential keys
    /// survive; session-scoped keys do not.
    pub fn reinitialize(&self) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
        if let Some(store) = &self.store {
            store.purge_except(&keys::CREDENTIAL_KEYS);
        }
        tracing::info!("Backend client reinitialized");
    }

    // ------------------------------------------------------------------
    // Session remnants
    // ------------------------------------------------------------------

    /// The cached session, when one was persisted and still deserializes.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        let raw = self.store.as_ref()?.get(keys::SESSION)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(%err, "Discarding unreadable cached session");
                None
            }
        }
    }

    pub fn persist_session(&self, session: &Session) {
        let Some(store) = &self.store else { return };
        match serde_json::to_string(session) {
            Ok(raw) => store.set(keys::SESSION, &raw),
            Err(err) => tracing::warn!(%err, "Failed to serialize session"),
        }
    }

    /// Clears session-scoped keys while preserving the credential pair.
    /// The client-observable signed-out state is reached even when the
    /// backend call failed or timed out.
    pub fn clear_session(&self) {
        if let Some(store) = &self.store {
            store.purge_except(&keys::CREDENTIAL_KEYS);
        }
    }

    /// The credential pair as the provider chain currently resolves it. An
    /// invalid service-role key is dropped with a warning rather than
    /// poisoning the anonymous pair.
    fn resolve_pair(&self) -> Result<CredentialPair, CredentialError> {
        let url = BackendUrl::new(self.resolver.resolve(keys::BACKEND_URL))?;
        let anon_key = ApiKey::new(self.resolver.resolve(keys::ANON_KEY))?;
        let service_key = match self.resolver.resolve_optional(keys::SERVICE_ROLE_KEY) {
            Some(raw) => match ApiKey::new(raw) {
                Ok(key) => Some(key),
                Err(err) => {
                    tracing::warn!(%err, "Ignoring invalid service-role key");
                    None
                }
            },
            None => None,
        };
        Ok(CredentialPair {
            url,
            anon_key,
            service_key,
        })
    }

    fn build_client(&self) -> BackendClient {
        match self.resolve_pair() {
            Ok(pair) => BackendClient::new(pair.url, pair.anon_key),
            Err(err) => {
                tracing::error!(%err, "Resolved credential pair is invalid; trying hardcoded fallback");
                match CredentialPair::new(keys::FALLBACK_BACKEND_URL, keys::FALLBACK_API_KEY, None)
                {
                    Ok(pair) => BackendClient::new(pair.url, pair.anon_key),
                    Err(fallback_err) => BackendClient::degraded(format!(
                        "no usable credential pair: {err}; fallback also unusable: {fallback_err}"
                    )),
                }
            }
        }
    }
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}
