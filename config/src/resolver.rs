//! First-valid-wins resolution across the provider chain.

use std::sync::Arc;

use kampos_types::contains_placeholder;

use crate::keys;
use crate::provider::{
    BuildTimeProvider, ConfigProvider, FallbackProvider, RuntimeFileProvider, StoreProvider,
};
use crate::store::KeyStore;

/// The validity rule shared by every lookup: non-empty after trim, no
/// unresolved deploy markers.
#[must_use]
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty() && !contains_placeholder(value)
}

pub struct ConfigResolver {
    store: Option<Arc<KeyStore>>,
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigResolver {
    /// Full chain: store, runtime file, build-time, hardcoded fallback.
    #[must_use]
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self {
            providers: vec![
                Box::new(StoreProvider::new(Arc::clone(&store))),
                Box::new(RuntimeFileProvider::load_default()),
                Box::new(BuildTimeProvider::new()),
                Box::new(FallbackProvider),
            ],
            store: Some(store),
        }
    }

    /// Headless execution (no persistent storage available): only the
    /// build-time embedded values are consulted, and nothing is cached.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            store: None,
            providers: vec![Box::new(BuildTimeProvider::new())],
        }
    }

    /// Custom chain, primarily for tests.
    #[must_use]
    pub fn with_providers(
        store: Option<Arc<KeyStore>>,
        providers: Vec<Box<dyn ConfigProvider>>,
    ) -> Self {
        Self { store, providers }
    }

    /// First valid value for `key`, cached back to the store when it came
    /// from a slower source. Never fails; a total miss logs an error and
    /// returns the hardcoded fallback (which may be empty).
    #[must_use]
    pub fn resolve(&self, key: &str) -> String {
        for provider in &self.providers {
            let Some(value) = provider.get(key) else {
                continue;
            };
            if !is_valid_value(&value) {
                tracing::debug!(key, source = provider.name(), "Skipping invalid value");
                continue;
            }

            if provider.name() != "store"
                && let Some(store) = &self.store
            {
                store.set(key, &value);
            }
            tracing::debug!(key, source = provider.name(), "Resolved configuration value");
            return value;
        }

        tracing::error!(key, "No configuration source produced a usable value");
        keys::fallback_for(key).to_string()
    }

    /// Resolve without consulting the fallback: `None` when only the
    /// hardcoded constants (or nothing) would answer. Used where a
    /// placeholder endpoint is worse than an honest absence, e.g. the
    /// service-role key.
    #[must_use]
    pub fn resolve_optional(&self, key: &str) -> Option<String> {
        for provider in &self.providers {
            if provider.name() == "fallback" {
                break;
            }
            let Some(value) = provider.get(key) else {
                continue;
            };
            if !is_valid_value(&value) {
                continue;
            }
            if provider.name() != "store"
                && let Some(store) = &self.store
            {
                store.set(key, &value);
            }
            return Some(value);
        }
        None
    }
}
