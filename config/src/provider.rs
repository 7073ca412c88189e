//! Named configuration sources behind one uniform interface.
//!
//! Each provider answers "do you have a value for this key" without judging
//! validity; the resolver applies the validity rule and the precedence
//! order. Keeping the sources behind a trait lets tests substitute probe
//! providers and assert which sources were actually consulted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::keys;
use crate::store::KeyStore;

pub trait ConfigProvider: Send + Sync {
    /// Stable name used in diagnostics ("store", "runtime-file", ...).
    fn name(&self) -> &'static str;

    /// Raw value for `key`, if this source carries one. May still contain
    /// unresolved deploy placeholders; the resolver filters those.
    fn get(&self, key: &str) -> Option<String>;
}

/// Source (a): values cached earlier in the persistent store.
pub struct StoreProvider {
    store: Arc<KeyStore>,
}

impl StoreProvider {
    #[must_use]
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }
}

impl ConfigProvider for StoreProvider {
    fn name(&self) -> &'static str {
        "store"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }
}

/// Source (b): the `env-config.json` file the hosting platform rewrites at
/// deploy time. When the substitution step never ran, values still carry
/// their `{{ KEY }}` markers and are filtered out downstream.
pub struct RuntimeFileProvider {
    values: HashMap<String, String>,
}

impl RuntimeFileProvider {
    /// Loads from `$KAMPOS_ENV_CONFIG`, else the platform config directory.
    /// A missing file is normal (local runs have no deploy step).
    #[must_use]
    pub fn load_default() -> Self {
        let path = std::env::var_os("KAMPOS_ENV_CONFIG")
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("kampos").join("env-config.json")));

        match path {
            Some(path) => Self::from_path(&path),
            None => Self {
                values: HashMap::new(),
            },
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Invalid env-config file");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Failed to read env-config file");
                HashMap::new()
            }
        };
        Self { values }
    }

    #[cfg(test)]
    #[must_use]
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl ConfigProvider for RuntimeFileProvider {
    fn name(&self) -> &'static str {
        "runtime-file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Source (c): values baked into the binary at compile time.
pub struct BuildTimeProvider {
    values: &'static [(&'static str, Option<&'static str>)],
}

const BUILD_TIME_VALUES: &[(&str, Option<&str>)] = &[
    (keys::BACKEND_URL, option_env!("KAMPOS_BACKEND_URL")),
    (keys::ANON_KEY, option_env!("KAMPOS_ANON_KEY")),
    (keys::SERVICE_ROLE_KEY, option_env!("KAMPOS_SERVICE_ROLE_KEY")),
];

impl BuildTimeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: BUILD_TIME_VALUES,
        }
    }

    /// Build against an explicit table instead of the compile-time one.
    #[must_use]
    pub fn with_values(values: &'static [(&'static str, Option<&'static str>)]) -> Self {
        Self { values }
    }
}

impl Default for BuildTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for BuildTimeProvider {
    fn name(&self) -> &'static str {
        "build-time"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(name, _)| *name == key)
            .and_then(|(_, value)| value.map(str::to_string))
    }
}

/// Source (d): last-resort hardcoded constants.
pub struct FallbackProvider;

impl ConfigProvider for FallbackProvider {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn get(&self, key: &str) -> Option<String> {
        let value = keys::fallback_for(key);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}
