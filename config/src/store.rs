//! Persistent key-value store.
//!
//! Stands in for the browser's local storage: a flat JSON object on disk
//! holding the cached credential values and the backend-issued session
//! token. Loading is tolerant - a missing or corrupt file starts the store
//! empty with a warning instead of failing, since the values it holds can
//! always be re-resolved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct KeyStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl KeyStore {
    /// Opens the store at the platform data directory, or `None` when the
    /// platform reports no such directory (headless execution).
    #[must_use]
    pub fn open_default() -> Option<Self> {
        let dir = dirs::data_local_dir()?.join("kampos");
        Some(Self::open(dir.join("store.json")))
    }

    /// Opens (or initializes) the store at `path`.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
            self.persist(&values);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            if values.remove(key).is_some() {
                self.persist(&values);
            }
        }
    }

    /// Removes every key not listed in `preserved`.
    ///
    /// This is the sign-out/reinitialize primitive: session-scoped keys go,
    /// the credential keys stay.
    pub fn purge_except(&self, preserved: &[&str]) {
        if let Ok(mut values) = self.values.lock() {
            let before = values.len();
            values.retain(|key, _| preserved.contains(&key.as_str()));
            if values.len() != before {
                self.persist(&values);
            }
        }
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values
            .lock()
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn persist(&self, values: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), %err, "Failed to create store directory");
                return;
            }
        }
        match serde_json::to_vec_pretty(values) {
            Ok(bytes) => {
                if let Err(err) = std::fs::write(&self.path, bytes) {
                    tracing::warn!(path = %self.path.display(), %err, "Failed to persist store");
                }
            }
            Err(err) => {
                tracing::warn!(%err, "Failed to serialize store");
            }
        }
    }
}

fn load_values(path: &Path) -> HashMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "Failed to read store, starting empty");
            return HashMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "Corrupt store file, starting empty");
            HashMap::new()
        }
    }
}
