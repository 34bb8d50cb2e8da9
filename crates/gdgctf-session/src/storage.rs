//! Browser-style key/value storage and auth-artifact cleanup.
//!
//! Hosted auth SDKs mirror their tokens into `localStorage` and
//! `sessionStorage`. The site never writes there itself. On logout it
//! removes every key that follows the provider's naming convention so a
//! failed remote sign-out still logs the user out locally.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// A synchronous string key/value store (`localStorage`, `sessionStorage`).
pub trait KeyValueStore: Send + Sync {
    /// Label used in log lines.
    fn name(&self) -> &str;

    fn keys(&self) -> Result<Vec<String>, StorageError>;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// An in-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable(format!("{} lock poisoned", self.name)))
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries()?.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Which storage keys belong to the identity provider.
///
/// A key matches if it contains any `contains` entry or starts with any
/// `prefixes` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthStorageConfig {
    pub contains: Vec<String>,
    pub prefixes: Vec<String>,
}

/// Supabase conventions: `supabase.auth.token` and `sb-<project>-auth-token`.
impl Default for AuthStorageConfig {
    fn default() -> Self {
        Self {
            contains: vec!["supabase.auth.token".to_string()],
            prefixes: vec!["sb-".to_string()],
        }
    }
}

impl AuthStorageConfig {
    pub fn matches(&self, key: &str) -> bool {
        self.contains.iter().any(|needle| key.contains(needle.as_str()))
            || self.prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }
}

/// Removes every auth artifact from `store`, returning how many keys went.
///
/// Keys are collected before removal so the store is never mutated while
/// being enumerated.
pub fn clear_auth_artifacts(
    store: &dyn KeyValueStore,
    config: &AuthStorageConfig,
) -> Result<usize, StorageError> {
    let doomed: Vec<String> = store
        .keys()?
        .into_iter()
        .filter(|key| config.matches(key))
        .collect();

    for key in &doomed {
        store.remove(key)?;
    }

    if !doomed.is_empty() {
        tracing::debug!(store = store.name(), removed = doomed.len(), "auth artifacts cleared");
    }
    Ok(doomed.len())
}
