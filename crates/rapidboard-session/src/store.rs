//! Persisted identity storage.
//!
//! Rapidboard persists exactly two strings between runs: the guest's
//! member id and the device identifier used to resume the guest session.
//! Where they live is the embedding application's business, so storage is
//! behind the [`IdentityStore`] trait. Two stores ship with the crate:
//!
//! - [`MemoryStore`]: nothing survives the process. Tests, demos.
//! - [`JsonFileStore`]: a flat JSON object in a file of your choosing.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::StoreError;

/// A string key-value store that survives process restarts.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one store is shared (behind an `Arc`) by
///   the session manager and the startup code that reads the device id.
///
/// Reads never fail: a missing key reads as the empty string, which
/// Rapidboard treats as "unset". No encryption, no expiry.
pub trait IdentityStore: Send + Sync + 'static {
    /// The value stored under `key`, or `""` when there is none.
    fn get_string(&self, key: &str) -> String;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An [`IdentityStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `(key, value)` pairs, as if left
    /// behind by an earlier run.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl IdentityStore for MemoryStore {
    fn get_string(&self, key: &str) -> String {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// An [`IdentityStore`] kept in a JSON file.
///
/// The whole file is one object of strings, e.g.
/// `{"RapidLeaderboardPlayerID":"4242"}`. It is read once on open and
/// rewritten on every `set_string`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; the
    /// file is created on the first write.
    ///
    /// # Errors
    /// - [`StoreError::Io`] if the file exists but can't be read.
    /// - [`StoreError::Format`] if it isn't a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), "identity store opened");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for JsonFileStore {
    fn get_string(&self, key: &str) -> String {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = values.insert(key.to_string(), value.to_string());

        let written = serde_json::to_vec_pretty(&*values)
            .map_err(StoreError::from)
            .and_then(|bytes| fs::write(&self.path, bytes).map_err(StoreError::from));

        if written.is_err() {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
        }
        written
    }
}
