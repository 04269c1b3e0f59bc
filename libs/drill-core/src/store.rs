//! Progress persistence behind a pluggable byte store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::session::PracticeSession;
use crate::snapshot;

/// Name under which a session's snapshot is stored.
pub const PROGRESS_KEY: &str = "progress_data";

/// Storage key for an owner's progress snapshot: `{owner}/progress_data`.
pub fn make_key(owner: &str) -> String {
    format!("{}/{}", owner, PROGRESS_KEY)
}

/// Byte storage for snapshots.
pub trait ProgressBackend: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

impl<T: ProgressBackend + ?Sized> ProgressBackend for Arc<T> {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, bytes)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressBackend for MemoryBackend {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::PersistenceUnavailable("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::PersistenceUnavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }
}

/// Saves and restores sessions as snapshots. Last write wins.
#[derive(Debug, Clone)]
pub struct ProgressStore<B> {
    backend: B,
}

impl<B: ProgressBackend> ProgressStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write the session's snapshot under `key`.
    pub fn save(&self, key: &str, session: &PracticeSession) -> Result<(), StoreError> {
        let bytes = snapshot::serialize(session)?;
        self.backend.put(key, &bytes)
    }

    /// Read the session stored under `key`, `Ok(None)` when there is none.
    pub fn load(&self, key: &str) -> Result<Option<PracticeSession>, StoreError> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(Some(snapshot::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}
