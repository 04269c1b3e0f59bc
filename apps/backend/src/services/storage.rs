//! Directory-tree storage for progress snapshots.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use drill_core::{ProgressBackend, StoreError};

/// Stores each key as a JSON file below a root directory.
///
/// Key `abc/progress_data` lives at `{root}/abc/progress_data.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create the storage, making the root directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key, `None` if the key would escape the root.
    pub fn path_for(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.root.join(relative).with_extension("json"))
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        self.path_for(key)
            .ok_or_else(|| StoreError::PersistenceUnavailable(format!("invalid storage key {:?}", key)))
    }
}

fn unavailable(key: &str, err: io::Error) -> StoreError {
    StoreError::PersistenceUnavailable(format!("{}: {}", key, err))
}

impl ProgressBackend for FileStorage {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| unavailable(key, e))?;
        }

        // Write beside the target and rename so readers never see half a file.
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| unavailable(key, e))?;
        file.write_all(bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| unavailable(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| unavailable(key, e))?;

        tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(key, e)),
        }
    }
}
