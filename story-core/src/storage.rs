//! Key-value persistence for story history and the API credential.
//!
//! Values are JSON strings stored under fixed keys. Two stores are provided:
//! an in-memory one for tests and headless runs, and a directory-backed one
//! that keeps one file per key.

use crate::history::StoryHistory;
use crate::story::Story;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Key holding the serialized story history.
pub const HISTORY_KEY: &str = "storyHistory";

/// Key holding the user-supplied API credential.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store backed by a map in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Store that keeps each key in its own file under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;

        // Write to a sibling and rename so a crash never leaves half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load the story history.
///
/// Missing history is empty. Corrupt history is logged and treated as empty
/// so the application still starts.
pub async fn load_history(store: &dyn KeyValueStore) -> Result<StoryHistory, StorageError> {
    let Some(raw) = store.get(HISTORY_KEY).await? else {
        return Ok(StoryHistory::new());
    };

    match serde_json::from_str::<Vec<Story>>(&raw) {
        Ok(stories) => Ok(StoryHistory::from_stories(stories)),
        Err(e) => {
            tracing::warn!(error = %e, "Stored story history is corrupt, starting empty");
            Ok(StoryHistory::new())
        }
    }
}

/// Persist the whole history.
pub async fn save_history(
    store: &dyn KeyValueStore,
    history: &StoryHistory,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(history)?;
    store.set(HISTORY_KEY, &json).await
}

/// Load the stored credential, if a non-blank one exists.
pub async fn load_credential(store: &dyn KeyValueStore) -> Result<Option<String>, StorageError> {
    Ok(store
        .get(CREDENTIAL_KEY)
        .await?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Store a credential. Returns `false` and stores nothing when it is blank.
pub async fn save_credential(
    store: &dyn KeyValueStore,
    credential: &str,
) -> Result<bool, StorageError> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Ok(false);
    }
    store.set(CREDENTIAL_KEY, credential).await?;
    Ok(true)
}

pub async fn clear_credential(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove(CREDENTIAL_KEY).await
}

/// A fixed-width mask for displaying a stored credential.
pub fn mask_credential() -> String {
    "•".repeat(20)
}
