use async_trait::async_trait;
use std::{collections::BTreeMap, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Every value the app keeps locally, one key per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    Streak,
    History,
    Water,
    Vitamins,
    Mood,
    Journal,
    Routine,
    LastNotified,
}

impl StoreKey {
    /// Keys wiped when a day ends.
    pub const TRANSIENT: [StoreKey; 5] = [
        StoreKey::Water,
        StoreKey::Vitamins,
        StoreKey::Mood,
        StoreKey::Journal,
        StoreKey::Routine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Streak => "reclaim_streak",
            StoreKey::History => "reclaim_history",
            StoreKey::Water => "reclaim_water",
            StoreKey::Vitamins => "reclaim_vitamins",
            StoreKey::Mood => "reclaim_mood",
            StoreKey::Journal => "reclaim_journal",
            StoreKey::Routine => "reclaim_routine",
            StoreKey::LastNotified => "reclaim_last_notified",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value persistence port.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Option<String>;

    async fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError>;

    async fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// Keeps every key in one JSON object on disk and rewrites the file on each change.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, payload)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: StoreKey) -> Option<String> {
        self.entries.lock().await.get(key.as_str()).cloned()
    }

    async fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.as_str().to_string(), value);
        self.persist(&entries).await
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key.as_str()).is_none() {
            return Ok(());
        }
        self.persist(&entries).await
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse store file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no store file at {}, starting empty", path.display());
            BTreeMap::new()
        }
        Err(err) => {
            error!("failed to read store file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Option<String> {
        self.entries.lock().await.get(key.as_str()).cloned()
    }

    async fn set(&self, key: StoreKey, value: String) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.as_str().to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key.as_str());
        Ok(())
    }
}
