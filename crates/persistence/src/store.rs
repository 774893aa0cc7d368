use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::PersistenceError;

/// JSON file store keyed by session id
pub struct JsonSessionStore<T> {
    path: Option<PathBuf>,
    records: Mutex<BTreeMap<String, T>>,
    degraded: AtomicBool,
}

impl<T> JsonSessionStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Open the store at `path`, loading whatever it already holds
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = Self::load(&path);
        tracing::info!(path = %path.display(), sessions = records.len(), "Session store opened");

        Self {
            path: Some(path),
            records: Mutex::new(records),
            degraded: AtomicBool::new(false),
        }
    }

    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Mutex::new(BTreeMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    fn load(path: &Path) -> BTreeMap<String, T> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Session store unreadable, starting empty");
                return BTreeMap::new();
            }
        };

        if contents.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Session store corrupt, starting empty");
                BTreeMap::new()
            }
        }
    }

    /// True once a write has failed and the store runs in memory only
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Snapshot of every stored record
    pub async fn load_all(&self) -> BTreeMap<String, T> {
        self.records.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.records.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Insert or replace a record, then flush
    pub async fn put(&self, id: &str, record: T) {
        let mut records = self.records.lock().await;
        records.insert(id.to_string(), record);
        self.flush(&records).await;
    }

    /// Remove a record, then flush
    pub async fn remove(&self, id: &str) -> bool {
        let mut records = self.records.lock().await;
        let removed = records.remove(id).is_some();
        if removed {
            self.flush(&records).await;
        }
        removed
    }

    /// Write the map to disk; holding the lock keeps writes in order
    async fn flush(&self, records: &BTreeMap<String, T>) {
        let Some(path) = self.path.clone() else {
            return;
        };
        if self.is_degraded() {
            return;
        }

        let result = match serde_json::to_vec_pretty(records) {
            Ok(bytes) => tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
                .await
                .unwrap_or_else(|e| Err(PersistenceError::Task(e.to_string()))),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            if !self.degraded.swap(true, Ordering::Relaxed) {
                let err: loan_assist_core::Error = e.into();
                tracing::warn!(error = %err, "Session store write failed, continuing in memory");
            }
        }
    }
}

/// Write through a temp file in the target directory, then rename over the target
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut file = tempfile::NamedTempFile::new_in(&dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
