//! Key-value persistence for the small amount of state reclaim keeps
//! between runs: lifetime savings, usage history, and the onboarding flag.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::common::errors::ReclaimError;

pub const TOTAL_SAVED_KEY: &str = "reclaim.total_saved";
pub const USAGE_HISTORY_KEY: &str = "reclaim.usage_history";
pub const ONBOARDING_KEY: &str = "reclaim.onboarding_complete";

/// Durable string-keyed store of JSON values
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), ReclaimError>;
}

/// Decode `key` as `T`. Missing keys and undecodable values are both `None`.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, error = %e, "stored value could not be decoded, treating as absent");
            None
        }
    }
}

/// Encode `value` and store it under `key`
pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), ReclaimError> {
    let encoded = serde_json::to_value(value).map_err(|e| ReclaimError::Store {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, encoded)
}

/// Volatile store, for tests and embedding hosts that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ReclaimError> {
        let mut values = self.values.lock().map_err(|_| ReclaimError::Store {
            key: key.to_string(),
            message: "store lock poisoned".into(),
        })?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object on disk, rewritten whole on each `set`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_map(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &Map<String, Value>, key: &str) -> Result<(), ReclaimError> {
        let store_err = |message: String| ReclaimError::Store {
            key: key.to_string(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReclaimError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| store_err(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| ReclaimError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ReclaimError::io(&self.path, e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ReclaimError> {
        let mut values = self.values.lock().map_err(|_| ReclaimError::Store {
            key: key.to_string(),
            message: "store lock poisoned".into(),
        })?;
        values.insert(key.to_string(), value);
        self.write(&values, key)
    }
}

fn read_map(path: &Path) -> Map<String, Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Map::new(),
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        _ => {
            warn!(path = %path.display(), "state file is corrupt, starting empty");
            Map::new()
        }
    }
}
