//! Key-value storage for the session token and local preferences.
//!
//! # Design
//! The app keeps a handful of flags and strings across restarts. Storage is
//! injected as `Arc<dyn KeyValueStore>` so tests and the FFI host choose the
//! backing: `MemoryStore` for the process lifetime, `JsonFileStore` for a
//! small JSON document on disk. Writes never fail from the caller's point
//! of view; a persistence error is logged and the in-memory value stays.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Minimal string-keyed store of JSON values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Missing or non-boolean values read as `false`.
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }
}

/// Store persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing values. A missing or
    /// unreadable file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Map<String, Value>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "preferences file is not a JSON object; starting empty");
                    Map::new()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no preferences file yet");
                Map::new()
            }
        };
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a temporary sibling and rename it over the target, so a
    /// crash mid-write leaves the previous file intact.
    fn persist(&self, values: &Map<String, Value>) {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(path = %self.path.display(), error = %e, "failed to create preferences directory");
            return;
        }
        let bytes = match serde_json::to_vec_pretty(values) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to serialize preferences");
                return;
            }
        };
        let written = NamedTempFile::new_in(dir).and_then(|mut tmp| {
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&self.path).map(drop).map_err(|e| e.error)
        });
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "failed to write preferences");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}
