//! Persistent key/value store backing the call cache
//!
//! The whole map lives in memory and is read from / written to a single JSON
//! object file. Reads never fail: a missing file is a first run, a broken one
//! is logged and replaced by an empty store.

use crate::cache::key::operation_of;
use crate::error::{GhmError, GhmResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-memory cache map bound to its persisted file
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: HashMap<String, Value>,
    load_warning: Option<GhmError>,
}

impl CacheStore {
    /// Create an empty store bound to `path` without reading it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
            load_warning: None,
        }
    }

    /// Load the store persisted at `path`
    ///
    /// Absent files yield an empty store. Unreadable or malformed files also
    /// yield an empty store; the reason is kept in [`Self::load_warning`].
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);

        match read_entries(&store.path) {
            Ok(Some(entries)) => {
                debug!(
                    "Loaded {} cache entries from {}",
                    entries.len(),
                    store.path.display()
                );
                store.entries = entries;
            }
            Ok(None) => {
                debug!("No cache file at {}, starting empty", store.path.display());
            }
            Err(reason) => {
                warn!(
                    "Ignoring unusable cache file {}: {}",
                    store.path.display(),
                    reason
                );
                store.load_warning = Some(GhmError::PersistenceLoad {
                    path: store.path.clone(),
                    reason,
                });
            }
        }

        store
    }

    /// Path of the persisted file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last load fell back to an empty store, if it did
    pub fn load_warning(&self) -> Option<&GhmError> {
        self.load_warning.as_ref()
    }

    /// Look up a cached value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite a cached value
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Drop every entry
    pub fn purge_all(&mut self) {
        let purged = self.entries.len();
        self.entries.clear();
        debug!("Purged {} cache entries", purged);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per wrapped operation
    pub fn operation_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for key in self.entries.keys() {
            *counts.entry(operation_of(key).to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Atomically write the full map to the persisted file
    ///
    /// Data goes to a sibling temp file first and is renamed over the target,
    /// so a crash mid-write leaves the previous file intact.
    pub fn store(&self) -> GhmResult<()> {
        self.write_atomic().map_err(|source| GhmError::PersistenceStore {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            "Stored {} cache entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_atomic(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec(&self.entries)?;
        let temp_path = self.temp_path();

        let written = write_synced(&temp_path, &content)
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written
    }

    // Per-process name so concurrent writers never share a temp file
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cache.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
    }
}

fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// `Ok(None)` when the file does not exist, `Err(reason)` when it is unusable
fn read_entries(path: &Path) -> Result<Option<HashMap<String, Value>>, String> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    match serde_json::from_slice::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Some(map.into_iter().collect())),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
