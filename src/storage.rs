//! Persistent key/value storage for the last session topic
//!
//! Mirrors browser `localStorage`: synchronous string get/set/remove. The
//! provider writes exactly one key, [`LAST_TOPIC_KEY`].

use crate::config::ConfigManager;
use crate::error::{KeeperError, KeeperResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Storage key of the last used session topic, versioned with the crate
pub const LAST_TOPIC_KEY: &str = concat!("wc@2:keeper:", env!("CARGO_PKG_VERSION"), "//topic:last");

/// String key/value store
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> KeeperResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> KeeperResult<()>;
    fn remove_item(&self, key: &str) -> KeeperResult<()>;
}

fn poisoned() -> KeeperError {
    KeeperError::Storage("storage lock poisoned".to_string())
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> KeeperResult<Option<String>> {
        Ok(self.items.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> KeeperResult<()> {
        self.items
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KeeperResult<()> {
        self.items.lock().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store at the default location in the state directory
    pub fn new() -> Self {
        Self::with_path(ConfigManager::storage_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> KeeperResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            KeeperError::io(format!("reading storage file {}", self.path.display()), e)
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, items: &BTreeMap<String, String>) -> KeeperResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| KeeperError::io("creating storage directory", e))?;
        }

        let content = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, content).map_err(|e| {
            KeeperError::io(format!("writing storage file {}", self.path.display()), e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .map_err(|e| KeeperError::io("setting storage file permissions", e))?;
        }

        Ok(())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> KeeperResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.read()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> KeeperResult<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut items = self.read()?;
        items.insert(key.to_string(), value.to_string());
        self.write(&items)?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KeeperResult<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut items = self.read()?;
        if items.remove(key).is_some() {
            self.write(&items)?;
            debug!("Removed {} from {}", key, self.path.display());
        }
        Ok(())
    }
}
