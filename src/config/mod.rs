//! Configuration and on-disk locations for keeper-mobile
//!
//! Settings live in `<config dir>/keeper-mobile/config.toml`. The persisted
//! session topic (`storage.json`) and the audit log (`audit.log`) live in
//! the private state directory.

pub mod schema;

pub use schema::Config;

use crate::error::{KeeperError, KeeperResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes `config.toml`, and knows where provider state is kept
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager for an explicit config file, as given by `--config`
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/keeper-mobile/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keeper-mobile")
            .join("config.toml")
    }

    /// Directory holding the session storage file and the audit log
    ///
    /// Falls back to the local data dir where the platform has no state dir.
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keeper-mobile")
    }

    /// JSON file backing `FileStore`; holds the last session topic
    pub fn storage_path() -> PathBuf {
        Self::state_dir().join("storage.json")
    }

    /// JSON-lines log of logins, logouts and signing requests
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Load `config.toml`; a missing file means mainnet defaults
    pub async fn load(&self) -> KeeperResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    pub async fn load_from_file(&self, path: &Path) -> KeeperResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| KeeperError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| KeeperError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the whole config, creating parent directories
    pub async fn save(&self, config: &Config) -> KeeperResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            KeeperError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    async fn ensure_config_dir(&self) -> KeeperResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| KeeperError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: Arc::new(e),
                })?;
        }
        Ok(())
    }

    /// Create the state directory, private to the user on unix
    pub async fn ensure_state_dirs() -> KeeperResult<()> {
        let dir = Self::state_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| KeeperError::io(format!("creating directory {}", dir.display()), e))?;

        // Session topics identify the wallet pairing; keep them private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&dir, perms)
                .map_err(|e| KeeperError::io("setting state dir permissions", e))?;
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
