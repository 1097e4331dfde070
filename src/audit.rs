//! Audit logging for session and signing events
//!
//! Writes JSON lines to `~/.local/state/keeper-mobile/audit.log`.
//! Payloads are recorded as SHA-256 digests, never in full.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based audit logger that appends JSON lines
#[derive(Debug, Clone)]
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Audit logger writing to an explicit file
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            enabled: true,
            path,
        }
    }

    /// Audit logger that drops every event
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hex SHA-256 of a payload, for recording what was signed
    pub fn digest(payload: &str) -> String {
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// Log an audit event as a JSON line
    ///
    /// IO failures are logged and swallowed; auditing never fails the
    /// operation being audited.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
