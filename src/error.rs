//! Error types for keeper-mobile
//!
//! All modules use `KeeperResult<T>` as their return type. The error is
//! `Clone` because a single login outcome is handed to every caller that
//! awaited the same pending handshake; non-cloneable sources sit behind `Arc`.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for keeper-mobile operations
pub type KeeperResult<T> = Result<T, KeeperError>;

/// All errors that can occur in keeper-mobile
#[derive(Error, Debug, Clone)]
pub enum KeeperError {
    // Initialization errors
    #[error("WalletConnect client failed to initialize: {0}")]
    ClientInit(String),

    #[error("Provider is not connected. Call connect() with network options first")]
    NotConnected,

    // Login errors
    #[error("Login cancelled by user")]
    LoginCancelled,

    #[error("Session has no account for network '{network_code}'")]
    NoMatchingAccount { network_code: char },

    #[error("Not logged in")]
    NotLoggedIn,

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response to {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    // Signing errors
    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(u8),

    #[error("Nothing to sign: transaction list is empty")]
    EmptyTransactionList,

    #[error("Invalid public key {public_key}: {reason}")]
    InvalidPublicKey { public_key: String, reason: String },

    #[error("Signature verification failed: {0}")]
    SignatureMismatch(String),

    #[error("Fee calculation failed: {0}")]
    FeeCalculation(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[source] Arc<toml::de::Error>),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[source] Arc<toml::ser::Error>),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl KeeperError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// Wrap a failure reported by the session transport
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Self::Transport(reason.to_string())
    }

    /// Create an invalid response error for an RPC method
    pub fn invalid_response(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Check if the caller may simply try the same operation again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LoginCancelled | Self::Transport(_) | Self::FeeCalculation(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotConnected => Some("Call connect() with a network byte and node URL"),
            Self::ClientInit(_) => Some("Check relay.relay_url and relay.project_id"),
            Self::NoMatchingAccount { .. } => {
                Some("Switch Keeper Mobile to the configured network and log in again")
            }
            Self::LoginCancelled => Some("Scan the pairing code with Keeper Mobile"),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for KeeperError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlParse(Arc::new(err))
    }
}

impl From<toml::ser::Error> for KeeperError {
    fn from(err: toml::ser::Error) -> Self {
        Self::TomlSerialize(Arc::new(err))
    }
}
