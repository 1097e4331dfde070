//! Configuration schema for keeper-mobile
//!
//! Configuration is stored at `~/.config/keeper-mobile/config.toml`

use crate::chain::MAINNET;
use crate::session::ConnectOptions;
use crate::transport::{ClientOptions, Metadata};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Waves network to connect to
    pub network: NetworkConfig,

    /// WalletConnect relay settings
    pub relay: RelayConfig,

    /// Metadata shown in the wallet while pairing
    pub metadata: MetadataConfig,

    /// Signing behaviour
    pub signing: SigningConfig,
}

impl Config {
    /// Connect options for the configured network
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            network_byte: self.network.network_byte,
            node_url: self.network.node_url.clone(),
        }
    }

    /// Sign client initialization options
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            relay_url: self.relay.relay_url.clone(),
            project_id: self.relay.project_id.clone(),
            log_level: self.relay.log_level.clone(),
            metadata: self.metadata.to_metadata(),
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network byte (87 = 'W' mainnet, 84 = 'T' testnet, 83 = 'S' stagenet)
    pub network_byte: u8,

    /// Node used for fee calculation
    pub node_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_byte: MAINNET,
            node_url: "https://nodes.wavesnodes.com".to_string(),
        }
    }
}

/// WalletConnect relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay server URL
    pub relay_url: String,

    /// WalletConnect cloud project id
    pub project_id: String,

    /// Log level handed to the sign client
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            relay_url: "wss://relay.walletconnect.com".to_string(),
            project_id: String::new(),
            log_level: "error".to_string(),
        }
    }
}

/// Application metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

impl MetadataConfig {
    pub fn to_metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            icons: self.icons.clone(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            name: "Provider Keeper Mobile".to_string(),
            description: "Provider Keeper Mobile for WalletConnect".to_string(),
            url: "http://localhost".to_string(),
            icons: vec!["https://avatars.githubusercontent.com/u/96250405".to_string()],
        }
    }
}

/// Signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Check signed payloads returned by the wallet against the request
    pub verify_signatures: bool,

    /// Ask the node for fees of invoke-script transactions sent without one
    pub calculate_fees: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            verify_signatures: false,
            calculate_fees: true,
        }
    }
}
