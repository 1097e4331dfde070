//! Session transport data types
//!
//! Shapes of the values exchanged with the WalletConnect sign client. The
//! wire encoding belongs to the client; these are the decoded forms.

use crate::error::KeeperResult;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Application metadata shown to the wallet user during pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

/// Permissions requested for one namespace (e.g. `waves`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRequest {
    pub methods: Vec<String>,
    pub chains: Vec<String>,
    pub events: Vec<String>,
}

/// Permissions granted for one namespace in a settled session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNamespace {
    /// `namespace:network-code:public-key` account ids
    pub accounts: Vec<String>,
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// A settled session as known by the sign client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session topic
    pub topic: String,

    /// Granted namespaces keyed by namespace name
    pub namespaces: BTreeMap<String, SessionNamespace>,

    /// Wallet metadata
    pub peer: Option<Metadata>,

    /// Expiry as unix seconds
    pub expiry: Option<i64>,
}

impl Session {
    /// All account ids across every namespace, in namespace order
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .values()
            .flat_map(|ns| ns.accounts.iter().map(String::as_str))
    }
}

/// Parameters of a new session proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Existing pairing to reuse instead of creating a new one
    pub pairing_topic: Option<String>,
    pub required_namespaces: BTreeMap<String, NamespaceRequest>,
    pub metadata: Metadata,
}

/// Outcome of `SignClient::connect`
///
/// `uri` is set while the proposal waits for a wallet to pair; `approval`
/// resolves once the wallet approves or rejects.
pub struct PendingSession {
    pub uri: Option<String>,
    pub approval: BoxFuture<'static, KeeperResult<Session>>,
}

/// A JSON-RPC call routed to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub topic: String,
    pub chain_id: String,
    pub method: String,
    pub params: Value,
}

/// Reason sent to the wallet when a session is closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectReason {
    pub code: u32,
    pub message: String,
}

impl DisconnectReason {
    /// SDK error `USER_DISCONNECTED`
    pub fn user_disconnected() -> Self {
        Self {
            code: 6000,
            message: "User disconnected.".to_string(),
        }
    }
}

/// Events the sign client pushes to its subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Namespaces of a session changed
    SessionUpdated(Session),
    /// A session was deleted (by either side)
    SessionDeleted { topic: String },
}

/// Options used to initialize the sign client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    pub relay_url: String,
    pub project_id: String,
    pub log_level: String,
    pub metadata: Metadata,
}
