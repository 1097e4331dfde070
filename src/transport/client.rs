//! Sign client abstraction
//!
//! The pairing and session protocol is owned by a WalletConnect SDK. This
//! trait is the seam the provider talks to, so any SDK binding (or a test
//! double) can be plugged in.

use crate::error::KeeperResult;
use crate::transport::types::{
    ClientEvent, ClientOptions, ConnectParams, DisconnectReason, PendingSession, Session,
    SessionRequest,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked by the client for every pushed event, in delivery order
pub type ClientEventHandler = Box<dyn Fn(ClientEvent) + Send + Sync>;

/// Abstract WalletConnect sign client
#[async_trait]
pub trait SignClient: Send + Sync {
    /// Propose a new session; returns the pairing URI and the pending approval
    async fn connect(&self, params: ConnectParams) -> KeeperResult<PendingSession>;

    /// Close a session
    async fn disconnect(&self, topic: &str, reason: DisconnectReason) -> KeeperResult<()>;

    /// Send a JSON-RPC request over a session and return its result
    async fn request(&self, request: SessionRequest) -> KeeperResult<Value>;

    /// Subscribe to session events
    fn on(&self, handler: ClientEventHandler);

    /// Sessions currently known to the client, oldest first
    fn sessions(&self) -> Vec<Session>;

    /// Look up a session by topic
    fn session(&self, topic: &str) -> Option<Session> {
        self.sessions().into_iter().find(|s| s.topic == topic)
    }
}

/// Creates sign clients
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Initialize a client connected to the relay
    async fn init(&self, options: ClientOptions) -> KeeperResult<Arc<dyn SignClient>>;
}
