//! Session transport
//!
//! Types and traits describing the WalletConnect sign client the provider
//! drives. No protocol code lives here.

mod client;
pub mod types;

pub use client::{ClientEventHandler, ClientFactory, SignClient};
pub use types::{
    ClientEvent, ClientOptions, ConnectParams, DisconnectReason, Metadata, NamespaceRequest,
    PendingSession, Session, SessionNamespace, SessionRequest,
};

/// JSON-RPC methods Keeper Mobile understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    SignTransaction,
    SignTransactionPackage,
    SignMessage,
    SignTypedData,
    SignOrder,
}

impl RpcMethod {
    /// Every method requested when a session is proposed
    pub const ALL: [RpcMethod; 5] = [
        RpcMethod::SignTransaction,
        RpcMethod::SignTransactionPackage,
        RpcMethod::SignMessage,
        RpcMethod::SignTypedData,
        RpcMethod::SignOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignTransaction => "waves_signTransaction",
            Self::SignTransactionPackage => "waves_signTransactionPackage",
            Self::SignMessage => "waves_signMessage",
            Self::SignTypedData => "waves_signTypedData",
            Self::SignOrder => "waves_signOrder",
        }
    }

    /// Method names as requested in a session proposal
    pub fn all_names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
