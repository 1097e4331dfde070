//! Provider state: connect options, the logged-in user and the lifecycle

use crate::chain::{address_from_public_key, network_code, same_chain_account};
use crate::error::{KeeperError, KeeperResult};
use crate::transport::Session;
use futures_util::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};

/// Network the provider signs for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConnectOptions {
    /// Network byte, e.g. 87 ('W') for mainnet
    pub network_byte: u8,

    /// Node REST endpoint
    pub node_url: String,
}

impl ConnectOptions {
    pub fn new(network_byte: u8, node_url: impl Into<String>) -> Self {
        Self {
            network_byte,
            node_url: node_url.into(),
        }
    }
}

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub address: String,
    pub public_key: String,
}

impl UserData {
    /// Derive the user from the first session account on the network
    ///
    /// `Ok(None)` means the session has no account for the network.
    pub fn from_session(session: &Session, network_byte: u8) -> KeeperResult<Option<Self>> {
        let Some(account) = same_chain_account(network_byte, session.accounts()) else {
            return Ok(None);
        };

        Ok(Some(Self {
            address: address_from_public_key(account.public_key, network_byte)?,
            public_key: account.public_key.to_string(),
        }))
    }

    /// Like [`UserData::from_session`], but a missing account is an error
    pub fn require_from_session(session: &Session, network_byte: u8) -> KeeperResult<Self> {
        Self::from_session(session, network_byte)?.ok_or(KeeperError::NoMatchingAccount {
            network_code: network_code(network_byte),
        })
    }
}

/// Lifecycle of a provider instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Sign client not obtained yet
    Uninitialized,
    Disconnected,
    /// A login handshake is in flight
    Connecting,
    Connected,
}

/// Shared outcome of the in-flight login handshake
pub(crate) type PendingLogin = Shared<BoxFuture<'static, KeeperResult<UserData>>>;

/// Mutable provider state, guarded by a mutex that is never held across
/// an await point
#[derive(Default)]
pub(crate) struct ProviderState {
    pub options: Option<ConnectOptions>,
    pub session: Option<Session>,
    pub user: Option<UserData>,
    pub pending_login: Option<PendingLogin>,
}

impl ProviderState {
    pub fn status(&self, initialized: bool) -> SessionStatus {
        if self.user.is_some() {
            SessionStatus::Connected
        } else if self.pending_login.is_some() {
            SessionStatus::Connecting
        } else if initialized {
            SessionStatus::Disconnected
        } else {
            SessionStatus::Uninitialized
        }
    }

    /// Adopt a validated session; returns true if the user changed
    pub fn adopt(&mut self, session: Session, user: UserData) -> bool {
        let changed = self.user.as_ref() != Some(&user);
        self.session = Some(session);
        self.user = Some(user);
        changed
    }

    /// Drop the session; returns the topic that was active, if any
    pub fn clear(&mut self) -> Option<String> {
        self.user = None;
        self.session.take().map(|s| s.topic)
    }
}
