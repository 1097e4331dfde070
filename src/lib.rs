//! keeper-mobile - Keeper Mobile signer provider
//!
//! Authenticates a user and requests transaction signatures from the
//! Keeper Mobile wallet over a WalletConnect session.

pub mod audit;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod pairing;
pub mod session;
pub mod storage;
pub mod transport;
pub mod ui;

pub use error::{KeeperError, KeeperResult};
pub use session::{AuthEvent, AuthEventKind, ConnectOptions, ProviderKeeperMobile, UserData};
