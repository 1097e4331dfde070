//! Waves chain helpers
//!
//! Network codes, CAIP-style chain ids (`waves:W`), session account parsing,
//! address derivation and the transaction model sent to the wallet.

pub mod address;
pub mod fee;
pub mod tx;

pub use address::address_from_public_key;
pub use fee::{FeeCalculator, NodeFeeCalculator};
pub use tx::{SignedTx, SignerTx, TransactionType};

/// Namespace used for every Waves chain and account id
pub const WAVES_NAMESPACE: &str = "waves";

/// Mainnet network byte ('W')
pub const MAINNET: u8 = b'W';

/// Testnet network byte ('T')
pub const TESTNET: u8 = b'T';

/// Stagenet network byte ('S')
pub const STAGENET: u8 = b'S';

/// Network code character for a network byte
pub fn network_code(network_byte: u8) -> char {
    char::from(network_byte)
}

/// Chain id in `namespace:reference` form, e.g. `waves:W`
pub fn chain_id(network_byte: u8) -> String {
    format!("{}:{}", WAVES_NAMESPACE, network_code(network_byte))
}

/// A session account split into its three parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account<'a> {
    pub namespace: &'a str,
    pub network_code: &'a str,
    pub public_key: &'a str,
}

impl<'a> Account<'a> {
    /// Parse `namespace:network-code:public-key`
    pub fn parse(account: &'a str) -> Option<Self> {
        let mut parts = account.splitn(3, ':');
        let namespace = parts.next()?;
        let network_code = parts.next()?;
        let public_key = parts.next()?;
        if public_key.is_empty() {
            return None;
        }
        Some(Self {
            namespace,
            network_code,
            public_key,
        })
    }

    /// Whether the account lives on the given Waves network
    pub fn is_on(&self, network_byte: u8) -> bool {
        let mut code = [0u8; 4];
        self.namespace == WAVES_NAMESPACE
            && self.network_code == network_code(network_byte).encode_utf8(&mut code)
    }
}

/// Format an account id for a public key on a network
pub fn account_id(network_byte: u8, public_key: &str) -> String {
    format!("{}:{}", chain_id(network_byte), public_key)
}

/// First account in `accounts` that belongs to the network
pub fn same_chain_account<'a, I>(network_byte: u8, accounts: I) -> Option<Account<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    accounts
        .into_iter()
        .filter_map(Account::parse)
        .find(|account| account.is_on(network_byte))
}
