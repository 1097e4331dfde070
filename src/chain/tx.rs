//! Transaction model exchanged with the wallet
//!
//! `SignerTx` keeps the fields the provider reads or fills (type, chain id,
//! sender public key, fee) and carries every other field through untouched.

use crate::error::{KeeperError, KeeperResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Waves transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionType {
    Genesis = 1,
    Payment = 2,
    Issue = 3,
    Transfer = 4,
    Reissue = 5,
    Burn = 6,
    Exchange = 7,
    Lease = 8,
    CancelLease = 9,
    Alias = 10,
    MassTransfer = 11,
    Data = 12,
    SetScript = 13,
    Sponsorship = 14,
    SetAssetScript = 15,
    InvokeScript = 16,
    UpdateAssetInfo = 17,
}

impl TransactionType {
    /// Types Keeper Mobile accepts over the session
    pub const SUPPORTED: &'static [TransactionType] = &[
        TransactionType::Transfer,
        TransactionType::Reissue,
        TransactionType::Burn,
        TransactionType::Lease,
        TransactionType::CancelLease,
        TransactionType::Alias,
        TransactionType::MassTransfer,
        TransactionType::Data,
        TransactionType::Sponsorship,
        TransactionType::InvokeScript,
    ];

    /// Look up a type by its numeric id
    pub fn from_u8(value: u8) -> Option<Self> {
        use TransactionType::*;
        let ty = match value {
            1 => Genesis,
            2 => Payment,
            3 => Issue,
            4 => Transfer,
            5 => Reissue,
            6 => Burn,
            7 => Exchange,
            8 => Lease,
            9 => CancelLease,
            10 => Alias,
            11 => MassTransfer,
            12 => Data,
            13 => SetScript,
            14 => Sponsorship,
            15 => SetAssetScript,
            16 => InvokeScript,
            17 => UpdateAssetInfo,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as u8)
    }
}

/// A transaction as handed over by the signing library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerTx {
    /// Numeric transaction type
    #[serde(rename = "type")]
    pub tx_type: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_public_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,

    /// Type-specific fields (recipient, amount, call, payment, ...)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SignerTx {
    /// Create a transaction of the given type with no extra fields
    pub fn new(tx_type: u8) -> Self {
        Self {
            tx_type,
            chain_id: None,
            sender_public_key: None,
            fee: None,
            fields: Map::new(),
        }
    }

    /// Builder-style setter for a type-specific field
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Resolved transaction type, if known
    pub fn kind(&self) -> Option<TransactionType> {
        TransactionType::from_u8(self.tx_type)
    }

    /// Reject types outside the supported allow-list
    pub fn ensure_supported(&self) -> KeeperResult<TransactionType> {
        self.kind()
            .filter(TransactionType::is_supported)
            .ok_or(KeeperError::UnsupportedTransactionType(self.tx_type))
    }

    /// Fill `chainId` and `senderPublicKey` where the caller left them out
    pub fn normalized(mut self, network_byte: u8, public_key: &str) -> Self {
        self.chain_id.get_or_insert(network_byte);
        self.sender_public_key
            .get_or_insert_with(|| public_key.to_string());
        self
    }
}

/// A signed transaction exactly as returned by the wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTx(pub Value);

impl SignedTx {
    /// Transaction id, when the wallet includes it
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Proofs (signatures) attached by the wallet
    pub fn proofs(&self) -> Vec<&str> {
        self.0
            .get("proofs")
            .and_then(Value::as_array)
            .map(|proofs| proofs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn tx_type(&self) -> Option<u64> {
        self.0.get("type").and_then(Value::as_u64)
    }

    pub fn sender_public_key(&self) -> Option<&str> {
        self.0.get("senderPublicKey").and_then(Value::as_str)
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.0.get("chainId").and_then(Value::as_u64)
    }

    /// Check the signed payload against the transaction that was sent
    ///
    /// Diagnostic only: the wallet is trusted to sign what it was given.
    pub fn verify_against(&self, sent: &SignerTx) -> KeeperResult<()> {
        if self.tx_type() != Some(u64::from(sent.tx_type)) {
            return Err(KeeperError::SignatureMismatch(format!(
                "expected type {}, wallet returned {:?}",
                sent.tx_type,
                self.tx_type()
            )));
        }
        if let Some(expected) = sent.sender_public_key.as_deref() {
            if self.sender_public_key() != Some(expected) {
                return Err(KeeperError::SignatureMismatch(format!(
                    "sender public key changed to {:?}",
                    self.sender_public_key()
                )));
            }
        }
        if let (Some(expected), Some(actual)) = (sent.chain_id, self.chain_id()) {
            if u64::from(expected) != actual {
                return Err(KeeperError::SignatureMismatch(format!(
                    "chain id changed from {} to {}",
                    expected, actual
                )));
            }
        }

        let proofs = self.proofs();
        if proofs.is_empty() {
            return Err(KeeperError::SignatureMismatch(
                "signed transaction carries no proofs".to_string(),
            ));
        }
        for proof in proofs {
            let bytes = bs58::decode(proof).into_vec().map_err(|e| {
                KeeperError::SignatureMismatch(format!("proof is not base58: {}", e))
            })?;
            if bytes.len() != 64 {
                return Err(KeeperError::SignatureMismatch(format!(
                    "proof has {} bytes, expected 64",
                    bytes.len()
                )));
            }
        }
        Ok(())
    }
}
