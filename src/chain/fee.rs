//! Fee calculation for transactions submitted without a fee
//!
//! Invoke-script fees depend on the called dApp, so they are asked from the
//! node (`POST /transactions/calculateFee`) instead of being guessed.

use crate::chain::tx::SignerTx;
use crate::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Computes the fee for a transaction
#[async_trait]
pub trait FeeCalculator: Send + Sync {
    async fn calculate_fee(&self, node_url: &str, tx: &SignerTx) -> KeeperResult<u64>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateFeeResponse {
    fee_amount: u64,
}

/// Asks a Waves node to compute the fee
#[derive(Debug, Clone, Default)]
pub struct NodeFeeCalculator;

impl NodeFeeCalculator {
    pub fn new() -> Self {
        Self
    }

    fn endpoint(node_url: &str) -> String {
        format!("{}/transactions/calculateFee", node_url.trim_end_matches('/'))
    }

    fn post(url: &str, body: String) -> KeeperResult<u64> {
        let mut response = ureq::post(url)
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| KeeperError::FeeCalculation(format!("{}: {}", url, e)))?;

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| KeeperError::FeeCalculation(format!("reading response: {}", e)))?;

        let parsed: CalculateFeeResponse = serde_json::from_str(&text)
            .map_err(|e| KeeperError::FeeCalculation(format!("unexpected response: {}", e)))?;
        Ok(parsed.fee_amount)
    }
}

#[async_trait]
impl FeeCalculator for NodeFeeCalculator {
    async fn calculate_fee(&self, node_url: &str, tx: &SignerTx) -> KeeperResult<u64> {
        let url = Self::endpoint(node_url);
        let body = serde_json::to_string(tx)?;
        debug!("Requesting fee from {}", url);

        tokio::task::spawn_blocking(move || Self::post(&url, body))
            .await
            .map_err(|e| KeeperError::Internal(format!("fee task failed: {}", e)))?
    }
}

/// Prepare an invoke-script transaction that was submitted without a fee
///
/// Other transaction types and invokes that already carry a fee are
/// returned unchanged.
pub async fn with_fee(
    calculator: &dyn FeeCalculator,
    node_url: &str,
    mut tx: SignerTx,
) -> KeeperResult<SignerTx> {
    if tx.tx_type != crate::chain::TransactionType::InvokeScript as u8 || tx.fee.is_some() {
        return Ok(tx);
    }

    tx.fields
        .entry("payment")
        .or_insert_with(|| serde_json::Value::Array(vec![]));
    tx.fee = Some(calculator.calculate_fee(node_url, &tx).await?);
    Ok(tx)
}
