//! Creation transactions and confirmation monitoring.
//!
//! # Responsibilities
//! - Build contract-creation transactions with an explicit nonce
//! - Broadcast them and derive the created address
//! - Monitor confirmations

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{
    confirmations_at, BlockchainError, BlockchainResult, DeployedContract, DeploymentReceipt,
};

/// Build a contract-creation request.
///
/// Gas and fees are left for the provider's fillers.
pub fn creation_request(from: Address, nonce: u64, chain_id: u64, code: Bytes) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_nonce(nonce)
        .with_chain_id(chain_id)
        .with_deploy_code(code)
}

/// Sends creation transactions and waits on them.
#[derive(Debug, Clone)]
pub struct TxSender {
    client: BlockchainClient,
}

impl TxSender {
    /// Create a new sender.
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }

    /// Broadcast a creation transaction from `from`.
    ///
    /// The nonce is read once and pinned on the request so the created
    /// address can be derived before the transaction is mined.
    pub async fn send_creation(&self, from: Address, code: Bytes) -> BlockchainResult<DeployedContract> {
        let nonce = self.client.get_pending_nonce(from).await?;
        let request = creation_request(from, nonce, self.client.chain_id().0, code);
        let tx_hash = self.client.send_transaction(request).await?;

        let address = from.create(nonce);
        tracing::info!(tx_hash = %tx_hash, nonce, address = %address, "Creation transaction sent");

        Ok(DeployedContract {
            address,
            tx_hash,
            nonce,
        })
    }

    /// Wait until `tx_hash` has `required` confirmations.
    ///
    /// Returns `Ok(None)` when the node stops knowing a transaction it has
    /// already reported (dropped, replaced or reorged out). A transaction the
    /// node has not indexed yet keeps the wait going. A reverted transaction
    /// is an error. Without `wait_timeout` the wait is unbounded.
    pub async fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        required: u64,
        wait_timeout: Option<Duration>,
    ) -> BlockchainResult<Option<DeploymentReceipt>> {
        let wait = self.poll_confirmations(tx_hash, required);
        match wait_timeout {
            None => wait.await,
            Some(limit) => match timeout(limit, wait).await {
                Ok(result) => result,
                Err(_) => Err(BlockchainError::ConfirmationTimeout(required)),
            },
        }
    }

    async fn poll_confirmations(
        &self,
        tx_hash: TxHash,
        required: u64,
    ) -> BlockchainResult<Option<DeploymentReceipt>> {
        let period = self.client.poll_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut seen = false;

        loop {
            ticker.tick().await;

            let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                Some(r) => {
                    seen = true;
                    r
                }
                None => {
                    if self.client.transaction_known(tx_hash).await? {
                        seen = true;
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    } else if seen {
                        tracing::warn!(tx_hash = %tx_hash, "Transaction no longer known to the node");
                        return Ok(None);
                    } else {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction not indexed yet");
                    }
                    continue;
                }
            };

            if !receipt.status() {
                return Err(BlockchainError::Reverted(tx_hash));
            }

            let head = self.client.get_block_number().await?;
            let tx_block = receipt.block_number.unwrap_or(head);
            let confirmations = confirmations_at(tx_block, head);

            if confirmations >= required {
                return Ok(Some(DeploymentReceipt::from_rpc(&receipt, head)));
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations,
                required,
                "Waiting for confirmations"
            );
        }
    }
}
