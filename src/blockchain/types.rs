//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use serde::Serialize;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction did not reach the required depth within the wait bound.
    #[error("Transaction not confirmed with {0} blocks before the wait timed out")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Handle to a contract whose creation transaction has been broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    /// Address the contract is created at (sender + nonce).
    pub address: Address,
    /// Hash of the creation transaction.
    pub tx_hash: TxHash,
    /// Nonce the creation transaction was sent with.
    pub nonce: u64,
}

/// The parts of a creation receipt the deployment cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    /// Confirmations observed when the wait returned.
    pub confirmations: u64,
}

impl DeploymentReceipt {
    /// Summarize an RPC receipt observed at chain head `head`.
    pub fn from_rpc(receipt: &TransactionReceipt, head: u64) -> Self {
        let block_number = receipt.block_number.unwrap_or(head);
        Self {
            tx_hash: receipt.transaction_hash,
            block_number,
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            confirmations: confirmations_at(block_number, head),
        }
    }
}

/// Number of confirmations a transaction mined in `tx_block` has at `head`.
///
/// The block containing the transaction counts as the first confirmation.
pub fn confirmations_at(tx_block: u64, head: u64) -> u64 {
    if head < tx_block {
        0
    } else {
        head - tx_block + 1
    }
}
