//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint with the deployer wallet attached
//! - Query chain state (chain id, block number, nonce, receipts)
//! - Broadcast signed transactions
//! - Bound every request with the configured timeout

use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;
use crate::config::NetworkConfig;

/// Blockchain RPC client wrapper.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: DynProvider,
    config: NetworkConfig,
    chain_id: ChainId,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Connect to the configured network.
    ///
    /// Reads the chain ID from the node and, when the configuration pins one,
    /// rejects a node serving a different chain. The wallet is bound to the
    /// chain and used by the provider to sign outgoing transactions.
    pub async fn connect(config: NetworkConfig, wallet: &Wallet) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        // Chain ID is needed before the signer can be bound, so query it with a
        // plain provider first.
        let bootstrap = ProviderBuilder::new().connect_http(url.clone());
        let actual = match timeout(timeout_duration, bootstrap.get_chain_id()).await {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => return Err(BlockchainError::Rpc(format!("eth_chainId failed: {}", e))),
            Err(_) => return Err(BlockchainError::Timeout(config.rpc_timeout_secs)),
        };

        if let Some(expected) = config.chain_id {
            if expected != actual {
                return Err(BlockchainError::ChainMismatch { expected, actual });
            }
        }

        let wallet = wallet.clone().with_chain_id(actual);
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased();

        tracing::info!(
            network = %config.name,
            rpc_url = %config.rpc_url,
            chain_id = actual,
            "Blockchain client initialized"
        );

        Ok(Self {
            provider,
            config,
            chain_id: ChainId(actual),
            timeout_duration,
        })
    }

    /// Await an RPC call, mapping transport errors and timeouts.
    async fn call<F, T, E>(&self, method: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(method, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{} failed: {}", method, e)))
            }
            Err(_) => {
                tracing::warn!(method, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Chain ID reported by the node at connect time.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    /// Get the next nonce for an address, counting pending transactions.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.call(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.call(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// Whether the node knows the transaction at all (pending or mined).
    pub async fn transaction_known(&self, tx_hash: TxHash) -> BlockchainResult<bool> {
        // Only presence matters; skip decoding the full transaction object.
        let tx: Option<serde_json::Value> = self
            .call(
                "eth_getTransactionByHash",
                self.provider
                    .raw_request("eth_getTransactionByHash".into(), (tx_hash,)),
            )
            .await?;
        Ok(tx.is_some())
    }

    /// Sign a transaction with the attached wallet and broadcast it.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let pending = self
            .call("eth_sendRawTransaction", self.provider.send_transaction(tx))
            .await?;
        Ok(*pending.tx_hash())
    }

    /// Receipt polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.config.name)
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.chain_id.0)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
