//! The chain-facing side of a deployment.

use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::artifact::{ArtifactStore, ContractFactory};
use crate::blockchain::{BlockchainClient, DeployedContract, DeploymentReceipt, TxSender, Wallet};
use crate::deploy::BackendError;

/// Operations the deployment procedure needs from the chain and toolchain.
#[async_trait]
pub trait DeployBackend: Send + Sync {
    /// Address of the deploying account.
    async fn signer(&self) -> Result<Address, BackendError>;

    /// Factory for the named compiled contract.
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, BackendError>;

    /// Broadcast the creation transaction.
    async fn deploy(
        &self,
        factory: &ContractFactory,
        constructor_args: &[DynSolValue],
    ) -> Result<DeployedContract, BackendError>;

    /// Wait until the transaction is mined with `confirmations` blocks.
    /// `None` means the node has no receipt and no record of the transaction.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError>;

    /// Wait for additional depth on an already mined transaction.
    async fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError>;
}

/// Backend talking JSON-RPC through alloy and reading Hardhat artifacts.
#[derive(Debug)]
pub struct AlloyBackend {
    wallet: Wallet,
    client: BlockchainClient,
    sender: TxSender,
    artifacts: ArtifactStore,
    wait_timeout: Option<Duration>,
}

impl AlloyBackend {
    pub fn new(
        wallet: Wallet,
        client: BlockchainClient,
        artifacts: ArtifactStore,
        wait_timeout: Option<Duration>,
    ) -> Self {
        Self {
            wallet,
            sender: TxSender::new(client.clone()),
            client,
            artifacts,
            wait_timeout,
        }
    }
}

#[async_trait]
impl DeployBackend for AlloyBackend {
    async fn signer(&self) -> Result<Address, BackendError> {
        let address = self.wallet.address();
        let balance = self.client.get_balance(address).await?;
        tracing::debug!(address = %address, balance = %balance, "Deployer balance");
        Ok(address)
    }

    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, BackendError> {
        let artifact = self.artifacts.find(name)?;
        tracing::debug!(path = %artifact.path.display(), "Loaded artifact");
        Ok(ContractFactory::new(artifact))
    }

    async fn deploy(
        &self,
        factory: &ContractFactory,
        constructor_args: &[DynSolValue],
    ) -> Result<DeployedContract, BackendError> {
        let code = factory.deploy_code(constructor_args)?;
        Ok(self.sender.send_creation(self.wallet.address(), code).await?)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError> {
        Ok(self
            .sender
            .wait_for_confirmations(tx_hash, confirmations, self.wait_timeout)
            .await?)
    }

    async fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError> {
        Ok(self
            .sender
            .wait_for_confirmations(tx_hash, confirmations, self.wait_timeout)
            .await?)
    }
}
