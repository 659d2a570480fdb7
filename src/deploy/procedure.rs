//! The deployment run: sign, deploy, confirm, verify.

use crate::config::DeployConfig;
use crate::deploy::backend::DeployBackend;
use crate::deploy::report::{DeploymentReport, VerificationOutcome};
use crate::deploy::stage::{DeployStage, StageTracker};
use crate::deploy::{DeployError, Step};
use crate::verify::{VerificationRequest, Verifier};

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub contract: String,
    pub receipt_confirmations: u64,
    pub final_confirmations: u64,
    /// Fail the run when verification fails.
    pub strict_verification: bool,
}

impl DeployPlan {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            contract: config.deployment.contract.clone(),
            receipt_confirmations: config.deployment.receipt_confirmations,
            final_confirmations: config.deployment.final_confirmations,
            strict_verification: config.verification.strict,
        }
    }
}

impl Default for DeployPlan {
    fn default() -> Self {
        Self::from_config(&DeployConfig::default())
    }
}

/// Deploy `plan.contract` with no constructor arguments, wait for finality
/// and, when a verifier is given, submit the source.
///
/// Every step runs once, in order. Failures before verification end the run;
/// a verification failure is logged and recorded in the report unless the
/// plan is strict.
pub async fn run_deployment(
    backend: &dyn DeployBackend,
    verifier: Option<&dyn Verifier>,
    plan: &DeployPlan,
) -> Result<DeploymentReport, DeployError> {
    let mut stages = StageTracker::new();

    let deployer = backend.signer().await.map_err(DeployError::at(Step::Signer))?;
    stages.advance(DeployStage::SignerReady);
    tracing::info!(deployer = %deployer, "Deploying contracts with the account: {}", deployer);

    let factory = backend
        .contract_factory(&plan.contract)
        .await
        .map_err(DeployError::at(Step::ContractFactory))?;

    let deployed = backend
        .deploy(&factory, &[])
        .await
        .map_err(DeployError::at(Step::Deploy))?;
    stages.advance(DeployStage::Deployed);

    let receipt = backend
        .wait_for_receipt(deployed.tx_hash, plan.receipt_confirmations)
        .await
        .map_err(DeployError::at(Step::ReceiptWait))?
        .ok_or(DeployError::ReceiptNotFound(deployed.tx_hash))?;
    stages.advance(DeployStage::Confirmed(receipt.confirmations.max(plan.receipt_confirmations)));

    if let Some(created) = receipt.contract_address {
        if created != deployed.address {
            tracing::warn!(
                expected = %deployed.address,
                receipt = %created,
                "Receipt reports a different contract address"
            );
        }
    }
    tracing::info!(
        contract = %factory.contract_name(),
        address = %deployed.address,
        block = receipt.block_number,
        "{} deployed to: {}",
        factory.contract_name(),
        deployed.address
    );

    tracing::info!(confirmations = plan.final_confirmations, "Waiting for block confirmations");
    let finalized = backend
        .wait_for_confirmations(deployed.tx_hash, plan.final_confirmations)
        .await
        .map_err(DeployError::at(Step::ConfirmationWait))?
        .ok_or(DeployError::ReceiptNotFound(deployed.tx_hash))?;
    stages.advance(DeployStage::Confirmed(finalized.confirmations.max(plan.final_confirmations)));

    let verification = match verifier {
        None => {
            tracing::info!("Verification disabled");
            VerificationOutcome::Skipped
        }
        Some(verifier) => {
            let request = VerificationRequest {
                address: deployed.address,
                constructor_arguments: Vec::new(),
                contract: factory.clone(),
            };
            match verifier.verify(&request).await {
                Ok(status) => {
                    stages.advance(DeployStage::Verified);
                    tracing::info!(status = ?status, "Contract verified successfully");
                    status.into()
                }
                Err(e) => {
                    stages.advance(DeployStage::VerificationFailed);
                    tracing::error!(error = %e, "Verification failed: {}", e);
                    if plan.strict_verification {
                        return Err(DeployError::Verification(e));
                    }
                    VerificationOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        }
    };

    Ok(DeploymentReport {
        deployer,
        contract: factory.contract_name().to_string(),
        address: deployed.address,
        tx_hash: deployed.tx_hash,
        block_number: finalized.block_number,
        gas_used: finalized.gas_used,
        confirmations: finalized.confirmations,
        verification,
        stage: stages.current(),
    })
}

/// Process exit status for a finished run: 0 on success, 1 on failure.
pub fn exit_code(result: &Result<DeploymentReport, DeployError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
