//! Run summary.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

use crate::deploy::DeployStage;
use crate::verify::VerificationStatus;

/// What happened to source verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum VerificationOutcome {
    Skipped,
    Verified,
    AlreadyVerified,
    Failed { reason: String },
}

impl From<VerificationStatus> for VerificationOutcome {
    fn from(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Verified => VerificationOutcome::Verified,
            VerificationStatus::AlreadyVerified => VerificationOutcome::AlreadyVerified,
        }
    }
}

impl VerificationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, VerificationOutcome::Failed { .. })
    }
}

/// Result of a successful deployment run.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub deployer: Address,
    pub contract: String,
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub confirmations: u64,
    pub verification: VerificationOutcome,
    pub stage: DeployStage,
}
