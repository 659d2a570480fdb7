//! Deployment procedure.
//!
//! # Data Flow
//! ```text
//! DeployBackend (signer, factory, deploy, waits)
//!     → procedure.rs (strictly sequential run, one call per step)
//!     → Verifier (optional, failures downgraded)
//!     → DeploymentReport | DeployError → exit code
//! ```
//!
//! # Design Decisions
//! - The chain and artifact access sit behind a trait so runs can be driven
//!   by a scripted backend in tests
//! - No retries: every backend call happens at most once per run
//! - A missing receipt is a typed error, not a null check

pub mod backend;
pub mod procedure;
pub mod report;
pub mod stage;

use std::fmt;

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::blockchain::BlockchainError;
use crate::verify::VerifyError;

pub use backend::{AlloyBackend, DeployBackend};
pub use procedure::{exit_code, run_deployment, DeployPlan};
pub use report::{DeploymentReport, VerificationOutcome};
pub use stage::{DeployStage, StageTracker};

/// Failure raised by a backend step.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Which step of the run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Signer,
    ContractFactory,
    Deploy,
    ReceiptWait,
    ConfirmationWait,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Signer => "signer retrieval",
            Step::ContractFactory => "contract factory",
            Step::Deploy => "deployment",
            Step::ReceiptWait => "receipt wait",
            Step::ConfirmationWait => "confirmation wait",
        };
        f.write_str(name)
    }
}

/// Errors that fail a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: BackendError,
    },

    #[error("Deployment transaction receipt not found ({0})")]
    ReceiptNotFound(TxHash),

    /// Only raised when verification is configured as strict.
    #[error("Verification failed: {0}")]
    Verification(#[source] VerifyError),
}

impl DeployError {
    pub(crate) fn at(step: Step) -> impl FnOnce(BackendError) -> DeployError {
        move |source| DeployError::Step { step, source }
    }

    /// The failed step, if the failure came from the backend.
    pub fn step(&self) -> Option<Step> {
        match self {
            DeployError::Step { step, .. } => Some(*step),
            DeployError::ReceiptNotFound(_) => Some(Step::ReceiptWait),
            DeployError::Verification(_) => None,
        }
    }
}
