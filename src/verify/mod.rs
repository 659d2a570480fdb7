//! Block explorer source verification.
//!
//! # Data Flow
//! ```text
//! deployed address + constructor args + artifact
//!     → etherscan.rs (already verified? → submit → poll status)
//!     → VerificationStatus
//! ```
//!
//! # Design Decisions
//! - Verification never aborts a deployment; callers downgrade errors
//! - API key comes from the environment; a missing key fails at verify time

pub mod etherscan;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::artifact::{ArtifactError, ContractFactory};

pub use etherscan::EtherscanVerifier;

/// What to verify.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Address the contract was deployed to.
    pub address: Address,
    /// Constructor arguments used for the deployment.
    pub constructor_arguments: Vec<DynSolValue>,
    /// Factory the contract was deployed from.
    pub contract: ContractFactory,
}

/// Successful verification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    AlreadyVerified,
}

/// Errors that can occur while verifying.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Explorer API key not set (environment variable {0})")]
    MissingApiKey(String),

    /// The request URL (which carries the API key) is stripped.
    #[error("Explorer request failed: {0}")]
    Http(reqwest::Error),

    #[error("Explorer API error: {0}")]
    Api(String),

    #[error("Verification rejected: {0}")]
    Rejected(String),

    #[error("Verification still pending after {0} status checks")]
    StillPending(u32),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to encode verification request: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(e: reqwest::Error) -> Self {
        VerifyError::Http(e.without_url())
    }
}

/// Result type for verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Submits deployed contracts for source verification.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> VerifyResult<VerificationStatus>;
}
