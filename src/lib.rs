//! Contract deployment and explorer verification.

pub mod artifact;
pub mod blockchain;
pub mod config;
pub mod deploy;
pub mod observability;
pub mod verify;

pub use config::DeployConfig;
pub use deploy::{run_deployment, DeployBackend, DeployError, DeployPlan, DeploymentReport};
pub use verify::{Verifier, VerificationRequest};
