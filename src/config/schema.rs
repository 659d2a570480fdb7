//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a deployment run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Network the contract is deployed to.
    pub network: NetworkConfig,

    /// What to deploy and how long to wait for it.
    pub deployment: DeploymentConfig,

    /// Block explorer verification settings.
    pub verification: VerificationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network (JSON-RPC) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Human-readable network name, used in logs and the report.
    pub name: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID. When set, a node reporting another chain is rejected.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "localhost".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: None,
            rpc_timeout_secs: 30,
            poll_interval_ms: 2000,
        }
    }
}

/// Deployment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Name of the compiled contract to deploy.
    pub contract: String,

    /// Root of the Hardhat artifacts tree.
    pub artifacts_dir: String,

    /// Confirmations that count as "mined" (first wait).
    pub receipt_confirmations: u64,

    /// Confirmations required before verification (second wait).
    pub final_confirmations: u64,

    /// Upper bound for each confirmation wait. `None` waits indefinitely.
    pub wait_timeout_secs: Option<u64>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            contract: "ScratchLotteryV2".to_string(),
            artifacts_dir: "artifacts".to_string(),
            receipt_confirmations: 1,
            final_confirmations: 5,
            wait_timeout_secs: None,
        }
    }
}

/// Explorer verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Submit the source for verification after deployment.
    pub enabled: bool,

    /// Etherscan-compatible API endpoint.
    pub api_url: String,

    /// Environment variable holding the explorer API key.
    pub api_key_env: String,

    /// Interval between verification status checks in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum number of status checks before giving up.
    pub max_status_checks: u32,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Treat a verification failure as a failed run.
    pub strict: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.etherscan.io/v2/api".to_string(),
            api_key_env: "ETHERSCAN_API_KEY".to_string(),
            poll_interval_ms: 3000,
            max_status_checks: 20,
            request_timeout_secs: 30,
            strict: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
