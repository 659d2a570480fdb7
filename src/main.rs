//! lottery-deploy
//!
//! Deploys a compiled contract, waits for it to settle and submits its
//! source to a block explorer.
//!
//! # Run Overview
//!
//! ```text
//!   deploy.toml + env (DEPLOYER_PRIVATE_KEY, ETHERSCAN_API_KEY)
//!        │
//!        ▼
//!   ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────┐
//!   │  signer  │──▶│  factory   │──▶│  deploy  │──▶│ wait 1 / 5  │──▶│  verify  │
//!   └──────────┘   └────────────┘   └──────────┘   └─────────────┘   └──────────┘
//!        any failure here ──────────────────────────────▶ exit 1      failure logged,
//!                                                                     exit 0
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::Instrument;
use uuid::Uuid;

use lottery_deploy::artifact::ArtifactStore;
use lottery_deploy::blockchain::{BlockchainClient, Wallet};
use lottery_deploy::config::{load_config, load_config_or_default, validation, ConfigError, DeployConfig};
use lottery_deploy::deploy::{exit_code, run_deployment, AlloyBackend, DeployPlan, DeploymentReport};
use lottery_deploy::observability::init_logging;
use lottery_deploy::verify::{EtherscanVerifier, Verifier};

const DEFAULT_CONFIG: &str = "deploy.toml";

#[derive(Parser)]
#[command(name = "lottery-deploy")]
#[command(about = "Deploy a compiled contract and verify it on a block explorer", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Override network.rpc_url.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override deployment.contract.
    #[arg(long)]
    contract: Option<String>,

    /// Skip explorer verification.
    #[arg(long)]
    no_verify: bool,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn load(&self) -> Result<DeployConfig, ConfigError> {
        let mut config = if self.config.as_os_str() == DEFAULT_CONFIG {
            load_config_or_default(&self.config)?
        } else {
            load_config(&self.config)?
        };

        if let Some(url) = &self.rpc_url {
            config.network.rpc_url = url.clone();
        }
        if let Some(contract) = &self.contract {
            config.deployment.contract = contract.clone();
        }
        if self.no_verify {
            config.verification.enabled = false;
        }

        validation::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("deploy", run_id = %run_id, network = %config.network.name);

    let result = execute(&config).instrument(span).await;
    let code = exit_code(&result);

    match result {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!(error = %e, "Failed to serialize report"),
                }
            } else {
                print_summary(&report);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Deployment failed");
        }
    }

    ExitCode::from(code)
}

/// Connect, deploy and verify. Setup failures surface as the signer step.
async fn execute(config: &DeployConfig) -> Result<DeploymentReport, lottery_deploy::DeployError> {
    use lottery_deploy::deploy::{BackendError, DeployError, Step};

    let wallet = Wallet::from_env()
        .map_err(|e| DeployError::Step { step: Step::Signer, source: BackendError::from(e) })?;
    let client = BlockchainClient::connect(config.network.clone(), &wallet)
        .await
        .map_err(|e| DeployError::Step { step: Step::Signer, source: BackendError::from(e) })?;

    let verifier = if config.verification.enabled {
        match EtherscanVerifier::from_config(&config.verification, client.chain_id().0) {
            Ok(verifier) => Some(verifier),
            Err(e) => {
                tracing::error!(error = %e, "Verification failed: could not build explorer client");
                None
            }
        }
    } else {
        None
    };

    let backend = AlloyBackend::new(
        wallet,
        client,
        ArtifactStore::new(&config.deployment.artifacts_dir),
        config.deployment.wait_timeout_secs.map(Duration::from_secs),
    );

    let plan = DeployPlan::from_config(config);
    run_deployment(&backend, verifier.as_ref().map(|v| v as &dyn Verifier), &plan).await
}

fn print_summary(report: &DeploymentReport) {
    tracing::info!(
        contract = %report.contract,
        address = %report.address,
        tx_hash = %report.tx_hash,
        block = report.block_number,
        gas_used = report.gas_used,
        confirmations = report.confirmations,
        verification = ?report.verification,
        "Deployment complete"
    );
}
