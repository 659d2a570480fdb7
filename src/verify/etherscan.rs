//! Etherscan-compatible verification client (v2 multichain API).

use std::time::Duration;

use alloy::primitives::{hex, Address};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::config::VerificationConfig;
use crate::verify::{VerificationRequest, VerificationStatus, Verifier, VerifyError, VerifyResult};

const PENDING: &str = "pending in queue";
const PASS: &str = "pass - verified";
const ALREADY_VERIFIED: &str = "already verified";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

impl ApiResponse {
    fn ok(&self) -> bool {
        self.status == "1"
    }

    fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            Value::Null => self.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Outcome of one `checkverifystatus` poll.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CheckStatus {
    Pending,
    Done(VerificationStatus),
    Failed(String),
}

fn classify_status(response: &ApiResponse) -> CheckStatus {
    let text = response.result_text();
    let lower = text.to_lowercase();
    if lower.contains(PENDING) {
        CheckStatus::Pending
    } else if lower.contains(ALREADY_VERIFIED) {
        CheckStatus::Done(VerificationStatus::AlreadyVerified)
    } else if response.ok() && lower.contains(PASS) {
        CheckStatus::Done(VerificationStatus::Verified)
    } else {
        CheckStatus::Failed(text)
    }
}

/// Verifier backed by an Etherscan-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct EtherscanVerifier {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    api_key_env: String,
    chain_id: u64,
    poll_interval: Duration,
    max_status_checks: u32,
}

impl EtherscanVerifier {
    /// Build a verifier for `chain_id`, reading the API key from the
    /// environment variable named in the config.
    pub fn from_config(config: &VerificationConfig, chain_id: u64) -> VerifyResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(config, chain_id, api_key)
    }

    pub fn new(config: &VerificationConfig, chain_id: u64, api_key: Option<String>) -> VerifyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            chain_id,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_status_checks: config.max_status_checks,
        })
    }

    fn api_key(&self) -> VerifyResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| VerifyError::MissingApiKey(self.api_key_env.clone()))
    }

    async fn get(&self, params: &[(&str, &str)]) -> VerifyResult<ApiResponse> {
        let chain_id = self.chain_id.to_string();
        let response = self
            .http
            .get(&self.api_url)
            .query(&[("chainid", chain_id.as_str()), ("apikey", self.api_key()?)])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Whether the explorer already shows source for `address`.
    pub async fn is_verified(&self, address: Address) -> VerifyResult<bool> {
        let address = address.to_string();
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
            ])
            .await?;

        if !response.ok() {
            return Err(VerifyError::Api(response.result_text()));
        }

        let source = response
            .result
            .get(0)
            .and_then(|entry| entry.get("SourceCode"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(!source.is_empty())
    }

    /// Submit the source; returns the explorer's job GUID, or `None` when the
    /// explorer reports the source as already verified.
    async fn submit(&self, request: &VerificationRequest) -> VerifyResult<Option<String>> {
        let artifact = request.contract.artifact();
        let build_info = artifact.build_info()?;
        let source_code = serde_json::to_string(&build_info.input)
            .map_err(|e| VerifyError::Encoding(e.to_string()))?;
        let constructor_args = request
            .contract
            .encode_constructor_args(&request.constructor_arguments)?;

        let address = request.address.to_string();
        let contract_name = artifact.fully_qualified_name();
        let compiler_version = format!("v{}", build_info.solc_long_version);
        let encoded_args = hex::encode(&constructor_args);
        let chain_id = self.chain_id.to_string();

        let form = [
            ("apikey", self.api_key()?),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", source_code.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", contract_name.as_str()),
            ("compilerversion", compiler_version.as_str()),
            // Misspelling is part of the Etherscan API.
            ("constructorArguements", encoded_args.as_str()),
        ];

        let response: ApiResponse = self
            .http
            .post(&self.api_url)
            .query(&[("chainid", chain_id.as_str())])
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response.result_text();
        if response.ok() {
            return Ok(Some(text));
        }
        if text.to_lowercase().contains(ALREADY_VERIFIED) {
            return Ok(None);
        }
        Err(VerifyError::Rejected(text))
    }

    async fn check_status(&self, guid: &str) -> VerifyResult<CheckStatus> {
        let response = self
            .get(&[
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .await?;
        Ok(classify_status(&response))
    }
}

#[async_trait]
impl Verifier for EtherscanVerifier {
    async fn verify(&self, request: &VerificationRequest) -> VerifyResult<VerificationStatus> {
        if self.is_verified(request.address).await? {
            tracing::info!(address = %request.address, "Source already published");
            return Ok(VerificationStatus::AlreadyVerified);
        }

        let Some(guid) = self.submit(request).await? else {
            return Ok(VerificationStatus::AlreadyVerified);
        };
        tracing::info!(address = %request.address, guid = %guid, "Verification submitted");

        for check in 1..=self.max_status_checks {
            sleep(self.poll_interval).await;
            match self.check_status(&guid).await? {
                CheckStatus::Pending => {
                    tracing::debug!(guid = %guid, check, "Verification pending");
                }
                CheckStatus::Done(status) => return Ok(status),
                CheckStatus::Failed(reason) => return Err(VerifyError::Rejected(reason)),
            }
        }

        Err(VerifyError::StillPending(self.max_status_checks))
    }
}
