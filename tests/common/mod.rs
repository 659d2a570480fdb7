//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{address, b256, bytes, Address, TxHash};
use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

use lottery_deploy::artifact::{ContractArtifact, ContractFactory};
use lottery_deploy::blockchain::{BlockchainError, DeployedContract, DeploymentReceipt};
use lottery_deploy::deploy::{BackendError, DeployBackend};
use lottery_deploy::verify::{
    VerificationRequest, VerificationStatus, Verifier, VerifyError, VerifyResult,
};

/// Anvil's first account.
pub const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// `DEPLOYER.create(0)`.
pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const TX_HASH: TxHash =
    b256!("1111111111111111111111111111111111111111111111111111111111111111");

pub fn lottery_artifact() -> ContractArtifact {
    ContractArtifact {
        name: "ScratchLotteryV2".to_string(),
        source_name: "contracts/ScratchLotteryV2.sol".to_string(),
        abi: JsonAbi::default(),
        bytecode: bytes!("6080604052348015600f57600080fd5b50"),
        path: "artifacts/contracts/ScratchLotteryV2.sol/ScratchLotteryV2.json".into(),
    }
}

fn rpc_error(msg: &str) -> BackendError {
    BackendError::Blockchain(BlockchainError::Rpc(msg.to_string()))
}

/// What the scripted backend should do at each step.
#[derive(Debug, Default, Clone)]
pub struct Script {
    pub fail_signer: bool,
    pub fail_factory: bool,
    pub fail_deploy: bool,
    pub missing_receipt: bool,
    pub fail_confirmations: bool,
}

/// Backend that follows a [`Script`] and counts every call.
#[derive(Debug, Default)]
pub struct MockBackend {
    script: Script,
    pub signer_calls: AtomicU32,
    pub factory_calls: AtomicU32,
    pub deploy_calls: AtomicU32,
    pub receipt_calls: AtomicU32,
    pub confirmation_calls: AtomicU32,
    /// Call order, by method name.
    pub log: Mutex<Vec<&'static str>>,
    pub deploy_args: Mutex<Option<Vec<DynSolValue>>>,
    pub waited_for: Mutex<Vec<u64>>,
}

impl MockBackend {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    fn record(&self, counter: &AtomicU32, name: &'static str) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(name);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }

    fn receipt(confirmations: u64) -> DeploymentReceipt {
        DeploymentReceipt {
            tx_hash: TX_HASH,
            block_number: 42,
            contract_address: Some(CONTRACT),
            gas_used: 1_234_567,
            confirmations,
        }
    }
}

#[async_trait]
impl DeployBackend for MockBackend {
    async fn signer(&self) -> Result<Address, BackendError> {
        self.record(&self.signer_calls, "signer");
        if self.script.fail_signer {
            return Err(BackendError::Blockchain(BlockchainError::Wallet(
                "Environment variable DEPLOYER_PRIVATE_KEY not set".to_string(),
            )));
        }
        Ok(DEPLOYER)
    }

    async fn contract_factory(&self, name: &str) -> Result<ContractFactory, BackendError> {
        self.record(&self.factory_calls, "contract_factory");
        if self.script.fail_factory {
            return Err(BackendError::Artifact(
                lottery_deploy::artifact::ArtifactError::NotFound {
                    name: name.to_string(),
                    root: "artifacts".into(),
                },
            ));
        }
        Ok(ContractFactory::new(lottery_artifact()))
    }

    async fn deploy(
        &self,
        _factory: &ContractFactory,
        constructor_args: &[DynSolValue],
    ) -> Result<DeployedContract, BackendError> {
        self.record(&self.deploy_calls, "deploy");
        *self.deploy_args.lock().unwrap() = Some(constructor_args.to_vec());
        if self.script.fail_deploy {
            return Err(rpc_error("insufficient funds for gas * price + value"));
        }
        Ok(DeployedContract {
            address: CONTRACT,
            tx_hash: TX_HASH,
            nonce: 0,
        })
    }

    async fn wait_for_receipt(
        &self,
        _tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError> {
        self.record(&self.receipt_calls, "wait_for_receipt");
        self.waited_for.lock().unwrap().push(confirmations);
        if self.script.missing_receipt {
            return Ok(None);
        }
        Ok(Some(Self::receipt(confirmations)))
    }

    async fn wait_for_confirmations(
        &self,
        _tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Option<DeploymentReceipt>, BackendError> {
        self.record(&self.confirmation_calls, "wait_for_confirmations");
        self.waited_for.lock().unwrap().push(confirmations);
        if self.script.fail_confirmations {
            return Err(rpc_error("connection reset by peer"));
        }
        Ok(Some(Self::receipt(confirmations)))
    }
}

/// Verifier that records what it was asked to verify.
#[derive(Debug, Default)]
pub struct MockVerifier {
    pub fail: bool,
    pub calls: AtomicU32,
    pub seen: Mutex<Option<(Address, Vec<DynSolValue>)>>,
}

impl MockVerifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Verifier for MockVerifier {
    async fn verify(&self, request: &VerificationRequest) -> VerifyResult<VerificationStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some((request.address, request.constructor_arguments.clone()));
        if self.fail {
            return Err(VerifyError::Rejected("Fail - Unable to verify".to_string()));
        }
        Ok(VerificationStatus::Verified)
    }
}

/// In-memory log sink for asserting on formatted `tracing` output.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Plain-text subscriber writing into this capture.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Start a programmable HTTP server on an ephemeral port.
///
/// The handler receives the raw request (request line, headers and body)
/// and returns a status code and JSON body.
pub async fn start_programmable_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = handler(&request);
                        let status_text = match status {
                            200 => "200 OK",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a Hardhat artifact tree for ScratchLotteryV2 (artifact, debug file
/// and build info) under `root`.
pub fn write_artifact_tree(root: &Path) {
    let contract_dir = root.join("contracts/ScratchLotteryV2.sol");
    std::fs::create_dir_all(&contract_dir).unwrap();
    std::fs::create_dir_all(root.join("build-info")).unwrap();

    std::fs::write(
        contract_dir.join("ScratchLotteryV2.json"),
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "ScratchLotteryV2",
            "sourceName": "contracts/ScratchLotteryV2.sol",
            "abi": [
                { "type": "constructor", "inputs": [], "stateMutability": "nonpayable" }
            ],
            "bytecode": "0x6080604052348015600f57600080fd5b50",
            "deployedBytecode": "0x6080604052",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
        .to_string(),
    )
    .unwrap();

    std::fs::write(
        contract_dir.join("ScratchLotteryV2.dbg.json"),
        json!({ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/0f1e.json" }).to_string(),
    )
    .unwrap();

    std::fs::write(
        root.join("build-info/0f1e.json"),
        json!({
            "id": "0f1e",
            "_format": "hh-sol-build-info-1",
            "solcVersion": "0.8.24",
            "solcLongVersion": "0.8.24+commit.e11b9ed9",
            "input": {
                "language": "Solidity",
                "sources": {
                    "contracts/ScratchLotteryV2.sol": { "content": "contract ScratchLotteryV2 {}" }
                },
                "settings": { "optimizer": { "enabled": true, "runs": 200 } }
            },
            "output": {}
        })
        .to_string(),
    )
    .unwrap();
}
