//! Receipt polling against a scripted JSON-RPC node.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lottery_deploy::blockchain::{BlockchainClient, BlockchainError, TxSender, Wallet};
use lottery_deploy::config::NetworkConfig;
use serde_json::{json, Value};

mod common;
use common::{start_programmable_backend, CONTRACT, DEPLOYER, TX_HASH};

const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// How the scripted node answers transaction lookups.
#[derive(Clone, Copy)]
struct NodeScript {
    /// `eth_getTransactionReceipt` returns null for this many calls.
    receipt_after: u32,
    /// `eth_getTransactionByHash` finds the transaction for this many calls.
    known_for: u32,
}

fn mined_receipt() -> Value {
    json!({
        "transactionHash": TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "22".repeat(32)),
        "blockNumber": "0x2a",
        "from": DEPLOYER,
        "to": null,
        "cumulativeGasUsed": "0x12d687",
        "gasUsed": "0x12d687",
        "effectiveGasPrice": "0x3b9aca00",
        "contractAddress": CONTRACT,
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "type": "0x2",
        "status": "0x1"
    })
}

fn pending_transaction() -> Value {
    json!({ "hash": TX_HASH, "from": DEPLOYER, "blockNumber": null })
}

/// Start a node and return its URL plus the receipt lookup counter.
async fn start_node(script: NodeScript) -> (String, Arc<AtomicU32>) {
    let receipt_calls = Arc::new(AtomicU32::new(0));
    let tx_calls = Arc::new(AtomicU32::new(0));
    let receipts = receipt_calls.clone();

    let addr = start_programmable_backend(move |req| {
        let body = req.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
        let call: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let id = call["id"].clone();

        let result = match call["method"].as_str().unwrap_or("") {
            "eth_chainId" => json!("0x7a69"),
            "eth_blockNumber" => json!("0x2e"),
            "eth_getTransactionReceipt" => {
                let n = receipts.fetch_add(1, Ordering::SeqCst);
                if n < script.receipt_after {
                    Value::Null
                } else {
                    mined_receipt()
                }
            }
            "eth_getTransactionByHash" => {
                let n = tx_calls.fetch_add(1, Ordering::SeqCst);
                if n < script.known_for {
                    pending_transaction()
                } else {
                    Value::Null
                }
            }
            other => {
                let error = json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": format!("method {} not found", other) }
                });
                return (200, error.to_string());
            }
        };

        (200, json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string())
    })
    .await;

    (format!("http://{}", addr), receipt_calls)
}

async fn sender_for(rpc_url: String) -> TxSender {
    let config = NetworkConfig {
        name: "scripted".to_string(),
        rpc_url,
        chain_id: Some(31337),
        rpc_timeout_secs: 5,
        poll_interval_ms: 20,
    };
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let client = BlockchainClient::connect(config, &wallet).await.unwrap();
    TxSender::new(client)
}

#[tokio::test]
async fn test_waits_through_slow_indexing() {
    // The node neither has a receipt nor knows the hash for the first polls.
    let (url, receipt_calls) = start_node(NodeScript {
        receipt_after: 3,
        known_for: 0,
    })
    .await;
    let sender = sender_for(url).await;

    let receipt = sender
        .wait_for_confirmations(TX_HASH, 5, Some(Duration::from_secs(10)))
        .await
        .unwrap()
        .expect("receipt once the node catches up");

    assert_eq!(receipt.tx_hash, TX_HASH);
    assert_eq!(receipt.block_number, 42);
    assert_eq!(receipt.contract_address, Some(CONTRACT));
    assert_eq!(receipt.confirmations, 5);
    assert_eq!(receipt_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_pending_transaction_that_disappears_is_missing() {
    let (url, _) = start_node(NodeScript {
        receipt_after: u32::MAX,
        known_for: 2,
    })
    .await;
    let sender = sender_for(url).await;

    let result = sender
        .wait_for_confirmations(TX_HASH, 1, Some(Duration::from_secs(10)))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_never_indexed_transaction_times_out() {
    let (url, receipt_calls) = start_node(NodeScript {
        receipt_after: u32::MAX,
        known_for: 0,
    })
    .await;
    let sender = sender_for(url).await;

    let err = sender
        .wait_for_confirmations(TX_HASH, 1, Some(Duration::from_millis(300)))
        .await
        .unwrap_err();

    assert!(matches!(err, BlockchainError::ConfirmationTimeout(1)));
    assert!(receipt_calls.load(Ordering::SeqCst) > 1);
}
