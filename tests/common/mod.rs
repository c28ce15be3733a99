//! Shared utilities for integration testing: an in-process JSON-RPC node
//! and a gateway bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{hex, keccak256, U256};
use alloy::sol_types::{SolCall, SolValue};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use token_gateway::blockchain::contract::IERC20;
use token_gateway::config::GatewayConfig;
use token_gateway::http::HttpServer;
use token_gateway::lifecycle::Shutdown;

pub const CHAIN_ID: u64 = 1337;
pub const NONCE: u64 = 5;
pub const GAS_PRICE: u64 = 1_000_000_000;
pub const GAS_LIMIT: u64 = 51_234;
pub const TOKEN_NAME: &str = "Gateway Token";
pub const TOKEN_SYMBOL: &str = "GWT";
pub const TOKEN_DECIMALS: u8 = 18;
pub const TOTAL_SUPPLY: u64 = 1_000_000;
pub const HOLDER_BALANCE: u64 = 4_200;
pub const ALLOWANCE: u64 = 750;

pub const TOKEN_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
// Anvil's first account
pub const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Port where nothing listens.
pub const DEAD_RPC_URL: &str = "http://127.0.0.1:9";

/// What the mock node has seen, and knobs to change its answers.
pub struct NodeState {
    pub raw_transactions: Mutex<Vec<Vec<u8>>>,
    pub estimate_requests: Mutex<Vec<Value>>,
    pub has_code: AtomicBool,
    pub gas_price: AtomicU64,
    /// Delay before every answer, in milliseconds.
    pub delay_ms: AtomicU64,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            raw_transactions: Mutex::new(Vec::new()),
            estimate_requests: Mutex::new(Vec::new()),
            has_code: AtomicBool::new(true),
            gas_price: AtomicU64::new(GAS_PRICE),
            delay_ms: AtomicU64::new(0),
        }
    }
}

pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<NodeState>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn raw_transactions(&self) -> Vec<Vec<u8>> {
        self.state.raw_transactions.lock().unwrap().clone()
    }

    pub fn estimate_requests(&self) -> Vec<Value> {
        self.state.estimate_requests.lock().unwrap().clone()
    }
}

/// Start a JSON-RPC node answering the calls the gateway makes.
pub async fn start_mock_node() -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(NodeState::default());

    let app = Router::new()
        .route("/", post(handle_rpc))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, state }
}

/// Start a node that accepts connections but never answers.
pub async fn start_hanging_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("http://{}", addr)
}

fn quantity(value: u64) -> Value {
    json!(format!("{:#x}", value))
}

fn call_input(params: &Value) -> Vec<u8> {
    let tx = &params[0];
    let input = tx["input"].as_str().or_else(|| tx["data"].as_str()).unwrap_or("0x");
    hex::decode(input).unwrap_or_default()
}

fn erc20_call(input: &[u8]) -> Option<Vec<u8>> {
    if input.len() < 4 {
        return None;
    }
    let selector: [u8; 4] = input[..4].try_into().ok()?;

    let output = if selector == IERC20::nameCall::SELECTOR {
        TOKEN_NAME.to_string().abi_encode()
    } else if selector == IERC20::symbolCall::SELECTOR {
        TOKEN_SYMBOL.to_string().abi_encode()
    } else if selector == IERC20::decimalsCall::SELECTOR {
        U256::from(TOKEN_DECIMALS).abi_encode()
    } else if selector == IERC20::totalSupplyCall::SELECTOR {
        U256::from(TOTAL_SUPPLY).abi_encode()
    } else if selector == IERC20::balanceOfCall::SELECTOR {
        U256::from(HOLDER_BALANCE).abi_encode()
    } else if selector == IERC20::allowanceCall::SELECTOR {
        U256::from(ALLOWANCE).abi_encode()
    } else {
        return None;
    };
    Some(output)
}

async fn handle_rpc(State(state): State<Arc<NodeState>>, Json(request): Json<Value>) -> Json<Value> {
    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let id = request["id"].clone();
    let params = &request["params"];

    let result = match request["method"].as_str().unwrap_or_default() {
        "eth_chainId" => quantity(CHAIN_ID),
        "eth_getTransactionCount" => quantity(NONCE),
        "eth_getBalance" => json!("0xde0b6b3a7640000"),
        "eth_gasPrice" => quantity(state.gas_price.load(Ordering::SeqCst)),
        "eth_estimateGas" => {
            state.estimate_requests.lock().unwrap().push(params[0].clone());
            quantity(GAS_LIMIT)
        }
        "eth_getCode" => {
            if state.has_code.load(Ordering::SeqCst) {
                json!("0x6080604052")
            } else {
                json!("0x")
            }
        }
        "eth_call" => match erc20_call(&call_input(params)) {
            Some(output) => json!(hex::encode_prefixed(output)),
            None => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": 3, "message": "execution reverted" }
                }))
            }
        },
        "eth_sendRawTransaction" => {
            let raw = hex::decode(params[0].as_str().unwrap_or("0x")).unwrap_or_default();
            let hash = keccak256(&raw);
            state.raw_transactions.lock().unwrap().push(raw);
            json!(hex::encode_prefixed(hash))
        }
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "method not found" }
            }))
        }
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

/// Configuration pointing at `rpc_url`, with the test wallet and token.
pub fn gateway_config(rpc_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.blockchain.rpc_url = rpc_url.to_string();
    config.blockchain.rpc_timeout_secs = 5;
    config.contract.address = TOKEN_ADDRESS.to_string();
    config.wallet.private_key = Some(TEST_PRIVATE_KEY.to_string());
    config.observability.metrics_enabled = false;
    config
}

/// Start a gateway on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).await.expect("gateway should start");
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (format!("http://{}", addr), shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
