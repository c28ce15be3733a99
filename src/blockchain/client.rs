//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint (primary + failovers)
//! - Query chain state (chain id, balances, nonces, gas, code)
//! - Execute read-only calls and submit signed transactions
//! - Handle timeouts and network errors gracefully

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// How the last provider attempt failed.
enum Failure {
    Rpc(String),
    Timeout,
}

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// Construction never contacts the node except for the optional chain ID
    /// check, whose failure is only logged.
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        if config.chain_id.is_some() {
            match client.verify_chain_id().await {
                Ok(()) => {
                    tracing::info!(
                        rpc_url = %config.rpc_url,
                        chain_id = ?config.chain_id,
                        "Blockchain client initialized"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Blockchain client initialized but chain verification failed"
                    );
                    // Don't fail initialization - allow graceful degradation
                }
            }
        } else {
            tracing::info!(rpc_url = %config.rpc_url, "Blockchain client initialized");
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != expected {
            return Err(BlockchainError::ChainMismatch {
                expected,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Run one RPC against each provider in turn until one answers.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_failure = Failure::Rpc("no providers configured".to_string());

        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_call(method, "ok");
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    metrics::record_rpc_call(method, "error");
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                    last_failure = Failure::Rpc(e.to_string());
                }
                Err(_) => {
                    metrics::record_rpc_call(method, "timeout");
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                    last_failure = Failure::Timeout;
                }
            }
        }

        match last_failure {
            Failure::Timeout => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
            Failure::Rpc(e) => Err(BlockchainError::Rpc(format!(
                "All RPC providers failed {}: {}",
                method, e
            ))),
        }
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the native balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("eth_getBalance", |p| async move { p.get_balance(address).await })
            .await
    }

    /// Get the pending transaction count (nonce) for an address.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    /// Estimate the gas limit for a transaction.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        self.with_failover("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    /// Execute a read-only call and return the raw output.
    pub async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes> {
        self.with_failover("eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    /// Get the deployed bytecode at an address.
    pub async fn get_code(&self, address: Address) -> BlockchainResult<Bytes> {
        self.with_failover("eth_getCode", |p| async move { p.get_code_at(address).await })
            .await
    }

    /// Submit a signed, 2718-encoded transaction and return its hash as
    /// reported by the node.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> BlockchainResult<TxHash> {
        self.with_failover("eth_sendRawTransaction", |p| async move {
            p.send_raw_transaction(encoded)
                .await
                .map(|pending| *pending.tx_hash())
        })
        .await
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
