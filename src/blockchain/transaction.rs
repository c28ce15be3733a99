//! Token transfer construction, signing and submission.
//!
//! Two paths produce the same on-chain effect:
//! - [`TxBuilder::send_contract_transfer`] encodes the call through the
//!   `sol!` binding and lets `EthereumWallet` sign a `TransactionRequest`.
//! - [`TxBuilder::send_raw_transfer`] derives the selector and pads the
//!   arguments by hand, then signs a `TxLegacy` directly.
//!
//! Neither path retries a submission.

use alloy::consensus::{TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contract::TokenContract;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

/// Canonical signature of the ERC-20 transfer function.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// First four bytes of the keccak-256 hash of a function signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Left-pad `bytes` with zeros to one 32-byte ABI word.
///
/// Input longer than 32 bytes keeps its low-order (rightmost) 32 bytes.
pub fn left_pad_word(bytes: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    if bytes.len() >= 32 {
        word.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        word[32 - bytes.len()..].copy_from_slice(bytes);
    }
    word
}

/// Call data for `transfer(to, amount)`: selector ‖ padded address ‖ padded amount.
pub fn encode_transfer_calldata(to: Address, amount: U256) -> Bytes {
    let selector = function_selector(TRANSFER_SIGNATURE);
    let amount_bytes = amount.to_be_bytes_trimmed_vec();

    let mut data = Vec::with_capacity(4 + 32 + 32);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&left_pad_word(to.as_slice()));
    data.extend_from_slice(&left_pad_word(&amount_bytes));
    data.into()
}

/// Builds, signs and submits token transfers from the gateway wallet.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
    token: Address,
}

impl TxBuilder {
    /// Create a new transaction builder for transfers of `token`.
    pub fn new(client: BlockchainClient, wallet: Wallet, token: Address) -> Self {
        Self {
            client,
            wallet,
            token,
        }
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Current gas price with the configured multiplier and ceiling applied.
    pub async fn gas_price(&self) -> BlockchainResult<u128> {
        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        // Check against max gas price
        let config = self.client.config();
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: u64::try_from(gas_price_gwei).unwrap_or(u64::MAX),
                max_gwei: config.max_gas_price_gwei,
            });
        }

        if config.gas_price_multiplier == 1.0 {
            return Ok(gas_price);
        }
        Ok((gas_price as f64 * config.gas_price_multiplier) as u128)
    }

    /// Transfer `amount` of the token to `to` through the contract binding.
    pub async fn send_contract_transfer(&self, to: Address, amount: U256) -> BlockchainResult<TxHash> {
        let from = self.wallet.address();
        let data = TokenContract::transfer_calldata(to, amount);

        let nonce = self.client.get_pending_nonce(from).await?;
        let gas_price = self.gas_price().await?;
        let chain_id = self.client.get_chain_id().await?;

        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(self.token)
            .with_value(U256::ZERO)
            .with_input(data);
        let gas_limit = self.client.estimate_gas(&request).await?;

        let request = request
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_gas_limit(gas_limit)
            .with_chain_id(chain_id.0);

        let envelope: TxEnvelope = request
            .build(&self.wallet.ethereum_wallet())
            .await
            .map_err(|e| BlockchainError::Transaction(format!("Failed to build transfer: {}", e)))?;

        let tx_hash = *envelope.tx_hash();
        self.submit(&envelope, tx_hash).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            to = %to,
            amount = %amount,
            nonce,
            gas_limit,
            "Contract transfer submitted"
        );
        Ok(tx_hash)
    }

    /// Transfer `amount` of the token to `to` with hand-encoded call data.
    pub async fn send_raw_transfer(&self, to: Address, amount: U256) -> BlockchainResult<TxHash> {
        let from = self.wallet.address();

        let nonce = self.client.get_pending_nonce(from).await?;
        let balance = self.client.get_balance(from).await?;
        tracing::info!(from = %from, balance = %balance, "Sender balance");

        let data = encode_transfer_calldata(to, amount);
        tracing::debug!(
            selector = %Bytes::copy_from_slice(&data[..4]),
            "Encoded transfer call data"
        );

        let estimate = TransactionRequest::default()
            .with_from(from)
            .with_to(self.token)
            .with_input(data.clone());
        let gas_limit = self.client.estimate_gas(&estimate).await?;

        let gas_price = self.gas_price().await?;
        let chain_id = self.client.get_chain_id().await?;

        let tx = TxLegacy {
            chain_id: Some(chain_id.0),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(self.token),
            value: U256::ZERO,
            input: data,
        };
        let signed = self.wallet.sign_legacy(tx)?;
        let tx_hash = *signed.hash();
        let envelope = TxEnvelope::from(signed);
        self.submit(&envelope, tx_hash).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            to = %to,
            amount = %amount,
            nonce,
            gas_limit,
            gas_price,
            chain_id = chain_id.0,
            "Raw transfer submitted"
        );
        Ok(tx_hash)
    }

    async fn submit(&self, envelope: &TxEnvelope, tx_hash: TxHash) -> BlockchainResult<()> {
        let encoded = envelope.encoded_2718();
        let reported = self.client.send_raw_transaction(&encoded).await?;
        if reported != tx_hash {
            tracing::warn!(
                expected = %tx_hash,
                reported = %reported,
                "Node reported a different transaction hash"
            );
        }
        Ok(())
    }
}
