//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys come from configuration (file or `GATEWAY_PRIVATE_KEY`)
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, Signed, TxLegacy};
use alloy::network::{EthereumWallet, TxSignerSync};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::WalletConfig;

/// Wallet holding the gateway's signing key.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    ///
    /// # Security
    /// The private key is parsed and stored securely. It is never logged.
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        // Strip 0x prefix if present
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Build the wallet described by configuration, if a key is present.
    pub fn from_config(config: &WalletConfig) -> BlockchainResult<Option<Self>> {
        match config.private_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Self::from_private_key(key).map(Some),
            _ => Ok(None),
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy transaction.
    ///
    /// When `tx.chain_id` is set the signature carries EIP-155 replay
    /// protection.
    pub fn sign_legacy(&self, mut tx: TxLegacy) -> BlockchainResult<Signed<TxLegacy>> {
        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;
        Ok(tx.into_signed(signature))
    }

    /// Network wallet for `TransactionRequest::build`.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
