//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (RPC URL, contract address, private key)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contract.rs (ERC-20 reads through the client)
//!     → wallet.rs (key loading, signing)
//!     → transaction.rs (encode, sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contract::TokenContract;
pub use transaction::TxBuilder;
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
