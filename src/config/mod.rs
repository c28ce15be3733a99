//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets (private key) may come from the environment instead of the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError};
pub use schema::{
    BlockchainConfig, ContractConfig, GatewayConfig, ListenerConfig, ObservabilityConfig,
    TimeoutConfig, TransferConfig, WalletConfig,
};
pub use validation::{validate_config, ValidationError};
