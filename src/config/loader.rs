//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `blockchain.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "GATEWAY_RPC_URL";
/// Overrides `contract.address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "GATEWAY_CONTRACT_ADDRESS";
/// Overrides `wallet.private_key`.
pub const PRIVATE_KEY_ENV_VAR: &str = "GATEWAY_PRIVATE_KEY";
/// Overrides `listener.bind_address`.
pub const BIND_ADDRESS_ENV_VAR: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read and parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the runtime configuration: file (or defaults), then environment
/// overrides, then validation.
pub fn resolve_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    resolve_with(path, |key| std::env::var(key).ok())
}

fn resolve_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from a variable lookup (the process environment in
/// production). Empty values are ignored.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(RPC_URL_ENV_VAR) {
        config.blockchain.rpc_url = url;
    }
    if let Some(address) = get(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = address;
    }
    if let Some(key) = get(PRIVATE_KEY_ENV_VAR) {
        config.wallet.private_key = Some(key);
    }
    if let Some(bind) = get(BIND_ADDRESS_ENV_VAR) {
        config.listener.bind_address = bind;
    }
}
