//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multiplier > 0)
//! - Check that addresses, URLs and amounts parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address: {}", config.listener.bind_address, e),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if let Err(e) = url::Url::parse(&config.blockchain.rpc_url) {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a URL: {}", config.blockchain.rpc_url, e),
        ));
    }

    for url in &config.blockchain.failover_urls {
        if url::Url::parse(url).is_err() {
            errors.push(ValidationError::new(
                "blockchain.failover_urls",
                format!("'{}' is not a URL", url),
            ));
        }
    }

    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.rpc_timeout_secs",
            "must be greater than 0",
        ));
    }

    // One node call may wait on every provider in turn
    let providers = 1 + config.blockchain.failover_urls.len() as u64;
    let call_budget = config.blockchain.rpc_timeout_secs.saturating_mul(providers);
    if config.timeouts.request_secs > 0 && config.timeouts.request_secs < call_budget {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "{}s is shorter than one node call across {} provider(s) ({}s)",
                config.timeouts.request_secs, providers, call_budget
            ),
        ));
    }

    if !(config.blockchain.gas_price_multiplier.is_finite()
        && config.blockchain.gas_price_multiplier > 0.0)
    {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be a positive number",
        ));
    }

    if config.contract.address.trim().is_empty() {
        errors.push(ValidationError::new("contract.address", "is required"));
    } else if let Err(e) = Address::from_str(config.contract.address.trim()) {
        errors.push(ValidationError::new(
            "contract.address",
            format!("'{}' is not an address: {}", config.contract.address, e),
        ));
    }

    if parse_amount(&config.transfer.contract_amount).is_none() {
        errors.push(ValidationError::new(
            "transfer.contract_amount",
            format!("'{}' is not a decimal amount", config.transfer.contract_amount),
        ));
    }

    if parse_amount(&config.transfer.raw_amount).is_none() {
        errors.push(ValidationError::new(
            "transfer.raw_amount",
            format!("'{}' is not a decimal amount", config.transfer.raw_amount),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a decimal token amount. Only ASCII digits are accepted.
pub fn parse_amount(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(raw, 10).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.contract.address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_requires_contract() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "contract.address");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.blockchain.rpc_url = "::::".to_string();
        config.blockchain.rpc_timeout_secs = 0;
        config.blockchain.gas_price_multiplier = 0.0;
        config.contract.address = "0x1234".to_string();
        config.transfer.raw_amount = "ten".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "blockchain.rpc_url",
                "blockchain.rpc_timeout_secs",
                "blockchain.gas_price_multiplier",
                "contract.address",
                "transfer.raw_amount",
            ]
        );
    }

    #[test]
    fn test_request_deadline_covers_provider_timeouts() {
        let mut config = valid_config();
        config.blockchain.rpc_timeout_secs = 2;
        config.blockchain.failover_urls = vec!["http://127.0.0.1:8546".to_string()];
        config.timeouts.request_secs = 3;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "timeouts.request_secs");

        config.timeouts.request_secs = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nope".to_string();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10"), Some(U256::from(10)));
        assert_eq!(parse_amount(" 0 "), Some(U256::ZERO));
        assert_eq!(
            parse_amount("1000000000000000000000"),
            Some(U256::from(10u128.pow(21)))
        );
        assert_eq!(parse_amount("-1"), None);
        assert_eq!(parse_amount("0x10"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("1_0"), None);
        assert_eq!(parse_amount("+5"), None);
    }

    #[test]
    fn test_empty_amount_rejected() {
        let mut config = valid_config();
        config.transfer.raw_amount = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "transfer.raw_amount");
    }
}
