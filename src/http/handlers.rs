//! Request handlers.
//!
//! Each handler performs a fixed sequence of node calls and writes either a
//! plain-text body or the raw 32 bytes of a transaction hash.

use std::str::FromStr;

use alloy::primitives::{Address, TxHash};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Query string of the transfer endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TransferQuery {
    pub to_address: Option<String>,
}

/// Query string of `/contract/balance`.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    pub address: Option<String>,
}

/// Query string of `/contract/allowance`.
#[derive(Debug, Default, Deserialize)]
pub struct AllowanceQuery {
    pub owner: Option<String>,
    pub spender: Option<String>,
}

/// Parse a required address query parameter.
pub fn parse_address(param: &'static str, raw: Option<&str>) -> Result<Address, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParameter(param))?;

    Address::from_str(raw).map_err(|e| ApiError::InvalidAddress {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn hash_response(hash: TxHash) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        hash.to_vec(),
    )
        .into_response()
}

/// `GET /health` never touches the node.
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /chain`
pub async fn chain_id(State(state): State<AppState>) -> Result<String, ApiError> {
    let chain_id = state.client.get_chain_id().await?;
    Ok(chain_id.to_string())
}

/// `GET /contract`
pub async fn contract_status(State(state): State<AppState>) -> Result<Response, ApiError> {
    if state.token.is_deployed().await? {
        Ok((StatusCode::OK, "success").into_response())
    } else {
        tracing::warn!(contract = %state.token.address(), "No contract code at configured address");
        Ok((StatusCode::SERVICE_UNAVAILABLE, "failed").into_response())
    }
}

/// `GET /contract/name`
pub async fn contract_name(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.token.name().await?)
}

/// `GET /contract/symbol`
pub async fn contract_symbol(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.token.symbol().await?)
}

/// `GET /contract/decimals`
pub async fn contract_decimals(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.token.decimals().await?.to_string())
}

/// `GET /contract/total-supply`
pub async fn contract_total_supply(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.token.total_supply().await?.to_string())
}

/// `GET /contract/balance?address=<hex>`
pub async fn contract_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<String, ApiError> {
    let account = parse_address("address", query.address.as_deref())?;
    Ok(state.token.balance_of(account).await?.to_string())
}

/// `GET /contract/allowance?owner=<hex>&spender=<hex>`
pub async fn contract_allowance(
    State(state): State<AppState>,
    Query(query): Query<AllowanceQuery>,
) -> Result<String, ApiError> {
    let owner = parse_address("owner", query.owner.as_deref())?;
    let spender = parse_address("spender", query.spender.as_deref())?;
    Ok(state.token.allowance(owner, spender).await?.to_string())
}

/// `GET /contract/transfer?to_address=<hex>`
pub async fn contract_transfer(
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> Result<Response, ApiError> {
    let to = parse_address("to_address", query.to_address.as_deref())?;
    let builder = state.transfers.as_ref().ok_or(ApiError::WalletUnavailable)?;

    let hash = builder.send_contract_transfer(to, state.contract_amount).await?;
    Ok(hash_response(hash))
}

/// `GET /transfer?to_address=<hex>`
pub async fn raw_transfer(
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> Result<Response, ApiError> {
    let to = parse_address("to_address", query.to_address.as_deref())?;
    let builder = state.transfers.as_ref().ok_or(ApiError::WalletUnavailable)?;

    let hash = builder.send_raw_transfer(to, state.raw_amount).await?;
    Ok(hash_response(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let expected: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();

        let with_prefix = parse_address("to_address", Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"));
        assert_eq!(with_prefix.unwrap(), expected);

        let without_prefix = parse_address("to_address", Some(" 70997970C51812dc3A010C7d01b50e0d17dc79C8 "));
        assert_eq!(without_prefix.unwrap(), expected);
    }

    #[test]
    fn test_parse_address_missing() {
        assert!(matches!(
            parse_address("to_address", None),
            Err(ApiError::MissingParameter("to_address"))
        ));
        assert!(matches!(
            parse_address("to_address", Some("   ")),
            Err(ApiError::MissingParameter("to_address"))
        ));
    }

    #[test]
    fn test_parse_address_malformed() {
        for raw in ["0x1234", "zzzz", "0x70997970C51812dc3A010C7d01b50e0d17dc79C8ff"] {
            let err = parse_address("to_address", Some(raw)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{}", raw);
        }
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "OK");
    }
}
