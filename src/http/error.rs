//! Mapping of request failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::blockchain::BlockchainError;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter is absent or empty.
    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),

    /// A query parameter is not a valid address.
    #[error("invalid address `{value}`: {reason}")]
    InvalidAddress { value: String, reason: String },

    /// No private key is configured, so nothing can be signed.
    #[error("signing wallet not configured")]
    WalletUnavailable,

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
            ApiError::WalletUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Blockchain(e) => match e {
                BlockchainError::Rpc(_)
                | BlockchainError::ChainMismatch { .. }
                | BlockchainError::Contract(_) => StatusCode::BAD_GATEWAY,
                BlockchainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                BlockchainError::GasPriceTooHigh { .. } => StatusCode::SERVICE_UNAVAILABLE,
                BlockchainError::Wallet(_) | BlockchainError::Transaction(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::warn!(status = %status, error = %self, "Rejected request");
        } else {
            tracing::error!(status = %status, error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingParameter("to_address").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidAddress {
                value: "0x12".into(),
                reason: "too short".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::WalletUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from(BlockchainError::Rpc("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(BlockchainError::Timeout(10)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(BlockchainError::GasPriceTooHigh {
                current_gwei: 900,
                max_gwei: 500
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(BlockchainError::Wallet("bad key".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_blockchain_message_is_transparent() {
        let err = ApiError::from(BlockchainError::Timeout(3));
        assert_eq!(err.to_string(), "RPC timeout after 3 seconds");
    }
}
