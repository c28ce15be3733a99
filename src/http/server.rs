//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state from configuration
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Serve until the shutdown signal fires

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Request},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    BoxError, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::blockchain::{BlockchainClient, BlockchainError, TokenContract, TxBuilder, Wallet};
use crate::config::validation::parse_amount;
use crate::config::{validate_config, ConfigError, GatewayConfig};
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: BlockchainClient,
    pub token: TokenContract,
    /// `None` when no private key is configured.
    pub transfers: Option<TxBuilder>,
    pub contract_amount: U256,
    pub raw_amount: U256,
}

impl AppState {
    /// Build the state from a configuration, validating it first.
    pub async fn from_config(config: GatewayConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        // Validation guarantees these parse
        let token_address = Address::from_str(config.contract.address.trim()).unwrap_or_default();
        let contract_amount = parse_amount(&config.transfer.contract_amount).unwrap_or_default();
        let raw_amount = parse_amount(&config.transfer.raw_amount).unwrap_or_default();

        let client = BlockchainClient::new(config.blockchain.clone()).await?;
        let token = TokenContract::new(token_address, client.clone());

        let transfers = match Wallet::from_config(&config.wallet)? {
            Some(wallet) => Some(TxBuilder::new(client.clone(), wallet, token_address)),
            None => {
                tracing::warn!("No private key configured; transfer endpoints are disabled");
                None
            }
        };

        Ok(Self {
            config: Arc::new(config),
            client,
            token,
            transfers,
            contract_amount,
            raw_amount,
        })
    }
}

/// HTTP server for the token gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub async fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(config).await?;
        Ok(Self::with_state(state))
    }

    /// Create a server around an already-built state.
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let request_id_header = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/chain", get(handlers::chain_id))
            .route("/contract", get(handlers::contract_status))
            .route("/contract/name", get(handlers::contract_name))
            .route("/contract/symbol", get(handlers::contract_symbol))
            .route("/contract/decimals", get(handlers::contract_decimals))
            .route("/contract/total-supply", get(handlers::contract_total_supply))
            .route("/contract/balance", get(handlers::contract_balance))
            .route("/contract/allowance", get(handlers::contract_allowance))
            .route("/contract/transfer", get(handlers::contract_transfer))
            .route("/transfer", get(handlers::raw_transfer))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header.clone(), UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(request_id_header))
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Map middleware failures to responses. An expired request deadline answers 504.
async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::error!("Request deadline exceeded");
        (StatusCode::GATEWAY_TIMEOUT, "request timed out".to_string())
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Record count and latency for every matched route.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &path, start);
    response
}
