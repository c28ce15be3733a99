//! HTTP gateway to an ERC-20 token on an Ethereum-compatible chain.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
