//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (node calls through the blockchain subsystem)
//!     → error.rs (failures mapped to status codes)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
