//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the blockchain client produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the per-request span
//! - Metrics are recorded even when no exporter is installed (no-op recorder)

pub mod logging;
pub mod metrics;
