//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! auth service, store, http layer produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout log stream
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Lockout events log the user id, never the email or password
//! - Request ID flows through every request span
//! - Metrics are cheap facade calls; no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
