//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Redirect handlers and the HTTP server produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (redirect and fallback counters)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
