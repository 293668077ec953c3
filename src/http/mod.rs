//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (request ID, tracing span)
//!     → redirect handler chain (301 or fallback)
//!     → fallback.rs (default responder)
//!     → Send to client
//! ```

pub mod fallback;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_handler, HttpServer, RedirectService};
