//! Redirect subsystem.
//!
//! # Data Flow
//! ```text
//! In-memory mapping (path → url)
//!     → table.rs (RedirectTable, later entries win)
//!     → map.rs (MapHandler: 301 on hit, fallback on miss)
//!
//! Structured document (YAML / JSON bytes)
//!     → structured.rs (parse into RedirectEntry list)
//!     → table.rs
//!     → map.rs
//! ```
//!
//! # Design Decisions
//! - Tables are built once and never mutated; handlers share them via `Arc`
//! - Exact string match on path plus query, no normalization
//! - Parse errors are returned, never swallowed
//! - Handlers are tower services, so they chain as each other's fallback

pub mod error;
pub mod map;
pub mod structured;
pub mod table;

pub use error::ConfigParseError;
pub use map::{map_handler, MapHandler};
pub use structured::{json_handler, structured_handler, yaml_handler, RedirectFormat};
pub use table::{RedirectEntry, RedirectTable};
