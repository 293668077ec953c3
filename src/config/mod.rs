//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!
//! redirects.file (YAML/JSON)
//!     → loader.rs (read bytes, resolve format)
//!     → redirect::structured (parse into a handler)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_redirect_document, ConfigError, RedirectDocument};
pub use schema::{
    ListenerConfig, ObservabilityConfig, RedirectsConfig, ServerConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
