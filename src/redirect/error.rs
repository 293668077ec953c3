//! Redirect document errors.

use thiserror::Error;

/// A structured redirect document could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    /// The payload is not a YAML sequence of `path`/`url` records.
    #[error("invalid YAML redirect document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The payload is not a JSON array of `path`/`url` objects.
    #[error("invalid JSON redirect document: {0}")]
    Json(#[from] serde_json::Error),
}
