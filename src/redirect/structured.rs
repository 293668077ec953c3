//! Redirect handlers built from structured documents.
//!
//! A document is a list of records with `path` and `url` string fields:
//!
//! ```yaml
//! - path: /some-path
//!   url: https://www.some-url.com/demo
//! ```
//!
//! JSON documents use the same shape (`[{"path": ..., "url": ...}]`).
//! Parse failures are returned to the caller; a handler is only built from a
//! document that parsed completely.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::redirect::error::ConfigParseError;
use crate::redirect::map::MapHandler;
use crate::redirect::table::{RedirectEntry, RedirectTable};

/// Supported redirect document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectFormat {
    Yaml,
    Json,
}

impl RedirectFormat {
    /// Infer the format from a file extension (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse a document in this format into its entries, in document order.
    pub fn parse(self, bytes: &[u8]) -> Result<Vec<RedirectEntry>, ConfigParseError> {
        match self {
            Self::Yaml => parse_yaml(bytes),
            Self::Json => parse_json(bytes),
        }
    }
}

impl fmt::Display for RedirectFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for RedirectFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown redirect format '{other}' (expected yaml or json)"
            )),
        }
    }
}

/// Parse a YAML redirect list. An empty or `null` document is an empty list.
pub fn parse_yaml(yml: &[u8]) -> Result<Vec<RedirectEntry>, ConfigParseError> {
    if yml.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let entries: Option<Vec<RedirectEntry>> = serde_yaml::from_slice(yml)?;
    Ok(entries.unwrap_or_default())
}

/// Parse a JSON redirect array.
pub fn parse_json(json: &[u8]) -> Result<Vec<RedirectEntry>, ConfigParseError> {
    Ok(serde_json::from_slice(json)?)
}

/// Build a redirect handler from a YAML document.
///
/// Returns an error if the document is not a list of `path`/`url` records.
/// See [`map_handler`](crate::redirect::map_handler) for building a handler
/// from an in-memory mapping.
pub fn yaml_handler<F>(yml: &[u8], fallback: F) -> Result<MapHandler<F>, ConfigParseError> {
    structured_handler(RedirectFormat::Yaml, yml, fallback)
}

/// Build a redirect handler from a JSON document.
pub fn json_handler<F>(json: &[u8], fallback: F) -> Result<MapHandler<F>, ConfigParseError> {
    structured_handler(RedirectFormat::Json, json, fallback)
}

/// Build a redirect handler from a document in the given format.
pub fn structured_handler<F>(
    format: RedirectFormat,
    bytes: &[u8],
    fallback: F,
) -> Result<MapHandler<F>, ConfigParseError> {
    let entries = format.parse(bytes)?;
    tracing::debug!(%format, entries = entries.len(), "Parsed redirect document");

    Ok(MapHandler::from_table(RedirectTable::from_entries(entries), fallback))
}
