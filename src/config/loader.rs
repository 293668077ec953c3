//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RedirectsConfig, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::redirect::{ConfigParseError, RedirectFormat};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Redirect file {path:?}: {source}")]
    Redirects {
        path: PathBuf,
        #[source]
        source: ConfigParseError,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Raw contents of the configured redirect document.
#[derive(Debug, Clone)]
pub struct RedirectDocument {
    pub path: PathBuf,
    pub format: RedirectFormat,
    pub bytes: Vec<u8>,
}

/// Read the redirect file named by `redirects`, if any.
pub fn read_redirect_document(
    redirects: &RedirectsConfig,
) -> Result<Option<RedirectDocument>, ConfigError> {
    let Some(path) = &redirects.file else {
        return Ok(None);
    };

    let format = redirects.resolved_format().ok_or_else(|| {
        ConfigError::Validation(vec![ValidationError::UnknownRedirectFormat(path.clone())])
    })?;

    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(Some(RedirectDocument {
        path: path.clone(),
        format,
        bytes,
    }))
}
