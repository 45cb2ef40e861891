use std::path::{Path, PathBuf};

use floodaware_common::config::FrontendConfig;

use super::validation;

/// Env var overriding the backend base URL.
pub const BACKEND_URL_ENV: &str = "FLOODAWARE_BACKEND_URL";
/// Env var overriding the listen port.
pub const PORT_ENV: &str = "FLOODAWARE_PORT";

/// Load the front end configuration from `path`, apply env overrides and
/// validate the result.
///
/// A missing file is not an error: defaults are used and a warning is
/// logged. A file that exists but does not parse is.
pub fn load_config(path: &Path) -> Result<FrontendConfig, ConfigError> {
    tracing::info!(path = %path.display(), "Loading configuration");

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        FrontendConfig::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
    } else {
        tracing::warn!(
            path = %path.display(),
            "Config file does not exist, using defaults"
        );
        FrontendConfig::default()
    };

    apply_overrides(
        &mut config,
        std::env::var(BACKEND_URL_ENV).ok(),
        std::env::var(PORT_ENV).ok(),
    )?;

    validation::validate(&config)?;

    tracing::info!(
        backend = %config.backend.base_url,
        port = config.server.port,
        "Configuration loaded successfully"
    );

    Ok(config)
}

fn apply_overrides(
    config: &mut FrontendConfig,
    backend_url: Option<String>,
    port: Option<String>,
) -> Result<(), ConfigError> {
    if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
        config.backend.base_url = url.trim().to_string();
    }

    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        config.server.port = port.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("{} must be a port number, got {:?}", PORT_ENV, port))
        })?;
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for floodaware_common::FloodAwareError {
    fn from(e: ConfigError) -> Self {
        floodaware_common::FloodAwareError::Config(e.to_string())
    }
}
