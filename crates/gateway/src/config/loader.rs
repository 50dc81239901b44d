use std::path::{Path, PathBuf};

use obsgate_common::config::GatewayConfig;

use super::validation;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "gateway.toml";

/// Load gateway configuration from the given config directory.
///
/// A missing gateway.toml is not an error: every section has defaults.
/// A present but malformed or invalid one is, and the gateway refuses to start.
pub fn load_config(config_dir: &Path) -> Result<GatewayConfig, ConfigError> {
    tracing::info!(config_dir = %config_dir.display(), "Loading configuration");

    let path = config_dir.join(CONFIG_FILE);
    let config = if path.exists() {
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        parse_config(&path, &content)?
    } else {
        tracing::warn!(
            path = %path.display(),
            "Config file does not exist, using defaults"
        );
        GatewayConfig::default()
    };

    validation::validate(&config)?;

    tracing::info!(
        port = config.server.port,
        backend = %config.backend.base_url,
        guarded_tools = config.guard.tools.len(),
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Parse gateway.toml content. `path` is only used in error messages.
pub fn parse_config(path: &Path, content: &str) -> Result<GatewayConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
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
