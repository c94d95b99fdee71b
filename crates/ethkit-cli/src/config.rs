//! CLI configuration management
//!
//! The file is a serialized [`ClientConfig`] at `~/.ethkit/config.toml`.

use std::path::{Path, PathBuf};

use ethkit_sdk::ClientConfig;

use crate::CliError;

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ethkit"))
}

/// Get the default config file path
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load `path` (or the default location); a missing file yields defaults
pub fn load(path: Option<&Path>) -> Result<ClientConfig, CliError> {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => path,
        None => return Ok(ClientConfig::default()),
    };
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(ClientConfig::default());
    }
    tracing::debug!("Loading config from {:?}", path);
    ClientConfig::load(&path).map_err(|e| CliError::Config(e.to_string()))
}

/// Save to `path` (or the default location), creating the directory
pub fn save(config: &ClientConfig, path: Option<&Path>) -> Result<PathBuf, CliError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(config_path)
        .ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = config
        .to_toml_string()
        .map_err(|e| CliError::Config(e.to_string()))?;
    std::fs::write(&path, content)?;
    tracing::info!("Config saved to {:?}", path);
    Ok(path)
}
