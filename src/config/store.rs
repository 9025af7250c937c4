use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::AppConfig;
use crate::error::{AppError, Result};

/// Environment variable naming the default config file
pub const CONFIG_PATH_ENV: &str = "HARTHIO_LAYOUT_CONFIG";

/// Resolve the config file path; an explicit path wins over the environment
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

/// Load configuration from a JSON file
///
/// Missing keys take their defaults. A missing file is an error when the
/// path was given explicitly.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let config: AppConfig = serde_json::from_str(&json)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load from `path` if given, defaults otherwise
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            debug!("No configuration file, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Write configuration as pretty JSON, creating parent directories
pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
