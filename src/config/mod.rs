mod schema;

pub use schema::{Config, DEFAULT_EXPORT_FILE, DEFAULT_TOP};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::dataset::find_round;

/// Get the config directory path (~/.config/jtbd-explorer/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("jtbd-explorer"))
}

/// Get the default config file path (~/.config/jtbd-explorer/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// With `path = None` the default location is used, and a missing file there
/// just means defaults. An explicitly given path must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or has unknown keys
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    Ok(config)
}

/// Validate configuration values.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> std::result::Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(top) = config.top {
        if top == 0 {
            errors.push("top: must be at least 1".to_string());
        }
    }

    if let Some(ref round) = config.default_round {
        if find_round(round).is_none() {
            errors.push(format!("default_round: unknown research round '{}'", round));
        }
    }

    if let Some(ref file) = config.export_file {
        if file.trim().is_empty() {
            errors.push("export_file: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
