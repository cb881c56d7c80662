//! Configuration file loading and validation.

use std::path::Path;

use quill_cache::Compression;
use quill_serial::SerializerKind;

use crate::error::ConfigError;
use crate::types::FileConfig;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "quill.toml";

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = load_config_from_str(&content)?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<FileConfig, ConfigError> {
    let config: FileConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Finds the configuration for a run.
///
/// An explicit path must exist. Otherwise `quill.toml` in `dir` is used if
/// present, and built-in defaults if not.
pub fn find_config(explicit: Option<&Path>, dir: &Path) -> Result<FileConfig, ConfigError> {
    match explicit {
        Some(path) if !path.is_file() => Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => load_config(path),
        None => {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                load_config(&path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

/// Checks values whose type is a free-form string in the file.
fn validate_config(config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(name) = &config.cache.compression {
        name.parse::<Compression>()
            .map_err(|e| ConfigError::ValidationError(format!("cache.compression: {e}")))?;
    }
    if let Some(name) = &config.output.json_serializer {
        name.parse::<SerializerKind>()
            .map_err(|e| ConfigError::ValidationError(format!("output.json_serializer: {e}")))?;
    }
    if config.lint.long_line_threshold == Some(0) {
        return Err(ConfigError::ValidationError(
            "lint.long_line_threshold must be positive".to_string(),
        ));
    }
    Ok(())
}
