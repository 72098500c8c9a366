//! Tool configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via SCXMLKIT_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller)

use scxmlkit_codec::SerializeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SCXMLKIT_CONFIG";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output formatting.
    pub format: SerializeOptions,
    /// Reference checking.
    pub check: CheckConfig,
}

impl Config {
    /// Loads configuration from `path` (or the file named by
    /// `SCXMLKIT_CONFIG`), then applies environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match std::env::var(CONFIG_ENV) {
                Ok(path) => Self::from_file(&path)?,
                Err(_) => Self::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Render(e.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        apply_format_overrides(&mut self.format);
        self.check.apply_env_overrides();
    }
}

fn apply_format_overrides(format: &mut SerializeOptions) {
    if let Ok(indent) = std::env::var("SCXMLKIT_INDENT") {
        format.indent = parse_indent(&indent);
    }

    if let Ok(newline) = std::env::var("SCXMLKIT_NEWLINE") {
        format.newline = unescape_newline(&newline);
    }

    if let Ok(pretty) = std::env::var("SCXMLKIT_PRETTY") {
        if let Some(pretty) = parse_bool(&pretty) {
            format.pretty = pretty;
        }
    }
}

/// Reference checking configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Exit with an error when `check` reports any finding.
    pub fail_on_reference_errors: bool,
}

impl CheckConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SCXMLKIT_FAIL_ON_REFERENCE_ERRORS") {
            if let Some(fail) = parse_bool(&value) {
                self.fail_on_reference_errors = fail;
            }
        }
    }
}

/// A number means that many spaces; anything else is used verbatim.
pub fn parse_indent(value: &str) -> String {
    match value.parse::<usize>() {
        Ok(width) => " ".repeat(width),
        Err(_) => value.replace("\\t", "\t"),
    }
}

fn unescape_newline(value: &str) -> String {
    value.replace("\\r", "\r").replace("\\n", "\n")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, String),

    #[error("failed to render config: {0}")]
    Render(String),
}
