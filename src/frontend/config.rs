use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name searched by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = ".pearlsema.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: LanguageDefaults,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language-level defaults used when no enclosing scope overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefaults {
    /// Precision of the seeded pool constants and of declaration initializers.
    #[serde(default = "default_31")]
    pub fixed_precision: u32,

    #[serde(default = "default_24")]
    pub float_precision: u32,

    /// Width of size-of results.
    #[serde(default = "default_31")]
    pub fixed_length: u32,

    /// Float precision of `duration / duration`.
    #[serde(default = "default_24")]
    pub duration_ratio_precision: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormatConfig,

    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatConfig {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self {
            fixed_precision: 31,
            float_precision: 24,
            fixed_length: 31,
            duration_ratio_precision: 24,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormatConfig::Pretty,
            filter: None,
        }
    }
}

fn default_31() -> u32 { 31 }
fn default_24() -> u32 { 24 }
fn default_level() -> String { "info".to_string() }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find and load `.pearlsema.toml` from the current directory or its parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    pub fn discover_from(start: &Path) -> Self {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable config");
                    }
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
