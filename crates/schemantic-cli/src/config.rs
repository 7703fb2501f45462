//! Configuration management for the CLI
//!
//! Settings come from defaults, then the first configuration file found
//! (YAML or JSON), then command-line flags.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::cli::{Cli, OutputFormat};
use crate::error::{Error, Result};
use schemantic::{ContextConfig, DEFAULT_BASE_URI};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URI that root schemas without an `id` are identified against
    pub base_uri: String,

    /// Directory referenced schema documents are loaded from; defaults to the
    /// directory of the schema being compiled
    pub schema_dir: Option<PathBuf>,

    /// Check schemas against the draft-04 meta-schema before compiling
    pub validate_schema: bool,

    /// Maximum validation depth
    pub max_depth: usize,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let context = ContextConfig::default();
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            schema_dir: None,
            validate_schema: context.validate_schema,
            max_depth: context.max_depth,
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration file");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".schemantic.yaml"),
            PathBuf::from(".schemantic.yml"),
            PathBuf::from(".schemantic.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let schemantic_dir = config_dir.join("schemantic");
            paths.push(schemantic_dir.join("config.yaml"));
            paths.push(schemantic_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".schemantic.yaml"));
            paths.push(home_dir.join(".schemantic.json"));
        }

        paths
    }

    /// Apply global command-line flags on top of the loaded settings
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_uri) = &cli.base_uri {
            self.base_uri = base_uri.clone();
        }
        if cli.output != OutputFormat::Human {
            self.output.format = match cli.output {
                OutputFormat::Human => "human",
                OutputFormat::Json => "json",
                OutputFormat::Yaml => "yaml",
                OutputFormat::JsonPretty => "json-pretty",
            }
            .to_string();
        }
        if cli.no_color {
            self.output.color = false;
        }
    }

    /// The output format named in the configuration
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_name(&self.output.format).ok_or_else(|| {
            Error::config(format!("unknown output format '{}'", self.output.format))
        })
    }

    /// Library settings for a compilation context
    pub fn context_config(&self) -> Result<ContextConfig> {
        let mut config = ContextConfig::new()
            .with_base_uri(&self.base_uri)
            .map_err(|e| Error::config(e.to_string()))?
            .with_max_depth(self.max_depth);
        if self.validate_schema {
            config = config.with_schema_validation();
        }
        Ok(config)
    }
}
