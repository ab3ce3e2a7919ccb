//! Configuration types for minishell.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::line::DEFAULT_TIMESTAMP_FORMAT;
use crate::session::{default_program, ReadMode, SessionConfig, DEFAULT_CHUNK_SIZE};
use crate::{Error, Result};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Child shell settings
    pub shell: ShellSettings,
    /// Scrollback presentation settings
    pub display: DisplaySettings,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shell: ShellSettings::default(),
            display: DisplaySettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.shell.validate()?;

        let format = &self.display.timestamp_format;
        if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::Config(format!(
                "display.timestamp_format '{format}' is not a valid strftime format"
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Config(format!(
                "log_level must be one of {LOG_LEVELS:?}, got '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Build the launch configuration for the session bridge.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            program: self.shell.program.clone(),
            args: self.shell.args.clone(),
            working_directory: self.shell.working_directory.clone(),
            env: self
                .shell
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            read_mode: self.shell.read_mode,
            chunk_size: self.shell.chunk_size,
            universal_newlines: self.shell.universal_newlines,
        }
    }
}

/// Child shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Program to launch
    pub program: String,
    /// Program arguments
    pub args: Vec<String>,
    /// Working directory for the child
    pub working_directory: Option<String>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Read slicing: line or chunk
    pub read_mode: ReadMode,
    /// Maximum bytes per read in chunk mode
    pub chunk_size: usize,
    /// Translate `\r\n` and lone `\r` to `\n`
    pub universal_newlines: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            working_directory: None,
            env: BTreeMap::new(),
            read_mode: ReadMode::Line,
            chunk_size: DEFAULT_CHUNK_SIZE,
            universal_newlines: true,
        }
    }
}

impl ShellSettings {
    fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(Error::Config("shell.program cannot be empty".to_string()));
        }

        if self.chunk_size == 0 {
            return Err(Error::Config("shell.chunk_size must be > 0".to_string()));
        }

        if self.env.keys().any(|k| k.is_empty() || k.contains('=')) {
            return Err(Error::Config(
                "shell.env keys must be non-empty and must not contain '='".to_string(),
            ));
        }

        Ok(())
    }
}

/// Scrollback presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Notice shown before the session starts (None disables it)
    pub banner: Option<String>,
    /// strftime format of the line prefix
    pub timestamp_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            banner: Some("[Welcome to Minishell!!]".to_string()),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}
