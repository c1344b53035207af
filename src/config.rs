use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auditor::{DEFAULT_MAX_LINKS, DEFAULT_PAGE_TIMEOUT_SECS};
use crate::cli::{Cli, DEFAULT_OUTPUT};
use crate::link_checker::DEFAULT_WORKERS;

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Maximum internal and external links to check, each
    pub max_links: Option<usize>,

    /// Number of concurrent link checks
    pub workers: Option<usize>,

    /// Skip link checking entirely
    pub fast: Option<bool>,

    /// Timeout in seconds for the main page fetch
    pub timeout: Option<u64>,

    /// Output format: text or json
    pub output: Option<String>,

    /// Print a condensed summary instead of the full report
    pub summary: Option<bool>,

    /// Save the JSON report to a file
    pub save: Option<String>,

    /// Verbose output
    pub verbose: Option<bool>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Default configuration file locations, highest priority first:
    /// the current directory, then the user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("seoaudit.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let app_dir = config_home.join("seoaudit");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(app_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads the explicitly requested file, else the first default one found
    pub fn load(explicit: Option<&str>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Ok(Some(Self::from_file(Path::new(path))?)),
            None => Self::from_default_paths(),
        }
    }

    /// Merge this configuration with CLI arguments
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        Cli {
            url: cli.url.clone(),
            max_links: if cli.max_links != DEFAULT_MAX_LINKS {
                cli.max_links
            } else {
                self.max_links.unwrap_or(cli.max_links)
            },
            workers: if cli.workers != DEFAULT_WORKERS {
                cli.workers
            } else {
                self.workers.unwrap_or(cli.workers)
            },
            fast: cli.fast || self.fast.unwrap_or(false),
            timeout: if cli.timeout != DEFAULT_PAGE_TIMEOUT_SECS {
                cli.timeout
            } else {
                self.timeout.unwrap_or(cli.timeout)
            },
            output: if cli.output != DEFAULT_OUTPUT {
                cli.output.clone()
            } else {
                self.output.clone().unwrap_or_else(|| cli.output.clone())
            },
            summary: cli.summary || self.summary.unwrap_or(false),
            save: cli.save.clone().or_else(|| self.save.clone()),
            verbose: cli.verbose || self.verbose.unwrap_or(false),
            config: cli.config.clone(),
        }
    }
}
