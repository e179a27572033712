//! Configuration Loader
//!
//! Builds a client configuration from built-in defaults, JSON files and
//! environment variables.

use crate::config::settings::{ClientConfig, ClientOptions};
use crate::error::{IndraError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an extra config file
pub const CONFIG_PATH_ENV: &str = "INDRA_CONFIG_PATH";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,

    #[serde(flatten)]
    options: ClientOptions,
}

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    config: ClientConfig,
}

impl ConfigLoader {
    /// Load built-in defaults, then files from the default paths, then
    /// environment overrides
    pub fn new() -> Result<Self> {
        let lookup = |name: &str| std::env::var(name).ok();
        Self::from_sources(Self::get_config_paths(lookup), lookup)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            config: ClientConfig::default(),
        };

        loader.load_from_file(path)?;

        Ok(loader)
    }

    /// Load `paths` (highest precedence first, missing files skipped), then
    /// the environment variables `lookup` resolves
    fn from_sources(
        paths: Vec<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut loader = Self {
            config: ClientConfig::default(),
        };

        loader.load_from_paths(&paths)?;
        loader.apply_env(lookup)?;

        Ok(loader)
    }

    /// Files listed first win, so they are applied last
    fn load_from_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths.iter().rev() {
            if path.exists() {
                self.load_from_file(path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check, highest precedence first
    fn get_config_paths(lookup: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(custom_path) = lookup(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths.push(PathBuf::from("indra.json"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("indra").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".indra").join("config.json"));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndraError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: FileConfig = serde_json::from_str(&content).map_err(|e| {
            IndraError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        self.merge_file_config(file).map_err(|e| {
            IndraError::Config(format!("Invalid options in {}: {}", path.display(), e.message()))
        })?;
        tracing::debug!(path = %path.display(), "loaded indra configuration file");
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("INDRA_HOST") {
            self.config.host = host;
        }

        if let Some(port) = lookup("INDRA_PORT") {
            self.config.port = port.trim().parse().map_err(|e| {
                IndraError::Config(format!("Invalid INDRA_PORT '{}': {}", port, e))
            })?;
        }

        let mut options = ClientOptions::new();
        options.language = lookup("INDRA_LANGUAGE");
        options.corpus = lookup("INDRA_CORPUS");
        options.model = lookup("INDRA_MODEL");
        if let Some(name) = lookup("INDRA_SCORE_FUNCTION") {
            options.score_function = Some(
                name.parse()
                    .map_err(|e: IndraError| IndraError::Config(e.message().to_string()))?,
            );
        }

        self.config.apply(options)
    }

    /// Merge a file into the current configuration
    fn merge_file_config(&mut self, file: FileConfig) -> Result<()> {
        if let Some(host) = file.host {
            self.config.host = host;
        }
        if let Some(port) = file.port {
            self.config.port = port;
        }
        self.config.apply(file.options)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> ClientConfig {
        self.config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config: ClientConfig::default(),
        })
    }
}
