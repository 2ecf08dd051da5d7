use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::source::{ConfigLoader, ConfigSource, RawConfig};
use crate::error::Result;
use crate::generator::{default_suffixes, parse_suffixes};
use crate::http::HttpClientConfig;
use crate::index::DEFAULT_INDEX_URL;

const DEFAULT_PYTHON: &str = "python3";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Effective pybrew settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Simple index base URL
    pub index_url: String,

    /// Preferred distribution suffixes, highest first
    pub suffixes: Vec<String>,

    /// Interpreter used to inspect installed packages
    pub python: String,

    /// Request timeout in seconds
    pub timeout: u64,

    pub user_agent: Option<String>,

    project_file: Option<PathBuf>,
    sources: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let sources = ["index-url", "suffixes", "python", "timeout"]
            .into_iter()
            .map(|key| (key.to_string(), ConfigSource::Default))
            .collect();

        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            suffixes: default_suffixes(),
            python: DEFAULT_PYTHON.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            project_file: None,
            sources,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build configuration from all sources (defaults, global, project, env)
    ///
    /// The project file is the nearest `pybrew.toml` in `start_dir` or one
    /// of its ancestors.
    pub fn build(start_dir: Option<&Path>, use_environment: bool) -> Result<Self> {
        Self::build_with(&ConfigLoader::new(use_environment), start_dir)
    }

    /// Same as [`Config::build`] with an explicit loader
    pub fn build_with(loader: &ConfigLoader, start_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Global config.toml
        let global_config = loader.load_global_config()?;
        config.merge_raw_config(global_config, ConfigSource::Global);

        // 2. Nearest pybrew.toml
        if let Some(project_file) = start_dir.and_then(|dir| loader.find_project_config(dir)) {
            log::debug!("Loading configuration from {}", project_file.display());
            let project_config = loader.load_config_file(&project_file)?;
            config.merge_raw_config(project_config, ConfigSource::Project);
            config.project_file = Some(project_file);
        }

        // 3. Environment variable overrides
        config.apply_env_overrides(loader);

        Ok(config)
    }

    /// Path of the pybrew.toml that was loaded, if any
    pub fn project_file(&self) -> Option<&Path> {
        self.project_file.as_deref()
    }

    /// Get the source of a configuration value
    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    pub fn set_index_url(&mut self, index_url: impl Into<String>) {
        self.index_url = index_url.into();
        self.sources.insert("index-url".to_string(), ConfigSource::Command);
    }

    pub fn set_suffixes(&mut self, suffixes: Vec<String>) {
        self.suffixes = suffixes;
        self.sources.insert("suffixes".to_string(), ConfigSource::Command);
    }

    pub fn set_python(&mut self, python: impl Into<String>) {
        self.python = python.into();
        self.sources.insert("python".to_string(), ConfigSource::Command);
    }

    /// HTTP client settings derived from this configuration
    pub fn http_config(&self) -> HttpClientConfig {
        let config = HttpClientConfig::new().with_timeout(Duration::from_secs(self.timeout));
        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        }
    }

    /// Merge raw configuration from a source
    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) {
        if let Some(index_url) = raw.index_url {
            self.index_url = index_url;
            self.sources.insert("index-url".to_string(), source.clone());
        }
        if let Some(suffixes) = raw.suffixes {
            self.suffixes = suffixes;
            self.sources.insert("suffixes".to_string(), source.clone());
        }
        if let Some(python) = raw.python {
            self.python = python;
            self.sources.insert("python".to_string(), source.clone());
        }
        if let Some(timeout) = raw.timeout {
            self.timeout = timeout;
            self.sources.insert("timeout".to_string(), source.clone());
        }
        if let Some(user_agent) = raw.user_agent {
            self.user_agent = Some(user_agent);
            self.sources.insert("user-agent".to_string(), source);
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self, loader: &ConfigLoader) {
        if let Some(index_url) = loader.get_env_config("index-url") {
            self.index_url = index_url;
            self.sources.insert(
                "index-url".to_string(),
                ConfigSource::Environment("PYBREW_INDEX_URL".to_string()),
            );
        }

        if let Some(python) = loader.get_env_config("python") {
            self.python = python;
            self.sources.insert(
                "python".to_string(),
                ConfigSource::Environment("PYBREW_PYTHON".to_string()),
            );
        }

        // Comma separated, like the command line flag
        if let Some(suffixes) = loader.get_env_config("suffixes") {
            self.suffixes = parse_suffixes(&suffixes);
            self.sources.insert(
                "suffixes".to_string(),
                ConfigSource::Environment("PYBREW_SUFFIXES".to_string()),
            );
        }

        if let Some(timeout) = loader.get_env_u64("timeout") {
            self.timeout = timeout;
            self.sources.insert(
                "timeout".to_string(),
                ConfigSource::Environment("PYBREW_TIMEOUT".to_string()),
            );
        }
    }
}
