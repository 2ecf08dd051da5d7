use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BrewError, Result};

/// File name looked up in the working directory and its ancestors
pub const PROJECT_CONFIG_FILE: &str = "pybrew.toml";

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From the global config file in the pybrew home directory
    Global,
    /// From the nearest pybrew.toml
    Project,
    /// From environment variable
    Environment(String),
    /// Set from the command line
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::Global => "global",
            ConfigSource::Project => "project",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// Configuration values as written in a TOML file. Absent keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Loads configuration from various sources
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
    home: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self {
            use_environment,
            home: None,
        }
    }

    /// Use `home` as the pybrew home directory instead of looking it up
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Get a PYBREW_* environment variable, ignoring empty values
    pub fn get_pybrew_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Environment override for a config key.
    /// Converts "index-url" to "PYBREW_INDEX_URL"
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        self.get_pybrew_env(&env_var_name(key))
    }

    /// Get unsigned integer value from environment variable
    pub fn get_env_u64(&self, key: &str) -> Option<u64> {
        self.get_env_config(key).and_then(|val| val.parse().ok())
    }

    /// Get the pybrew home directory
    pub fn get_pybrew_home(&self) -> PathBuf {
        if let Some(home) = &self.home {
            return home.clone();
        }

        if let Some(home) = self.get_pybrew_env("PYBREW_HOME") {
            return PathBuf::from(home);
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pybrew") {
            proj_dirs.config_dir().to_path_buf()
        } else if let Some(base_dirs) = directories::BaseDirs::new() {
            base_dirs.home_dir().join(".pybrew")
        } else {
            PathBuf::from(".pybrew")
        }
    }

    /// Load configuration from a TOML file; a missing file is empty
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(RawConfig::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| BrewError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: RawConfig = toml::from_str(&contents)
            .map_err(|e| BrewError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load global configuration from `<home>/config.toml`
    pub fn load_global_config(&self) -> Result<RawConfig> {
        let config_file = self.get_pybrew_home().join("config.toml");
        self.load_config_file(config_file)
    }

    /// Find pybrew.toml, searching upward from `start_dir`
    pub fn find_project_config(&self, start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

fn env_var_name(key: &str) -> String {
    format!("PYBREW_{}", key.replace('-', "_").to_uppercase())
}
