//! Configuration management for pybrew
//!
//! Settings are merged from several sources, highest priority first:
//!
//! 1. Command line flags (applied by the caller through the `set_*` methods)
//! 2. Environment variables (`PYBREW_INDEX_URL`, `PYBREW_PYTHON`,
//!    `PYBREW_SUFFIXES`, `PYBREW_TIMEOUT`)
//! 3. The nearest `pybrew.toml`, searching upward from the working directory
//! 4. Global `config.toml` in the pybrew home directory (`PYBREW_HOME` or
//!    the platform config directory)
//! 5. Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use pybrew_pm::config::Config;
//! use std::path::Path;
//!
//! let mut config = Config::build(Some(Path::new("/path/to/project")), true).unwrap();
//! config.set_python("python3.12");
//!
//! println!("Index: {}", config.index_url);
//! println!("Suffixes: {:?}", config.suffixes);
//! ```

mod config;
mod source;

pub use config::Config;
pub use source::{ConfigLoader, ConfigSource, RawConfig, PROJECT_CONFIG_FILE};
