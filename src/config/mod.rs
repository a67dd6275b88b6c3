// Configuration management module
// This module will handle TOML configuration management and settings

pub mod settings;


pub use settings::{ChimeraxConfig, Config, ConfigError, DocsConfig, OllamaConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
