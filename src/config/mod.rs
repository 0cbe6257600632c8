#[cfg(feature = "cli")]
pub mod cli;
pub mod discovery;
pub mod ini_file;
pub mod options;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::utils::error::{LintError, Result};
use discovery::{ConfigDiscovery, ConfigSource};
use options::{ConfigLayer, LintOptions};
use std::path::Path;

/// Resolved options and the file they were read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub options: LintOptions,
    pub source: Option<ConfigSource>,
}

/// Defaults, then the configuration file (explicit or discovered), then `overrides`.
pub fn load_configuration(
    rcfile: Option<&Path>,
    discovery: &ConfigDiscovery,
    overrides: ConfigLayer,
) -> Result<LoadedConfig> {
    let source = match rcfile {
        Some(path) if !path.is_file() => {
            return Err(LintError::config(format!(
                "The config file {} doesn't exist!",
                path.display()
            )));
        }
        Some(path) => Some(ConfigSource::from_path(path)),
        None => discovery.find_config_file(),
    };

    let mut layers = Vec::new();
    match &source {
        Some(source) => {
            tracing::info!("📄 Using config file {}", source.path().display());
            layers.push(source.load()?);
        }
        None => tracing::info!("No config file found, using default configuration"),
    }
    layers.push(overrides);

    Ok(LoadedConfig {
        options: LintOptions::resolve(&layers)?,
        source,
    })
}
