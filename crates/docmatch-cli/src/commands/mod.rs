//! Subcommands of the `docmatch` binary.

pub mod compare;
pub mod config;
pub mod run;

use std::path::{Path, PathBuf};

use tracing::debug;

use docmatch_core::models::MatchConfig;

/// Output format of command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    Text,
    /// JSON output
    Json,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docmatch")
        .join("config.json")
}

/// Load the explicit config file, else the default one if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MatchConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(MatchConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(MatchConfig::from_file(&default_path)?)
    } else {
        Ok(MatchConfig::default())
    }
}
