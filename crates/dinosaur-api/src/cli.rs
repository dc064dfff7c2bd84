//! Command-line arguments for the API server.

use crate::config::{ApiConfig, ConfigError};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Dinosaur API - HTTP service for dinosaur records.
#[derive(Debug, Parser)]
#[command(name = "dinosaur-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Datastore connection string, overrides the config file
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Listen port, overrides the config file
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address, overrides the config file
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Log filter, overrides the config file. `RUST_LOG` still wins when set.
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Load `KEY=value` pairs from a dotenv file into the process environment.
///
/// With no path, `.env` is looked up from the current directory upwards.
/// Variables already set in the environment are left alone. A missing file
/// is not an error and yields `Ok(None)`.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match result {
        Ok(loaded) => Ok(Some(loaded)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl Cli {
    /// Load the config file (or defaults) and apply overrides from the command line
    pub fn load_config(&self) -> Result<ApiConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ApiConfig::from_file(path)?,
            None => ApiConfig::default(),
        };

        if let Some(database_url) = &self.database_url {
            config.database_url = database_url.clone();
        }
        if let Some(port) = self.port {
            config.bind_port = port;
        }
        if let Some(bind_address) = &self.bind_address {
            config.bind_address = bind_address.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
