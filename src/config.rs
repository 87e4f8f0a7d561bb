use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::utils;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: Option<PathBuf>,
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            database_path: None,
            seed_sample_data: false,
        }
    }
}

/// Command line flags. Each one can also come from its environment variable
/// and wins over `config.json`.
#[derive(Debug, Default, Parser)]
#[command(name = "venue-listings", version, about = "Venue, artist and show listings")]
pub struct Cli {
    /// Path to a JSON config file (defaults to the data directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "LISTINGS_BIND")]
    pub bind: Option<String>,

    #[arg(long, env = "LISTINGS_DATABASE")]
    pub database: Option<PathBuf>,

    /// Insert demo venues, artists and shows when the database is empty
    #[arg(long, env = "LISTINGS_SEED")]
    pub seed: Option<bool>,
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, String> {
        let path = cli.config.clone().unwrap_or_else(utils::config_path);
        let mut config = read_config(&path)?;
        if let Some(bind) = &cli.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(database) = &cli.database {
            config.database_path = Some(database.clone());
        }
        if let Some(seed) = cli.seed {
            config.seed_sample_data = seed;
        }
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| format!("{}: {err}", path.display()))
}
