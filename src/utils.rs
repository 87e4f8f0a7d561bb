use dirs::data_dir;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

const APP_DIR: &str = "venue-listings";

pub fn database_path() -> PathBuf {
    app_dir().join("venue-listings.sqlite")
}

pub fn config_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Falls back to the working directory when the platform has no data dir.
fn app_dir() -> PathBuf {
    data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn ensure_parent(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Err(err) = fs::create_dir_all(parent) {
        warn!("could not create {}: {err}", parent.display());
    }
}
