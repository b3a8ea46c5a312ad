//! Per-user directories for the client's database, logs and upload staging.

use std::path::PathBuf;

use crate::error::{UbError, UbResult};

const APP_DIR: &str = "Ubicasure";

fn app_dir(base: Option<PathBuf>, kind: &str) -> UbResult<PathBuf> {
    base.map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| UbError::Config(format!("could not determine {kind} directory")))
}

/// Holds the preferences database and the log directory.
pub fn data_dir() -> UbResult<PathBuf> {
    app_dir(dirs::data_dir(), "data")
}

pub fn config_dir() -> UbResult<PathBuf> {
    app_dir(dirs::config_dir(), "config")
}

/// Images are copied here before upload and removed afterwards.
pub fn cache_dir() -> UbResult<PathBuf> {
    app_dir(dirs::cache_dir(), "cache")
}
