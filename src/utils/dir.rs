use std::{env, io, path::PathBuf};

use anyhow::{Context, Result};

const APPLICATION_DIR_NAME: &str = env!("CARGO_PKG_NAME");

/// Directory for logs and configuration, created if missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = default_base_dir()?.join(APPLICATION_DIR_NAME);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Failed to create application dir {path:?}")),
    }
}

#[cfg(windows)]
fn default_base_dir() -> Result<PathBuf> {
    env::var("APPDATA")
        .map(PathBuf::from)
        .context("APPDATA is not set")
}

#[cfg(not(windows))]
fn default_base_dir() -> Result<PathBuf> {
    env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/state")))
        .context("Couldn't find neither XDG_STATE_HOME nor HOME")
}
