//! Start companion programs (usually the game) with the bridge

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use thiserror::Error;

/// Why a launch entry was skipped
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid program entry {0}: program path must be a non-empty string")]
    InvalidEntry(String),

    #[error("could not launch {0:?}: file not found")]
    NotFound(PathBuf),

    #[error("could not launch {path:?}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that a raw config entry names an existing program
pub fn resolve_entry(entry: &serde_yaml::Value) -> Result<PathBuf, LaunchError> {
    let path = match entry.as_str() {
        Some(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
        _ => {
            let shown = serde_yaml::to_string(entry)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| format!("{:?}", entry));
            return Err(LaunchError::InvalidEntry(shown));
        }
    };

    if !path.exists() {
        return Err(LaunchError::NotFound(path));
    }
    Ok(path)
}

fn spawn(path: &Path) -> Result<Child, LaunchError> {
    Command::new(path).spawn().map_err(|source| LaunchError::Spawn {
        path: path.to_path_buf(),
        source,
    })
}

/// Launch every entry in order. Bad entries are reported and skipped.
///
/// Returns the processes that started.
pub fn launch_all(entries: &[serde_yaml::Value]) -> Vec<Child> {
    if entries.is_empty() {
        log::info!("No programs configured to launch.");
        return Vec::new();
    }

    let mut children = Vec::new();
    for entry in entries {
        match resolve_entry(entry).and_then(|path| {
            log::info!("Attempting to launch: {}", path.display());
            spawn(&path)
        }) {
            Ok(child) => children.push(child),
            Err(e) => log::warn!("{}", e),
        }
    }
    children
}
