//! Unified path management for recruit configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/recruit/           # Config directory (platform default)
//! ├── config.toml              # Client configuration
//! └── credentials.json         # Persisted bearer token
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for recruit_core::ClientError {
    fn from(err: PathError) -> Self {
        recruit_core::ClientError::config(err.to_string())
    }
}

/// Unified path management for recruit.
pub struct RecruitPaths;

impl RecruitPaths {
    const APP_DIR: &'static str = "recruit";

    /// Returns the recruit configuration directory (e.g. `~/.config/recruit/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted credential file.
    ///
    /// # Security Note
    ///
    /// The file holds a live bearer token and is written with 600 permissions on Unix.
    pub fn credentials_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("credentials.json"))
    }
}
