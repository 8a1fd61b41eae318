//! Platform-specific directories.

use std::path::PathBuf;
use crate::error::{NhError, NhResult};

/// Accessors for the per-user directories NoteHub writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform;

impl Platform {
    /// Get the platform-specific application data directory.
    ///
    /// - Windows: `%APPDATA%/NoteHub`
    /// - macOS: `~/Library/Application Support/NoteHub`
    /// - Linux: `~/.local/share/NoteHub`
    pub fn data_dir() -> NhResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| NhError::Config("could not determine data directory".into()))?;
        Ok(base.join("NoteHub"))
    }

    /// Get the platform-specific configuration directory.
    pub fn config_dir() -> NhResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| NhError::Config("could not determine config directory".into()))?;
        Ok(base.join("NoteHub"))
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> NhResult<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
