//! Application configuration
//!
//! Holds user settings that the engine needs at run time:
//! - Browsing root for new panes
//! - Number of panes
//! - Whether hidden entries are listed
//! - Shell used for action-filter checks and command passthrough
//!
//! The configuration is an explicit value handed to whoever needs it. It can be
//! read from a JSON file but is never written back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsResult};

/// Shell invocation used to run command strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Shell executable
    pub program: String,
    /// Flag that makes the shell execute the next argument as a command string
    pub arg: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self {
                program: "cmd".to_string(),
                arg: "/C".to_string(),
            }
        } else {
            Self {
                program: "sh".to_string(),
                arg: "-c".to_string(),
            }
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folder new panes start browsing from
    pub root: PathBuf,
    /// Number of side-by-side panes
    pub pane_count: usize,
    /// List entries whose name starts with a dot
    pub show_hidden: bool,
    pub shell: ShellConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
            pane_count: 2,
            show_hidden: false,
            shell: ShellConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> FsResult<Self> {
        let config: AppConfig = serde_json::from_str(json).map_err(|e| FsError::Config {
            reason: format!("Invalid config JSON: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> FsResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| FsError::Config {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> FsResult<()> {
        if self.pane_count == 0 {
            return Err(FsError::Config {
                reason: "pane_count must be at least 1".to_string(),
            });
        }
        if self.shell.program.trim().is_empty() {
            return Err(FsError::Config {
                reason: "shell.program cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
