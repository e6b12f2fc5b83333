//! Shared types and data structures for twinpane

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Size Units
// ============================================================================

/// Unit a byte count is reported in. Binary multiples, so `KB` is 1024 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeUnit {
    #[default]
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    pub fn divisor(self) -> u64 {
        match self {
            SizeUnit::B => 1,
            SizeUnit::KB => 1 << 10,
            SizeUnit::MB => 1 << 20,
            SizeUnit::GB => 1 << 30,
            SizeUnit::TB => 1 << 40,
        }
    }

    pub fn convert(self, bytes: u64) -> f64 {
        bytes as f64 / self.divisor() as f64
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "B" => Ok(SizeUnit::B),
            "KB" => Ok(SizeUnit::KB),
            "MB" => Ok(SizeUnit::MB),
            "GB" => Ok(SizeUnit::GB),
            "TB" => Ok(SizeUnit::TB),
            other => Err(format!("Unknown size unit '{}'", other)),
        }
    }
}

// ============================================================================
// File System Types
// ============================================================================

/// One row of a pane listing
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<String>,
}

/// Detailed view of a single item
#[derive(Debug, Serialize)]
pub struct ItemInfo {
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    pub size: f64,
    pub unit: SizeUnit,
    pub modified: Option<String>,
    /// Recursive entry count, folders only
    pub item_count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct FileOperationResult {
    pub success: bool,
    pub message: String,
    pub new_path: Option<String>,
}

// ============================================================================
// Disk Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DiskInfo {
    pub name: String,
    pub path: PathBuf,
    pub free: u64,
    pub used: u64,
    pub total: u64,
}

// ============================================================================
// Shell Types
// ============================================================================

/// Captured output of an external command. `stdout` is `None` only when the
/// process could not be started.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Option<String>,
    pub stderr: String,
}
