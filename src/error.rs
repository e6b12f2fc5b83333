//! Error taxonomy for filesystem and filter operations
//!
//! Every item operation returns one of these variants so callers can tell a
//! vanished path from a denied one without parsing messages.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum FsError {
    #[error("Not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid destination {}: {reason}", .path.display())]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("Incorrect action filter '{filter}': {reason}")]
    IncorrectActionFilter { filter: String, reason: String },

    #[error("Could not run '{command}': {reason}")]
    Subprocess { command: String, reason: String },

    /// The copy landed but the source could not be removed afterwards.
    #[error(
        "Copied to {} but could not remove {}: {reason}",
        .copied_to.display(),
        .original.display()
    )]
    PartialMove {
        original: PathBuf,
        copied_to: PathBuf,
        reason: String,
    },

    #[error("I/O error on {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Worker task failed: {reason}")]
    TaskJoin { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl FsError {
    /// Classify an OS error raised while operating on `path`.
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
            _ => FsError::Io {
                path,
                reason: err.to_string(),
            },
        }
    }

    pub fn incorrect_filter(filter: &str, reason: impl Into<String>) -> Self {
        FsError::IncorrectActionFilter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;
