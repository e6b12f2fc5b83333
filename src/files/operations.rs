//! Path-level file system primitives
//!
//! This module handles:
//! - Existence and kind checks that do not follow symbolic links
//! - Name validation for new entries
//! - Duplicate-name resolution (`name(2)`, `name(3)`, ...)
//! - Recursive copy, removal, size and entry counting
//!
//! Item handles in `item.rs` are built on top of these.

use log::{debug, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FsError, FsResult};

/// True if anything, including a dangling symlink, exists at `path`
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Format a system time as a human-readable local time string
pub fn format_time(time: std::io::Result<SystemTime>) -> Option<String> {
    time.ok().map(|t| {
        let datetime: chrono::DateTime<chrono::Local> = t.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    })
}

/// Seconds since the Unix epoch, with sub-second precision
pub fn posix_timestamp(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Make `path` absolute without resolving symlinks
pub fn absolute(path: &Path) -> FsResult<PathBuf> {
    std::path::absolute(path).map_err(|e| FsError::from_io(e, path))
}

/// Last component of `path`, or the whole path for roots like `/`
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Check that `name` is usable as a single entry name inside a folder
pub fn validate_name(name: &str) -> FsResult<()> {
    let invalid = |reason: &str| FsError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name cannot be a relative directory reference"));
    }
    if name.contains('/') || (cfg!(target_os = "windows") && name.contains('\\')) {
        return Err(invalid("name cannot contain a path separator"));
    }
    if name.contains('\0') {
        return Err(invalid("name cannot contain NUL"));
    }
    Ok(())
}

/// Resolve `path` to an existing directory, or explain why it is not one
pub fn ensure_directory(path: &Path) -> FsResult<PathBuf> {
    let path = absolute(path)?;
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(path),
        Ok(_) => Err(FsError::NotADirectory { path }),
        Err(e) => Err(FsError::from_io(e, &path)),
    }
}

/// Name for the `n`th duplicate of `name`. The suffix goes after the full
/// name, extension included.
pub fn duplicate_name(name: &str, n: u32) -> String {
    format!("{}({})", name, n)
}

/// First free path in `dir` for `name`: the name itself, then `name(2)`,
/// `name(3)`, ... The check is not atomic with whatever creates the entry.
pub fn free_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !entry_exists(&candidate) {
        return candidate;
    }

    let mut n = 2;
    loop {
        let candidate = dir.join(duplicate_name(name, n));
        if !entry_exists(&candidate) {
            debug!("Resolved duplicate {:?} to {:?}", name, candidate);
            return candidate;
        }
        n += 1;
    }
}

/// True if `inner` is `outer` or lies somewhere beneath it
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    let inner = inner.canonicalize().unwrap_or_else(|_| inner.to_path_buf());
    let outer = outer.canonicalize().unwrap_or_else(|_| outer.to_path_buf());
    inner.starts_with(outer)
}

/// Recursively copy a directory. Symbolic links are recreated as links on
/// Unix and followed elsewhere.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> FsResult<()> {
    fs::create_dir_all(dst).map_err(|e| FsError::from_io(e, dst))?;
    for entry in fs::read_dir(src).map_err(|e| FsError::from_io(e, src))? {
        let entry = entry.map_err(|e| FsError::from_io(e, src))?;
        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(|e| FsError::from_io(e, &entry_path))?;
        let dest_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&entry_path, &dest_path)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry_path, &dest_path)?;
        } else {
            fs::copy(&entry_path, &dest_path).map_err(|e| FsError::from_io(e, &entry_path))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> FsResult<()> {
    let target = fs::read_link(src).map_err(|e| FsError::from_io(e, src))?;
    std::os::unix::fs::symlink(&target, dst).map_err(|e| FsError::from_io(e, dst))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> FsResult<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| FsError::from_io(e, src))
    }
}

/// Delete a file or a whole directory tree.
///
/// Directory removal is best-effort: entries removed before a failure stay
/// removed.
pub fn remove_path(path: &Path, is_dir: bool) -> FsResult<()> {
    let result = if is_dir {
        debug!("Removing directory tree: {:?}", path);
        fs::remove_dir_all(path)
    } else {
        debug!("Removing file: {:?}", path);
        fs::remove_file(path)
    };

    result.map_err(|e| {
        warn!("Failed to remove {:?}: {}", path, e);
        FsError::from_io(e, path)
    })
}

/// Delete a symbolic link itself, never what it points to
pub fn remove_link(path: &Path) -> FsResult<()> {
    debug!("Removing symlink: {:?}", path);
    let result = if cfg!(target_os = "windows") && path.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| {
        warn!("Failed to remove link {:?}: {}", path, e);
        FsError::from_io(e, path)
    })
}

/// Sum of the sizes of all regular files under `dir`. Symbolic links are
/// neither counted nor followed. Sibling subtrees are walked in parallel.
pub fn folder_size(dir: &Path) -> FsResult<u64> {
    let entries = fs::read_dir(dir)
        .map_err(|e| FsError::from_io(e, dir))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FsError::from_io(e, dir))?;

    entries
        .into_par_iter()
        .map(|entry| {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| FsError::from_io(e, &path))?;
            if file_type.is_symlink() {
                Ok(0)
            } else if file_type.is_dir() {
                folder_size(&path)
            } else {
                entry
                    .metadata()
                    .map(|m| m.len())
                    .map_err(|e| FsError::from_io(e, &path))
            }
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

/// Number of files and directories anywhere under `dir`. Symbolic links count
/// as entries but are not descended into.
pub fn item_count(dir: &Path) -> FsResult<u64> {
    let mut count = 0;
    for entry in fs::read_dir(dir).map_err(|e| FsError::from_io(e, dir))? {
        let entry = entry.map_err(|e| FsError::from_io(e, dir))?;
        count += 1;
        let file_type = entry
            .file_type()
            .map_err(|e| FsError::from_io(e, entry.path()))?;
        if file_type.is_dir() {
            count += item_count(&entry.path())?;
        }
    }
    Ok(count)
}
