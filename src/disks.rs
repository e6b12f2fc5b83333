//! Mounted volumes
//!
//! Each call to [`list_disks`] reads the mount table afresh. A [`Disk`] is a
//! snapshot taken at that moment and is never refreshed.

use log::debug;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

use crate::error::FsResult;
use crate::files::Folder;
use crate::types::{DiskInfo, SizeUnit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    name: String,
    path: PathBuf,
    free: u64,
    total: u64,
}

impl Disk {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, free: u64, total: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            free,
            total,
        }
    }

    /// Device identifier
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Mount point
    pub fn get_path(&self) -> &Path {
        &self.path
    }

    /// Folder handle for the mount point, for browsing the volume
    pub fn get_folder(&self) -> FsResult<Folder> {
        Folder::at(&self.path)
    }

    pub fn get_free_space(&self, unit: SizeUnit) -> f64 {
        unit.convert(self.free)
    }

    pub fn get_capacity(&self, unit: SizeUnit) -> f64 {
        unit.convert(self.total)
    }

    pub fn get_used_space(&self, unit: SizeUnit) -> f64 {
        unit.convert(self.used_bytes())
    }

    fn used_bytes(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    pub fn info(&self) -> DiskInfo {
        DiskInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            free: self.free,
            used: self.used_bytes(),
            total: self.total,
        }
    }
}

/// Mounted volumes as reported by the OS right now
pub fn list_disks() -> Vec<Disk> {
    let disks = Disks::new_with_refreshed_list();
    let list: Vec<Disk> = disks
        .list()
        .iter()
        .map(|d| {
            Disk::new(
                d.name().to_string_lossy(),
                d.mount_point(),
                d.available_space(),
                d.total_space(),
            )
        })
        .collect();
    debug!("Found {} mounted volume(s)", list.len());
    list
}
