//! Pane sessions and the workspace that holds them
//!
//! A [`FileManager`] is one pane: a browsing root plus the folder currently
//! shown. It changes only through explicit navigation calls. A [`Workspace`]
//! owns the panes and knows which one has focus.

use log::{debug, info};
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use crate::config::AppConfig;
use crate::disks::{list_disks, Disk};
use crate::error::{FsError, FsResult};
use crate::files::operations::format_time;
use crate::files::{Folder, Item};
use crate::types::FileEntry;

// ============================================================================
// FileManager
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileManager {
    root: Folder,
    active: Folder,
    show_hidden: bool,
}

impl FileManager {
    /// Session browsing `root`, starting there
    pub fn new(root: impl AsRef<Path>) -> FsResult<Self> {
        let root = Folder::at(root)?;
        Ok(Self {
            active: root.clone(),
            root,
            show_hidden: false,
        })
    }

    pub fn from_config(config: &AppConfig) -> FsResult<Self> {
        let mut manager = Self::new(&config.root)?;
        manager.show_hidden = config.show_hidden;
        Ok(manager)
    }

    pub fn get_root(&self) -> &Folder {
        &self.root
    }

    /// Change the browsing root. The active folder is left where it is.
    pub fn set_root(&mut self, root: impl AsRef<Path>) -> FsResult<()> {
        self.root = Folder::at(root)?;
        info!("Pane root set to {:?}", self.root.get_path());
        Ok(())
    }

    pub fn active(&self) -> &Folder {
        &self.active
    }

    pub fn set_active(&mut self, folder: Folder) {
        debug!("Active folder: {:?}", folder.get_path());
        self.active = folder;
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    /// Make the folder at `path` (relative to the active folder) active
    pub fn enter(&mut self, path: impl AsRef<Path>) -> FsResult<&Folder> {
        let folder = Folder::at(self.resolve(path))?;
        self.set_active(folder);
        Ok(&self.active)
    }

    /// Move to the parent of the active folder. Returns false at a filesystem
    /// root.
    pub fn go_up(&mut self) -> bool {
        match self.active.get_parent() {
            Some(parent) => {
                self.set_active(parent);
                true
            }
            None => false,
        }
    }

    pub fn go_to_root(&mut self) {
        self.set_active(self.root.clone());
    }

    /// Absolute form of `input`. Relative input is taken against the active
    /// folder; `.` and `..` are folded lexically.
    pub fn resolve(&self, input: impl AsRef<Path>) -> PathBuf {
        let input = input.as_ref();
        let joined = if input.is_absolute() {
            input.to_path_buf()
        } else {
            self.active.get_path().join(input)
        };
        normalize(&joined)
    }

    /// Handle to the entry at `input`, resolved like [`resolve`](Self::resolve)
    pub fn item(&self, input: impl AsRef<Path>) -> FsResult<Item> {
        Item::at(self.resolve(input))
    }

    /// Children of the active folder: folders first, then by name ignoring
    /// case. Dot entries are left out unless hidden entries are shown.
    pub fn refresh(&self) -> FsResult<Vec<Item>> {
        let mut items: Vec<Item> = self
            .active
            .get_content()?
            .into_iter()
            .filter(|i| self.show_hidden || !i.get_name().starts_with('.'))
            .collect();

        items.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.get_name().to_lowercase().cmp(&b.get_name().to_lowercase()),
        });

        debug!(
            "Refreshed {:?}: {} entries",
            self.active.get_path(),
            items.len()
        );
        Ok(items)
    }

    /// [`refresh`](Self::refresh) as display rows
    pub fn list_entries(&self) -> FsResult<Vec<FileEntry>> {
        let entries: Vec<FileEntry> = self
            .refresh()?
            .into_iter()
            .map(|item| {
                let metadata = std::fs::metadata(item.get_path()).ok();
                FileEntry {
                    name: item.get_name().to_string(),
                    path: item.get_path().to_string_lossy().to_string(),
                    is_dir: item.is_folder(),
                    size: match (&item, &metadata) {
                        (Item::File(_), Some(m)) => m.len(),
                        _ => 0,
                    },
                    modified: metadata.and_then(|m| format_time(m.modified())),
                }
            })
            .collect();

        info!(
            "Listed directory {:?}: {} entries",
            self.active.get_path(),
            entries.len()
        );
        Ok(entries)
    }

    pub fn get_disks(&self) -> Vec<Disk> {
        list_disks()
    }

    /// Browse the mount point of `disk`
    pub fn select_disk(&mut self, disk: &Disk) -> FsResult<()> {
        let folder = disk.get_folder()?;
        info!("Selected disk {} at {:?}", disk.get_name(), folder.get_path());
        self.root = folder.clone();
        self.active = folder;
        Ok(())
    }

    /// `user@host:/<active folder name>$`
    pub fn get_prompt(&self) -> String {
        format!(
            "{}@{}:/{}$",
            current_user(),
            sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string()),
            self.active.get_name()
        )
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string())
}

/// Fold `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// Workspace
// ============================================================================

/// All panes plus the index of the focused one
#[derive(Debug)]
pub struct Workspace {
    config: AppConfig,
    panes: Vec<FileManager>,
    focused: usize,
}

impl Workspace {
    /// One pane per `config.pane_count`, each starting at the configured root
    pub fn new(config: AppConfig) -> FsResult<Self> {
        if config.pane_count == 0 {
            return Err(FsError::Config {
                reason: "pane_count must be at least 1".to_string(),
            });
        }
        let panes = (0..config.pane_count)
            .map(|_| FileManager::from_config(&config))
            .collect::<FsResult<Vec<_>>>()?;
        info!("Workspace with {} pane(s) at {:?}", panes.len(), config.root);
        Ok(Self {
            config,
            panes,
            focused: 0,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    pub fn pane(&self, index: usize) -> Option<&FileManager> {
        self.panes.get(index)
    }

    pub fn pane_mut(&mut self, index: usize) -> Option<&mut FileManager> {
        self.panes.get_mut(index)
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused_pane(&self) -> &FileManager {
        &self.panes[self.focused]
    }

    pub fn focused_pane_mut(&mut self) -> &mut FileManager {
        &mut self.panes[self.focused]
    }

    /// Give focus to pane `index`. Returns false if there is no such pane.
    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.panes.len() {
            self.focused = index;
            true
        } else {
            false
        }
    }

    /// Pane after the focused one, wrapping around. The usual copy/move
    /// target in a two-pane layout.
    pub fn other_pane(&self) -> &FileManager {
        &self.panes[(self.focused + 1) % self.panes.len()]
    }
}
