//! File and folder handles
//!
//! An [`Item`] is either a [`File`] or a [`Folder`], identified by its
//! absolute path. Kind-specific behaviour is dispatched inside each operation,
//! so callers never branch on the kind themselves.
//!
//! Moves are a copy followed by removal of the source, never a native rename.
//! A failure between the two steps leaves both entries in place.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::operations::{
    absolute, copy_dir_recursive, display_name, ensure_directory, entry_exists, folder_size,
    format_time, free_destination, is_within, item_count, posix_timestamp, remove_link,
    remove_path, validate_name,
};
use crate::error::{FsError, FsResult};
use crate::shell;
use crate::types::SizeUnit;

/// Handle to a regular file (possibly a symlink to one)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
    name: String,
}

/// Handle to a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    path: PathBuf,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    File(File),
    Folder(Folder),
}

// ============================================================================
// File
// ============================================================================

impl File {
    /// Handle to an existing non-directory entry
    pub fn at(path: impl AsRef<Path>) -> FsResult<File> {
        match Item::at(path)? {
            Item::File(file) => Ok(file),
            Item::Folder(folder) => Err(FsError::InvalidDestination {
                path: folder.path,
                reason: "expected a file, found a folder".to_string(),
            }),
        }
    }

    fn unchecked(path: PathBuf) -> File {
        let name = display_name(&path);
        File { path, name }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_size(&self, unit: SizeUnit) -> FsResult<f64> {
        let meta = fs::metadata(&self.path).map_err(|e| FsError::from_io(e, &self.path))?;
        Ok(unit.convert(meta.len()))
    }

    /// Last modification as seconds since the Unix epoch
    pub fn get_modification_time(&self) -> FsResult<f64> {
        let meta = fs::metadata(&self.path).map_err(|e| FsError::from_io(e, &self.path))?;
        let modified = meta.modified().map_err(|e| FsError::from_io(e, &self.path))?;
        Ok(posix_timestamp(modified))
    }

    /// Hand the file to the OS default application
    pub fn open(&self) -> FsResult<()> {
        info!("Opening {:?} with default application", self.path);
        shell::launch_default_app(&self.path)
    }
}

// ============================================================================
// Folder
// ============================================================================

impl Folder {
    /// Handle to an existing directory
    pub fn at(path: impl AsRef<Path>) -> FsResult<Folder> {
        let path = ensure_directory(path.as_ref())?;
        Ok(Folder::unchecked(path))
    }

    fn unchecked(path: PathBuf) -> Folder {
        let name = display_name(&path);
        Folder { path, name }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    /// Parent folder, `None` at a filesystem root
    pub fn get_parent(&self) -> Option<Folder> {
        parent_of(&self.path)
    }

    /// Current children, in directory order. Listed fresh on every call.
    pub fn get_content(&self) -> FsResult<Vec<Item>> {
        let entries = fs::read_dir(&self.path).map_err(|e| FsError::from_io(e, &self.path))?;
        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(e, &self.path))?;
            items.push(Item::classify(entry.path()));
        }
        Ok(items)
    }

    pub fn create_folder(&self, name: &str) -> FsResult<Folder> {
        validate_name(name)?;
        let new_folder = self.path.join(name);
        debug!("Creating folder at: {:?}", new_folder);

        fs::create_dir(&new_folder).map_err(|e| {
            warn!("Failed to create folder {:?}: {}", new_folder, e);
            FsError::from_io(e, &new_folder)
        })?;

        info!("Created folder: {:?}", new_folder);
        Ok(Folder::unchecked(new_folder))
    }

    /// Create an empty file. An existing entry with that name is an error.
    pub fn create_file(&self, name: &str) -> FsResult<File> {
        validate_name(name)?;
        let new_file = self.path.join(name);
        debug!("Creating file at: {:?}", new_file);

        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&new_file)
            .map_err(|e| {
                warn!("Failed to create file {:?}: {}", new_file, e);
                FsError::from_io(e, &new_file)
            })?;

        info!("Created file: {:?}", new_file);
        Ok(File::unchecked(new_file))
    }

    /// Total size of regular files in the tree, symlinks excluded
    pub fn get_size(&self, unit: SizeUnit) -> FsResult<f64> {
        Ok(unit.convert(folder_size(&self.path)?))
    }

    /// Files and subdirectories anywhere below this folder
    pub fn get_item_count(&self) -> FsResult<u64> {
        item_count(&self.path)
    }

    pub fn get_modification_time(&self) -> FsResult<f64> {
        let meta = fs::metadata(&self.path).map_err(|e| FsError::from_io(e, &self.path))?;
        let modified = meta.modified().map_err(|e| FsError::from_io(e, &self.path))?;
        Ok(posix_timestamp(modified))
    }
}

impl AsRef<Path> for Folder {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

fn parent_of(path: &Path) -> Option<Folder> {
    path.parent().map(|p| Folder::unchecked(p.to_path_buf()))
}

/// Same directory entry, comparing resolved parents but not the final
/// component, so a link is not confused with what it points to
fn same_entry(a: &Path, b: &Path) -> bool {
    let parent = |p: &Path| p.parent().and_then(|d| d.canonicalize().ok());
    a.file_name() == b.file_name() && parent(a).is_some() && parent(a) == parent(b)
}

// ============================================================================
// Item
// ============================================================================

impl Item {
    /// Handle to whatever exists at `path`. Relative paths are made absolute
    /// against the process working directory; symlinks are not resolved.
    pub fn at(path: impl AsRef<Path>) -> FsResult<Item> {
        let path = absolute(path.as_ref())?;
        fs::symlink_metadata(&path).map_err(|e| FsError::from_io(e, &path))?;
        Ok(Item::classify(path))
    }

    /// Directories (and links to them) become folders, everything else files
    fn classify(path: PathBuf) -> Item {
        if path.is_dir() {
            Item::Folder(Folder::unchecked(path))
        } else {
            Item::File(File::unchecked(path))
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Item::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }

    pub fn get_name(&self) -> &str {
        match self {
            Item::File(f) => &f.name,
            Item::Folder(f) => &f.name,
        }
    }

    pub fn get_path(&self) -> &Path {
        match self {
            Item::File(f) => &f.path,
            Item::Folder(f) => &f.path,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Item::Folder(f) => Some(f),
            Item::File(_) => None,
        }
    }

    pub fn get_parent(&self) -> Option<Folder> {
        parent_of(self.get_path())
    }

    pub fn get_size(&self, unit: SizeUnit) -> FsResult<f64> {
        match self {
            Item::File(f) => f.get_size(unit),
            Item::Folder(f) => f.get_size(unit),
        }
    }

    pub fn get_modification_time(&self) -> FsResult<f64> {
        match self {
            Item::File(f) => f.get_modification_time(),
            Item::Folder(f) => f.get_modification_time(),
        }
    }

    /// Local-time rendering of the modification time
    pub fn format_modified(&self) -> Option<String> {
        fs::metadata(self.get_path())
            .ok()
            .and_then(|m| format_time(m.modified()))
    }

    fn relocate(&mut self, new_path: PathBuf) {
        let name = display_name(&new_path);
        match self {
            Item::File(f) => {
                f.path = new_path;
                f.name = name;
            }
            Item::Folder(f) => {
                f.path = new_path;
                f.name = name;
            }
        }
    }

    /// Whether copying into `destination` would not collide with an existing
    /// entry of the same name
    pub fn can_be_copied(&self, destination: impl AsRef<Path>) -> bool {
        !entry_exists(&destination.as_ref().join(self.get_name()))
    }

    /// Rename within the current parent folder
    pub fn rename(&mut self, new_name: &str) -> FsResult<()> {
        info!("rename: from={:?} to={:?}", self.get_path(), new_name);
        validate_name(new_name)?;

        let old_path = self.get_path().to_path_buf();
        if !entry_exists(&old_path) {
            warn!("Rename failed: source does not exist: {:?}", old_path);
            return Err(FsError::NotFound { path: old_path });
        }

        let parent = old_path.parent().ok_or_else(|| FsError::InvalidName {
            name: new_name.to_string(),
            reason: "a filesystem root cannot be renamed".to_string(),
        })?;
        let new_path = parent.join(new_name);
        if new_path == old_path {
            return Ok(());
        }

        if entry_exists(&new_path) {
            warn!("Rename failed: destination already exists: {:?}", new_path);
            return Err(FsError::AlreadyExists { path: new_path });
        }

        fs::rename(&old_path, &new_path).map_err(|e| {
            warn!("Rename failed: {:?}", e);
            FsError::from_io(e, &old_path)
        })?;

        info!("Renamed {:?} to {:?}", old_path, new_path);
        self.relocate(new_path);
        Ok(())
    }

    /// Copy into the folder `destination`.
    ///
    /// With `rename_on_duplicate` a taken name becomes `name(2)`, `name(3)`,
    /// ... Without it an existing entry of the same kind is replaced; one of
    /// the other kind is left alone and reported as `AlreadyExists`.
    pub fn copy(&self, destination: impl AsRef<Path>, rename_on_duplicate: bool) -> FsResult<Item> {
        let source = self.get_path();
        info!(
            "copy: from={:?} to={:?} rename_on_duplicate={}",
            source,
            destination.as_ref(),
            rename_on_duplicate
        );

        let dest_dir = ensure_directory(destination.as_ref())?;
        if !entry_exists(source) {
            warn!("Copy failed: source does not exist: {:?}", source);
            return Err(FsError::NotFound {
                path: source.to_path_buf(),
            });
        }

        if self.is_folder() && is_within(&dest_dir, source) {
            warn!("Copy failed: {:?} is inside {:?}", dest_dir, source);
            return Err(FsError::InvalidDestination {
                path: dest_dir,
                reason: "cannot copy a folder into itself".to_string(),
            });
        }

        let target = if rename_on_duplicate {
            free_destination(&dest_dir, self.get_name())
        } else {
            let target = dest_dir.join(self.get_name());
            self.clear_overwrite_target(&target)?;
            target
        };
        debug!("Copy destination path: {:?}", target);

        match self {
            Item::File(_) => {
                fs::copy(source, &target).map_err(|e| {
                    warn!("Failed to copy file {:?}: {}", source, e);
                    FsError::from_io(e, source)
                })?;
            }
            Item::Folder(_) => {
                copy_dir_recursive(source, &target).map_err(|e| {
                    warn!("Failed to copy folder {:?}: {}", source, e);
                    e
                })?;
            }
        }

        info!("Copied {:?} to {:?}", source, target);
        Ok(Item::classify(target))
    }

    /// Make room for an overwriting copy at `target`. Nothing is removed if
    /// the target is, or contains, the item itself.
    fn clear_overwrite_target(&self, target: &Path) -> FsResult<()> {
        if !entry_exists(target) {
            return Ok(());
        }
        if self.is_folder() != target.is_dir() {
            warn!("Copy failed: {:?} exists with a different kind", target);
            return Err(FsError::AlreadyExists {
                path: target.to_path_buf(),
            });
        }

        let source = self.get_path();
        let itself = || FsError::InvalidDestination {
            path: target.to_path_buf(),
            reason: "cannot overwrite an item with itself".to_string(),
        };
        if same_entry(target, source) {
            return Err(itself());
        }

        // A link is replaced, not written through
        if target.is_symlink() {
            return remove_link(target);
        }

        if is_within(target, source) && is_within(source, target) {
            return Err(itself());
        }
        if is_within(source, target) {
            warn!("Copy failed: {:?} would replace its own ancestor {:?}", source, target);
            return Err(FsError::InvalidDestination {
                path: target.to_path_buf(),
                reason: "cannot overwrite a folder that contains the item".to_string(),
            });
        }

        match self {
            Item::Folder(_) => {
                debug!("Removing existing folder before overwrite: {:?}", target);
                remove_path(target, true)
            }
            Item::File(_) => Ok(()),
        }
    }

    /// Move into the folder `destination` as copy followed by removal of the
    /// source. On success the handle points at the new location.
    pub fn move_to(&mut self, destination: impl AsRef<Path>, rename_on_duplicate: bool) -> FsResult<()> {
        info!("move: from={:?} to={:?}", self.get_path(), destination.as_ref());

        let copied = self.copy(destination, rename_on_duplicate)?;
        let original = self.get_path().to_path_buf();

        if let Err(e) = remove_path(&original, self.is_folder()) {
            warn!(
                "Move left a duplicate: copied to {:?}, source {:?} remains: {}",
                copied.get_path(),
                original,
                e
            );
            return Err(FsError::PartialMove {
                original,
                copied_to: copied.get_path().to_path_buf(),
                reason: e.to_string(),
            });
        }

        info!("Moved {:?} to {:?}", original, copied.get_path());
        self.relocate(copied.get_path().to_path_buf());
        Ok(())
    }

    /// Delete the entry (recursively for folders) and return its parent.
    /// Folder removal is best-effort, not transactional.
    pub fn remove(self) -> FsResult<Folder> {
        info!("remove: path={:?}", self.get_path());
        let parent = self.removable_parent()?;
        remove_path(self.get_path(), self.is_folder())?;
        info!("Removed {:?}", self.get_path());
        Ok(parent)
    }

    /// Move the entry to the OS trash and return its parent
    pub fn trash(self) -> FsResult<Folder> {
        info!("trash: path={:?}", self.get_path());
        let parent = self.removable_parent()?;
        trash::delete(self.get_path()).map_err(|e| {
            warn!("Failed to move {:?} to trash: {}", self.get_path(), e);
            FsError::Io {
                path: self.get_path().to_path_buf(),
                reason: format!("Failed to move to trash: {}", e),
            }
        })?;
        info!("Moved to trash: {:?}", self.get_path());
        Ok(parent)
    }

    fn removable_parent(&self) -> FsResult<Folder> {
        let path = self.get_path();
        if !entry_exists(path) {
            warn!("Remove failed: does not exist: {:?}", path);
            return Err(FsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        self.get_parent().ok_or_else(|| FsError::InvalidDestination {
            path: path.to_path_buf(),
            reason: "a filesystem root cannot be removed".to_string(),
        })
    }
}

impl From<File> for Item {
    fn from(file: File) -> Self {
        Item::File(file)
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Folder) {
        let dir = TempDir::new().unwrap();
        let folder = Folder::at(dir.path()).unwrap();
        (dir, folder)
    }

    fn names(folder: &Folder) -> Vec<String> {
        let mut names: Vec<String> = folder
            .get_content()
            .unwrap()
            .iter()
            .map(|i| i.get_name().to_string())
            .collect();
        names.sort();
        names
    }

    // ========== construction tests ==========

    #[test]
    fn test_item_at_classifies_kind() {
        let (_dir, root) = setup();
        root.create_file("f.txt").unwrap();
        root.create_folder("sub").unwrap();

        assert!(Item::at(root.get_path().join("f.txt")).unwrap().is_file());
        assert!(Item::at(root.get_path().join("sub")).unwrap().is_folder());
    }

    #[test]
    fn test_item_at_missing_is_not_found() {
        let (_dir, root) = setup();
        let err = Item::at(root.get_path().join("ghost")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[test]
    fn test_folder_at_rejects_file() {
        let (_dir, root) = setup();
        let file = root.create_file("f").unwrap();
        assert!(matches!(
            Folder::at(file.get_path()),
            Err(FsError::NotADirectory { .. })
        ));
    }

    // ========== folder content tests ==========

    #[test]
    fn test_get_content_lists_children() {
        let (_dir, root) = setup();
        root.create_file("a").unwrap();
        root.create_folder("b").unwrap();
        assert_eq!(names(&root), vec!["a", "b"]);
    }

    #[test]
    fn test_create_file_existing_fails() {
        let (_dir, root) = setup();
        root.create_file("dup").unwrap();
        assert!(matches!(
            root.create_file("dup"),
            Err(FsError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_create_folder_invalid_name() {
        let (_dir, root) = setup();
        assert!(matches!(
            root.create_folder("a/b"),
            Err(FsError::InvalidName { .. })
        ));
    }

    // ========== size tests ==========

    #[test]
    fn test_empty_folder_size_is_zero_in_every_unit() {
        let (_dir, root) = setup();
        let empty = root.create_folder("empty").unwrap();
        for unit in [SizeUnit::B, SizeUnit::KB, SizeUnit::MB, SizeUnit::GB, SizeUnit::TB] {
            assert_eq!(empty.get_size(unit).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_file_size_in_kb() {
        let (_dir, root) = setup();
        let file = root.create_file("k").unwrap();
        fs::write(file.get_path(), vec![0u8; 2048]).unwrap();
        assert_eq!(file.get_size(SizeUnit::KB).unwrap(), 2.0);
        assert_eq!(Item::from(file).get_size(SizeUnit::B).unwrap(), 2048.0);
    }

    #[test]
    fn test_item_count_two_files_one_subfolder() {
        let (_dir, root) = setup();
        let top = root.create_folder("top").unwrap();
        top.create_file("one").unwrap();
        top.create_file("two").unwrap();
        let sub = top.create_folder("sub").unwrap();
        sub.create_file("three").unwrap();
        assert_eq!(top.get_item_count().unwrap(), 4);
    }

    #[test]
    fn test_modification_time_is_recent() {
        let (_dir, root) = setup();
        let file = root.create_file("t").unwrap();
        let now = posix_timestamp(std::time::SystemTime::now());
        let mtime = file.get_modification_time().unwrap();
        assert!((now - mtime).abs() < 60.0);
        assert!(Item::from(file).format_modified().is_some());
    }

    // ========== rename tests ==========

    #[test]
    fn test_rename_updates_handle() {
        let (_dir, root) = setup();
        let mut item = Item::from(root.create_file("old").unwrap());
        item.rename("new").unwrap();
        assert_eq!(item.get_name(), "new");
        assert_eq!(item.get_path(), root.get_path().join("new"));
        assert!(item.get_path().exists());
        assert!(!root.get_path().join("old").exists());
    }

    #[test]
    fn test_rename_collision() {
        let (_dir, root) = setup();
        root.create_file("taken").unwrap();
        let mut item = Item::from(root.create_file("mine").unwrap());
        let err = item.rename("taken").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
        assert_eq!(item.get_name(), "mine");
    }

    #[test]
    fn test_rename_vanished_source() {
        let (_dir, root) = setup();
        let file = root.create_file("gone").unwrap();
        fs::remove_file(file.get_path()).unwrap();
        let mut item = Item::from(file);
        assert!(matches!(
            item.rename("whatever"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_rename_rejects_cross_directory() {
        let (_dir, root) = setup();
        let mut item = Item::from(root.create_file("f").unwrap());
        assert!(matches!(
            item.rename("../escape"),
            Err(FsError::InvalidName { .. })
        ));
    }

    // ========== copy tests ==========

    #[test]
    fn test_copy_then_copy_with_rename_gives_suffix() {
        let (_dir, root) = setup();
        let src = root.create_folder("src").unwrap();
        let dest = root.create_folder("dest").unwrap();
        let file = Item::from(src.create_file("notes.txt").unwrap());

        let first = file.copy(&dest, false).unwrap();
        let second = file.copy(&dest, true).unwrap();

        assert_eq!(first.get_name(), "notes.txt");
        assert_eq!(second.get_name(), "notes.txt(2)");
        assert_eq!(names(&dest), vec!["notes.txt", "notes.txt(2)"]);
    }

    #[test]
    fn test_copy_folder_twice_with_rename() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let folder = root.create_folder("pics").unwrap();
        folder.create_file("a.png").unwrap();
        let item = Item::from(folder);

        item.copy(&dest, false).unwrap();
        let again = item.copy(&dest, true).unwrap();
        let third = item.copy(&dest, true).unwrap();

        assert_eq!(again.get_name(), "pics(2)");
        assert_eq!(third.get_name(), "pics(3)");
        assert_eq!(again.as_folder().unwrap().get_item_count().unwrap(), 1);
    }

    #[test]
    fn test_copy_overwrites_file() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        fs::write(dest.get_path().join("f"), b"old").unwrap();
        let src = root.create_file("f").unwrap();
        fs::write(src.get_path(), b"new").unwrap();

        Item::from(src).copy(&dest, false).unwrap();
        assert_eq!(fs::read(dest.get_path().join("f")).unwrap(), b"new");
    }

    #[test]
    fn test_copy_overwrites_folder_replacing_contents() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let stale = dest.create_folder("box").unwrap();
        stale.create_file("stale").unwrap();

        let fresh = root.create_folder("box").unwrap();
        fresh.create_file("fresh").unwrap();

        Item::from(fresh).copy(&dest, false).unwrap();
        let copied = Folder::at(dest.get_path().join("box")).unwrap();
        assert_eq!(names(&copied), vec!["fresh"]);
    }

    #[test]
    fn test_copy_file_over_folder_is_already_exists() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        dest.create_folder("clash").unwrap();
        let file = Item::from(root.create_file("clash").unwrap());
        assert!(matches!(
            file.copy(&dest, false),
            Err(FsError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_copy_folder_into_itself_rejected() {
        let (_dir, root) = setup();
        let folder = root.create_folder("loop").unwrap();
        let inner = folder.create_folder("inner").unwrap();
        let item = Item::from(folder);
        assert!(matches!(
            item.copy(&inner, true),
            Err(FsError::InvalidDestination { .. })
        ));
    }

    #[test]
    fn test_copy_overwrite_of_folder_holding_source_rejected() {
        let (_dir, root) = setup();
        let outer = root.create_folder("x").unwrap();
        let inner = outer.create_folder("x").unwrap();
        fs::write(inner.get_path().join("precious.txt"), b"keep me").unwrap();

        let err = Item::from(inner.clone()).copy(&root, false).unwrap_err();

        assert!(matches!(err, FsError::InvalidDestination { .. }));
        assert_eq!(
            fs::read(inner.get_path().join("precious.txt")).unwrap(),
            b"keep me"
        );
    }

    #[test]
    fn test_move_overwrite_of_folder_holding_source_rejected() {
        let (_dir, root) = setup();
        let outer = root.create_folder("x").unwrap();
        let inner = outer.create_folder("x").unwrap();
        fs::write(inner.get_path().join("precious.txt"), b"keep me").unwrap();

        let mut item = Item::from(inner.clone());
        let err = item.move_to(&root, false).unwrap_err();

        assert!(matches!(err, FsError::InvalidDestination { .. }));
        assert_eq!(item.get_path(), inner.get_path());
        assert!(inner.get_path().join("precious.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_overwrite_replaces_link_instead_of_writing_through() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let elsewhere = root.get_path().join("elsewhere");
        fs::write(&elsewhere, b"untouched").unwrap();
        std::os::unix::fs::symlink(&elsewhere, dest.get_path().join("f")).unwrap();

        let src = root.create_file("f").unwrap();
        fs::write(src.get_path(), b"new").unwrap();
        Item::from(src).copy(&dest, false).unwrap();

        let target = dest.get_path().join("f");
        assert!(!target.is_symlink());
        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert_eq!(fs::read(&elsewhere).unwrap(), b"untouched");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_link_onto_itself_keeps_link() {
        let (_dir, root) = setup();
        root.create_file("real").unwrap();
        let link = root.get_path().join("link");
        std::os::unix::fs::symlink(root.get_path().join("real"), &link).unwrap();

        let item = Item::at(&link).unwrap();
        assert!(matches!(
            item.copy(&root, false),
            Err(FsError::InvalidDestination { .. })
        ));
        assert!(link.is_symlink());
    }

    #[test]
    fn test_copy_onto_itself_without_rename_rejected() {
        let (_dir, root) = setup();
        let file = Item::from(root.create_file("same").unwrap());
        assert!(matches!(
            file.copy(&root, false),
            Err(FsError::InvalidDestination { .. })
        ));
        assert!(root.get_path().join("same").exists());
    }

    #[test]
    fn test_copy_into_missing_destination() {
        let (_dir, root) = setup();
        let file = Item::from(root.create_file("f").unwrap());
        assert!(matches!(
            file.copy(root.get_path().join("nowhere"), false),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_can_be_copied() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let file = Item::from(root.create_file("f").unwrap());
        assert!(file.can_be_copied(&dest));
        file.copy(&dest, false).unwrap();
        assert!(!file.can_be_copied(&dest));
    }

    // ========== move tests ==========

    #[test]
    fn test_move_file_preserves_content() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let file = root.create_file("data.bin").unwrap();
        fs::write(file.get_path(), b"payload").unwrap();
        let original = file.get_path().to_path_buf();

        let mut item = Item::from(file);
        item.move_to(&dest, false).unwrap();

        assert!(!original.exists());
        assert_eq!(item.get_path(), dest.get_path().join("data.bin"));
        assert_eq!(fs::read(item.get_path()).unwrap(), b"payload");
    }

    #[test]
    fn test_move_folder_preserves_count() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        let folder = root.create_folder("tree").unwrap();
        folder.create_file("a").unwrap();
        folder.create_folder("b").unwrap().create_file("c").unwrap();
        let before = folder.get_item_count().unwrap();
        let original = folder.get_path().to_path_buf();

        let mut item = Item::from(folder);
        item.move_to(&dest, false).unwrap();

        assert!(!original.exists());
        assert_eq!(item.get_name(), "tree");
        assert_eq!(item.as_folder().unwrap().get_item_count().unwrap(), before);
    }

    #[test]
    fn test_move_with_rename_on_duplicate() {
        let (_dir, root) = setup();
        let dest = root.create_folder("dest").unwrap();
        dest.create_file("f").unwrap();
        let mut item = Item::from(root.create_file("f").unwrap());
        item.move_to(&dest, true).unwrap();
        assert_eq!(item.get_name(), "f(2)");
        assert!(!root.get_path().join("f").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_move_with_undeletable_source_leaves_duplicate() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, root) = setup();
        let locked = root.create_folder("locked").unwrap();
        let dest = root.create_folder("dest").unwrap();
        let file = locked.create_file("stuck").unwrap();
        fs::set_permissions(locked.get_path(), fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions; nothing to observe then.
        if fs::File::create(locked.get_path().join("write_check")).is_ok() {
            fs::set_permissions(locked.get_path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut item = Item::from(file);
        let err = item.move_to(&dest, false).unwrap_err();
        fs::set_permissions(locked.get_path(), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, FsError::PartialMove { .. }));
        assert!(locked.get_path().join("stuck").exists());
        assert!(dest.get_path().join("stuck").exists());
        assert_eq!(item.get_path(), locked.get_path().join("stuck"));
    }

    // ========== remove tests ==========

    #[test]
    fn test_remove_file_returns_parent() {
        let (_dir, root) = setup();
        let file = root.create_file("bye").unwrap();
        let parent = Item::from(file).remove().unwrap();
        assert_eq!(parent.get_path(), root.get_path());
        assert!(names(&root).is_empty());
    }

    #[test]
    fn test_remove_folder_recursive() {
        let (_dir, root) = setup();
        let folder = root.create_folder("deep").unwrap();
        folder.create_folder("x").unwrap().create_file("y").unwrap();
        Item::from(folder).remove().unwrap();
        assert!(!root.get_path().join("deep").exists());
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let (_dir, root) = setup();
        let file = root.create_file("twice").unwrap();
        let item = Item::from(file);
        let copy = item.clone();
        item.remove().unwrap();
        assert!(matches!(copy.remove(), Err(FsError::NotFound { .. })));
    }
}
