//! File-related commands
//!
//! String-in, serializable-out wrappers over the item model and the batch
//! runner. Typed errors become their display message here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::files::operations::absolute;
use crate::files::{BatchAction, BatchReport, BatchRunner, DuplicatePolicy, Folder, Item, RenamePrompt};
use crate::session::FileManager;
use crate::types::{FileEntry, FileOperationResult, ItemInfo, SizeUnit};

fn to_paths(paths: Vec<String>) -> Vec<PathBuf> {
    paths.into_iter().map(PathBuf::from).collect()
}

fn done(message: String, new_path: Option<&Path>) -> FileOperationResult {
    FileOperationResult {
        success: true,
        message,
        new_path: new_path.map(|p| p.to_string_lossy().to_string()),
    }
}

fn copy_action(destination: String, on_duplicate: &str, moving: bool) -> Result<BatchAction, String> {
    let destination = PathBuf::from(destination);
    let on_duplicate: DuplicatePolicy = on_duplicate.parse()?;
    Ok(if moving {
        BatchAction::Move {
            destination,
            on_duplicate,
        }
    } else {
        BatchAction::Copy {
            destination,
            on_duplicate,
        }
    })
}

/// Prompt answering from a fixed path -> new name table. Paths not in the
/// table are cancelled.
fn table_prompt(renames: Vec<(String, String)>) -> RenamePrompt {
    let table: HashMap<PathBuf, String> = renames
        .into_iter()
        .map(|(path, name)| {
            let path = PathBuf::from(path);
            (absolute(&path).unwrap_or(path), name)
        })
        .collect();
    Box::new(move |item: &Item| table.get(item.get_path()).cloned())
}

pub fn list_directory(path: String, show_hidden: bool) -> Result<Vec<FileEntry>, String> {
    let dir = if path.is_empty() {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
    } else {
        PathBuf::from(path)
    };
    let mut manager = FileManager::new(&dir).map_err(|e| e.to_string())?;
    manager.set_show_hidden(show_hidden);
    manager.list_entries().map_err(|e| e.to_string())
}

pub fn get_item_info(path: String, unit: String) -> Result<ItemInfo, String> {
    let unit: SizeUnit = if unit.is_empty() {
        SizeUnit::default()
    } else {
        unit.parse()?
    };
    let item = Item::at(&path).map_err(|e| e.to_string())?;
    let size = item.get_size(unit).map_err(|e| e.to_string())?;
    let item_count = match item.as_folder() {
        Some(folder) => Some(folder.get_item_count().map_err(|e| e.to_string())?),
        None => None,
    };

    Ok(ItemInfo {
        path: item.get_path().to_string_lossy().to_string(),
        name: item.get_name().to_string(),
        is_dir: item.is_folder(),
        size,
        unit,
        modified: item.format_modified(),
        item_count,
    })
}

pub fn rename_item(path: String, new_name: String) -> Result<FileOperationResult, String> {
    let mut item = Item::at(&path).map_err(|e| e.to_string())?;
    item.rename(&new_name).map_err(|e| e.to_string())?;
    Ok(done(
        format!("Renamed to {}", item.get_name()),
        Some(item.get_path()),
    ))
}

pub fn create_folder(path: String, name: String) -> Result<FileOperationResult, String> {
    let parent = Folder::at(&path).map_err(|e| e.to_string())?;
    let folder = parent.create_folder(&name).map_err(|e| e.to_string())?;
    Ok(done(
        format!("Created folder {}", folder.get_name()),
        Some(folder.get_path()),
    ))
}

pub fn create_file(path: String, name: String) -> Result<FileOperationResult, String> {
    let parent = Folder::at(&path).map_err(|e| e.to_string())?;
    let file = parent.create_file(&name).map_err(|e| e.to_string())?;
    Ok(done(
        format!("Created file {}", file.get_name()),
        Some(file.get_path()),
    ))
}

pub fn open_file(path: String) -> Result<FileOperationResult, String> {
    let file = crate::files::File::at(&path).map_err(|e| e.to_string())?;
    file.open().map_err(|e| e.to_string())?;
    Ok(done(format!("Opened {}", file.get_name()), None))
}

/// Delete (or trash, unless `permanent`) every selected item the filter accepts
pub fn delete_items(
    runner: &BatchRunner,
    paths: Vec<String>,
    filter: String,
    permanent: bool,
) -> Result<BatchReport, String> {
    let action = if permanent {
        BatchAction::Delete
    } else {
        BatchAction::Trash
    };
    runner
        .run_paths(to_paths(paths), &filter, action)
        .map_err(|e| e.to_string())
}

pub fn copy_items(
    runner: &BatchRunner,
    paths: Vec<String>,
    destination: String,
    filter: String,
    on_duplicate: String,
) -> Result<BatchReport, String> {
    let action = copy_action(destination, &on_duplicate, false)?;
    runner
        .run_paths(to_paths(paths), &filter, action)
        .map_err(|e| e.to_string())
}

pub fn move_items(
    runner: &BatchRunner,
    paths: Vec<String>,
    destination: String,
    filter: String,
    on_duplicate: String,
) -> Result<BatchReport, String> {
    let action = copy_action(destination, &on_duplicate, true)?;
    runner
        .run_paths(to_paths(paths), &filter, action)
        .map_err(|e| e.to_string())
}

/// Rename selected items from a `(path, new name)` table
pub fn rename_items(
    runner: &BatchRunner,
    renames: Vec<(String, String)>,
    filter: String,
) -> Result<BatchReport, String> {
    let paths = renames.iter().map(|(p, _)| PathBuf::from(p)).collect();
    runner
        .run_paths(paths, &filter, BatchAction::Rename(table_prompt(renames)))
        .map_err(|e| e.to_string())
}

pub async fn delete_items_async(
    runner: &BatchRunner,
    paths: Vec<String>,
    filter: String,
    permanent: bool,
) -> Result<BatchReport, String> {
    let action = if permanent {
        BatchAction::Delete
    } else {
        BatchAction::Trash
    };
    runner
        .run_paths_async(to_paths(paths), filter, action)
        .await
        .map_err(|e| e.to_string())
}

pub async fn copy_items_async(
    runner: &BatchRunner,
    paths: Vec<String>,
    destination: String,
    filter: String,
    on_duplicate: String,
) -> Result<BatchReport, String> {
    let action = copy_action(destination, &on_duplicate, false)?;
    runner
        .run_paths_async(to_paths(paths), filter, action)
        .await
        .map_err(|e| e.to_string())
}

pub async fn move_items_async(
    runner: &BatchRunner,
    paths: Vec<String>,
    destination: String,
    filter: String,
    on_duplicate: String,
) -> Result<BatchReport, String> {
    let action = copy_action(destination, &on_duplicate, true)?;
    runner
        .run_paths_async(to_paths(paths), filter, action)
        .await
        .map_err(|e| e.to_string())
}

pub async fn rename_items_async(
    runner: &BatchRunner,
    renames: Vec<(String, String)>,
    filter: String,
) -> Result<BatchReport, String> {
    let paths = renames.iter().map(|(p, _)| PathBuf::from(p)).collect();
    runner
        .run_paths_async(paths, filter, BatchAction::Rename(table_prompt(renames)))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use std::fs;
    use tempfile::TempDir;

    fn s(p: &Path) -> String {
        p.to_string_lossy().to_string()
    }

    // ========== single item command tests ==========

    #[test]
    fn test_item_info_for_folder() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 2048]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let info = get_item_info(s(dir.path()), "kb".to_string()).unwrap();
        assert!(info.is_dir);
        assert_eq!(info.size, 2.0);
        assert_eq!(info.unit, SizeUnit::KB);
        assert_eq!(info.item_count, Some(2));
    }

    #[test]
    fn test_item_info_bad_unit() {
        let dir = TempDir::new().unwrap();
        let err = get_item_info(s(dir.path()), "PB".to_string()).unwrap_err();
        assert!(err.contains("PB"));
    }

    #[test]
    fn test_create_and_rename_messages() {
        let dir = TempDir::new().unwrap();
        let created = create_file(s(dir.path()), "draft".to_string()).unwrap();
        assert!(created.success);

        let renamed = rename_item(created.new_path.unwrap(), "final".to_string()).unwrap();
        assert_eq!(renamed.new_path, Some(s(&dir.path().join("final"))));

        let err = create_file(s(dir.path()), "final".to_string()).unwrap_err();
        assert!(err.starts_with("Already exists"));
    }

    #[test]
    fn test_list_directory_hides_dotfiles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".secret"), b"").unwrap();
        fs::write(dir.path().join("open"), b"").unwrap();

        assert_eq!(list_directory(s(dir.path()), false).unwrap().len(), 1);
        assert_eq!(list_directory(s(dir.path()), true).unwrap().len(), 2);
    }

    // ========== batch command tests ==========

    #[test]
    fn test_copy_items_rejects_unknown_policy() {
        let dir = TempDir::new().unwrap();
        let runner = BatchRunner::new(ShellConfig::default());
        let err = copy_items(&runner, vec![], s(dir.path()), String::new(), "merge".to_string())
            .unwrap_err();
        assert!(err.contains("merge"));
    }

    #[test]
    fn test_rename_items_from_table() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x"), b"").unwrap();
        fs::write(dir.path().join("y"), b"").unwrap();
        let runner = BatchRunner::new(ShellConfig::default());

        let report = rename_items(
            &runner,
            vec![
                (s(&dir.path().join("x")), "x2".to_string()),
                (s(&dir.path().join("y")), "y2".to_string()),
            ],
            String::new(),
        )
        .unwrap();

        assert_eq!(report.success, 2);
        assert!(dir.path().join("x2").exists());
        assert!(dir.path().join("y2").exists());
    }

    #[tokio::test]
    async fn test_move_items_async() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir(&dest).unwrap();
        fs::write(dir.path().join("m"), b"data").unwrap();
        let runner = BatchRunner::new(ShellConfig::default());

        let report = move_items_async(
            &runner,
            vec![s(&dir.path().join("m"))],
            s(&dest),
            String::new(),
            "refuse".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(report.success, 1);
        assert_eq!(fs::read(dest.join("m")).unwrap(), b"data");
        assert!(!dir.path().join("m").exists());
    }

    #[test]
    fn test_delete_items_malformed_filter_message() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep"), b"").unwrap();
        let runner = BatchRunner::new(ShellConfig::default());

        let err = delete_items(
            &runner,
            vec![s(&dir.path().join("keep"))],
            "no operator".to_string(),
            true,
        )
        .unwrap_err();
        assert!(!err.is_empty());
        assert!(dir.path().join("keep").exists());
    }
}
