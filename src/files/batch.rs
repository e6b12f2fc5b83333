//! Batch operations over a selection of items
//!
//! A batch applies one action to many items in selection order:
//! 1. The filter text is parsed once. A syntax error aborts the whole batch
//!    before any item is touched.
//! 2. Items the filter rejects are recorded as skipped.
//! 3. Every other item gets the action. A failure is recorded for that item
//!    and the batch moves on to the next one.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::action_filter::ActionFilter;
use super::item::Item;
use super::path_locks::PathLocks;
use crate::config::ShellConfig;
use crate::error::{FsError, FsResult};

/// What to do when the destination already has an entry with the item's name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail the item with `AlreadyExists`
    #[default]
    Refuse,
    /// Pick `name(2)`, `name(3)`, ...
    Rename,
    /// Replace an entry of the same kind
    Overwrite,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "refuse" => Ok(DuplicatePolicy::Refuse),
            "rename" => Ok(DuplicatePolicy::Rename),
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            other => Err(format!(
                "Unknown duplicate policy '{}' (expected refuse, rename or overwrite)",
                other
            )),
        }
    }
}

/// Asked once per included item during a rename batch; `None` skips the item
pub type RenamePrompt = Box<dyn FnMut(&Item) -> Option<String> + Send>;

pub enum BatchAction {
    Delete,
    Trash,
    Copy {
        destination: PathBuf,
        on_duplicate: DuplicatePolicy,
    },
    Move {
        destination: PathBuf,
        on_duplicate: DuplicatePolicy,
    },
    Rename(RenamePrompt),
}

impl BatchAction {
    pub fn name(&self) -> &'static str {
        match self {
            BatchAction::Delete => "delete",
            BatchAction::Trash => "trash",
            BatchAction::Copy { .. } => "copy",
            BatchAction::Move { .. } => "move",
            BatchAction::Rename(_) => "rename",
        }
    }
}

impl fmt::Debug for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchAction::Copy {
                destination,
                on_duplicate,
            }
            | BatchAction::Move {
                destination,
                on_duplicate,
            } => f
                .debug_struct(self.name())
                .field("destination", destination)
                .field("on_duplicate", on_duplicate)
                .finish(),
            _ => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Action applied; `new_path` is where the item now lives, if anywhere
    Done { new_path: Option<PathBuf> },
    /// Rejected by the action filter
    Skipped,
    /// The rename prompt declined to name the item
    Cancelled,
    Failed { error: FsError },
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    pub name: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Per-item results of one batch, in selection order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub action: String,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    fn new(action: &str, outcomes: Vec<ItemOutcome>) -> Self {
        let count = |pred: fn(&ItemStatus) -> bool| outcomes.iter().filter(|o| pred(&o.status)).count();
        Self {
            action: action.to_string(),
            success: count(|s| matches!(s, ItemStatus::Done { .. })),
            failed: count(|s| matches!(s, ItemStatus::Failed { .. })),
            skipped: count(|s| matches!(s, ItemStatus::Skipped | ItemStatus::Cancelled)),
            outcomes,
        }
    }

    /// Failed items with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FsError)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            ItemStatus::Failed { error } => Some((o.path.as_path(), error)),
            _ => None,
        })
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs batches. Clones share the same path-lock registry.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    shell: ShellConfig,
    locks: Arc<PathLocks>,
}

impl BatchRunner {
    pub fn new(shell: ShellConfig) -> Self {
        Self::with_locks(shell, Arc::new(PathLocks::new()))
    }

    pub fn with_locks(shell: ShellConfig, locks: Arc<PathLocks>) -> Self {
        Self { shell, locks }
    }

    /// Apply `action` to `items` in order, gated by `filter_text`
    pub fn run(&self, items: Vec<Item>, filter_text: &str, action: BatchAction) -> FsResult<BatchReport> {
        self.run_selection(items.into_iter().map(Ok).collect(), filter_text, action)
    }

    /// Like [`run`](Self::run) for raw paths. A path that cannot be resolved
    /// fails that item only.
    pub fn run_paths(
        &self,
        paths: Vec<PathBuf>,
        filter_text: &str,
        action: BatchAction,
    ) -> FsResult<BatchReport> {
        let selection = paths
            .into_iter()
            .map(|path| Item::at(&path).map_err(|e| (path, e)))
            .collect();
        self.run_selection(selection, filter_text, action)
    }

    /// Run the batch on a blocking worker thread
    pub async fn run_async(
        &self,
        items: Vec<Item>,
        filter_text: String,
        action: BatchAction,
    ) -> FsResult<BatchReport> {
        let runner = self.clone();
        tokio::task::spawn_blocking(move || runner.run(items, &filter_text, action))
            .await
            .map_err(|e| FsError::TaskJoin {
                reason: e.to_string(),
            })?
    }

    /// Async form of [`run_paths`](Self::run_paths)
    pub async fn run_paths_async(
        &self,
        paths: Vec<PathBuf>,
        filter_text: String,
        action: BatchAction,
    ) -> FsResult<BatchReport> {
        let runner = self.clone();
        tokio::task::spawn_blocking(move || runner.run_paths(paths, &filter_text, action))
            .await
            .map_err(|e| FsError::TaskJoin {
                reason: e.to_string(),
            })?
    }

    fn run_selection(
        &self,
        selection: Vec<Result<Item, (PathBuf, FsError)>>,
        filter_text: &str,
        mut action: BatchAction,
    ) -> FsResult<BatchReport> {
        info!(
            "Batch {}: {} item(s), filter={:?}",
            action.name(),
            selection.len(),
            filter_text
        );

        let filter = ActionFilter::parse(filter_text).map_err(|e| {
            warn!("Batch {} aborted: {}", action.name(), e);
            e
        })?;

        let mut outcomes = Vec::with_capacity(selection.len());
        for entry in selection {
            let item = match entry {
                Ok(item) => item,
                Err((path, error)) => {
                    warn!("Cannot resolve {:?}: {}", path, error);
                    outcomes.push(ItemOutcome {
                        name: super::operations::display_name(&path),
                        path,
                        status: ItemStatus::Failed { error },
                    });
                    continue;
                }
            };

            let path = item.get_path().to_path_buf();
            let name = item.get_name().to_string();

            let status = match &filter {
                Some(f) if !f.evaluate(&item, &self.shell) => {
                    debug!("Filter rejected {:?}", path);
                    ItemStatus::Skipped
                }
                _ => self.apply(item, &mut action),
            };

            if let ItemStatus::Failed { error } = &status {
                warn!("Batch {} failed for {:?}: {}", action.name(), path, error);
            }
            outcomes.push(ItemOutcome { path, name, status });
        }

        let report = BatchReport::new(action.name(), outcomes);
        info!(
            "Batch {} finished: {} done, {} failed, {} skipped",
            report.action, report.success, report.failed, report.skipped
        );
        Ok(report)
    }

    fn apply(&self, item: Item, action: &mut BatchAction) -> ItemStatus {
        let source = item.get_path().to_path_buf();
        let source = source.as_path();

        let result = match action {
            BatchAction::Delete => self
                .locks
                .with_locked(&[source], || item.remove())
                .map(|_| None),
            BatchAction::Trash => self
                .locks
                .with_locked(&[source], || item.trash())
                .map(|_| None),
            BatchAction::Copy {
                destination,
                on_duplicate,
            } => self
                .locks
                .with_locked(&[source, destination.as_path()], || {
                    copy_with_policy(&item, destination, *on_duplicate)
                })
                .map(|copied| Some(copied.get_path().to_path_buf())),
            BatchAction::Move {
                destination,
                on_duplicate,
            } => {
                let mut item = item;
                self.locks
                    .with_locked(&[source, destination.as_path()], || {
                        move_with_policy(&mut item, destination, *on_duplicate)
                    })
                    .map(|_| Some(item.get_path().to_path_buf()))
            }
            BatchAction::Rename(prompt) => match prompt(&item) {
                None => {
                    debug!("Rename cancelled for {:?}", source);
                    return ItemStatus::Cancelled;
                }
                Some(new_name) => {
                    let mut item = item;
                    self.locks
                        .with_locked(&[source], || item.rename(&new_name))
                        .map(|_| Some(item.get_path().to_path_buf()))
                }
            },
        };

        match result {
            Ok(new_path) => ItemStatus::Done { new_path },
            Err(error) => ItemStatus::Failed { error },
        }
    }
}

fn refuse_if_taken(item: &Item, destination: &Path) -> FsResult<()> {
    if item.can_be_copied(destination) {
        Ok(())
    } else {
        Err(FsError::AlreadyExists {
            path: destination.join(item.get_name()),
        })
    }
}

/// Copy honoring the batch-level duplicate policy
pub fn copy_with_policy(item: &Item, destination: &Path, policy: DuplicatePolicy) -> FsResult<Item> {
    match policy {
        DuplicatePolicy::Refuse => {
            refuse_if_taken(item, destination)?;
            item.copy(destination, false)
        }
        DuplicatePolicy::Rename => item.copy(destination, true),
        DuplicatePolicy::Overwrite => item.copy(destination, false),
    }
}

/// Move honoring the batch-level duplicate policy
pub fn move_with_policy(item: &mut Item, destination: &Path, policy: DuplicatePolicy) -> FsResult<()> {
    match policy {
        DuplicatePolicy::Refuse => {
            refuse_if_taken(item, destination)?;
            item.move_to(destination, false)
        }
        DuplicatePolicy::Rename => item.move_to(destination, true),
        DuplicatePolicy::Overwrite => item.move_to(destination, false),
    }
}
