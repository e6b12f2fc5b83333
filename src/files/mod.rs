//! File system item model and operations
//!
//! This module handles:
//! - Item handles (files and folders) with size, time and content queries
//! - Single-item operations (rename, copy, move, remove, trash)
//! - Action filters that gate batch operations through a shell command
//! - Batch execution over a selection with per-item reporting
//! - Per-path locking for concurrent batches

pub mod action_filter;
pub mod batch;
pub mod item;
pub mod operations;
pub mod path_locks;

pub use action_filter::{ActionFilter, FilterOperator};
pub use batch::{
    BatchAction, BatchReport, BatchRunner, DuplicatePolicy, ItemOutcome, ItemStatus, RenamePrompt,
};
pub use item::{File, Folder, Item};
pub use path_locks::PathLocks;
