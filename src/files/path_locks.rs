//! Per-path serialization for item operations
//!
//! Batches may run on worker threads at the same time. Every item operation
//! holds the locks of the paths it touches, so two operations never work on
//! the same source or destination concurrently. Locks are taken in sorted
//! order to rule out deadlock between batches that share paths.

use dashmap::DashMap;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct PathLocks {
    /// One mutex per path currently in use
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    fn lock_for(&self, key: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the locks of all `paths`
    pub fn with_locked<T>(&self, paths: &[&Path], f: impl FnOnce() -> T) -> T {
        let mut keys: Vec<PathBuf> = paths.iter().map(|p| Self::key(p)).collect();
        keys.sort();
        keys.dedup();

        let mutexes: Vec<Arc<Mutex<()>>> = keys.iter().map(|k| self.lock_for(k)).collect();
        let guards: Vec<MutexGuard<'_, ()>> = mutexes
            .iter()
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
            .collect();
        debug!("Holding path locks: {:?}", keys);

        let result = f();

        drop(guards);
        drop(mutexes);
        for key in &keys {
            // Drop the entry once no other operation holds or waits on it
            self.locks
                .remove_if(key, |_, m| Arc::strong_count(m) == 1);
        }
        result
    }

    /// Paths with a live lock entry
    pub fn active_count(&self) -> usize {
        self.locks.len()
    }
}
