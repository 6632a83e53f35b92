//! # Backups
//!
//! Before a collection file is overwritten, its current contents are copied
//! to `<backup_dir>/<name>_<YYYYmmdd_HHMMSS_ffffff>.json`. Only the newest
//! `max` copies per collection are kept.
//!
//! A failed backup or prune is logged and never blocks the write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use crate::config::StoreConfig;

/// Backup settings for a file-backed store.
#[derive(Debug, Clone)]
pub struct BackupPolicy {
    pub dir: PathBuf,
    pub enabled: bool,
    /// Copies kept per collection. Zero keeps none.
    pub max: usize,
}

impl BackupPolicy {
    pub fn from_config(config: &StoreConfig) -> Self {
        BackupPolicy {
            dir: config.backup_dir(),
            enabled: config.backups_enabled && config.max_backups > 0,
            max: config.max_backups,
        }
    }

    /// A policy that never copies anything.
    pub fn disabled() -> Self {
        BackupPolicy {
            dir: PathBuf::new(),
            enabled: false,
            max: 0,
        }
    }

    /// Copies `source` (the file about to be overwritten) and prunes old
    /// copies of the same collection.
    pub fn backup(&self, source: &Path, collection: &str) {
        if !self.enabled || !source.exists() {
            return;
        }

        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create backup directory");
            return;
        }

        let target = self.next_backup_path(collection);
        match fs::copy(source, &target) {
            Ok(_) => debug!(backup = %target.display(), "Backup written"),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Backup failed");
                return;
            }
        }

        self.prune(collection);
    }

    /// Backup files of a collection, oldest first.
    pub fn list(&self, collection: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| is_backup_of(name, collection))
            })
            .collect();
        files.sort();
        files
    }

    fn next_backup_path(&self, collection: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f").to_string();
        let mut path = self.dir.join(format!("{}_{}.json", collection, stamp));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}_{}_{}.json", collection, stamp, n));
            n += 1;
        }
        path
    }

    fn prune(&self, collection: &str) {
        let files = self.list(collection);
        if files.len() <= self.max {
            return;
        }

        let excess = files.len() - self.max;
        for old in files.into_iter().take(excess) {
            match fs::remove_file(&old) {
                Ok(()) => debug!(backup = %old.display(), "Old backup pruned"),
                Err(e) => warn!(backup = %old.display(), error = %e, "Cannot prune backup"),
            }
        }
    }
}

/// `tickets_20240105_093000_123456.json` is a backup of `tickets`.
fn is_backup_of(file_name: &str, collection: &str) -> bool {
    file_name
        .strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|stamp| {
            !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit() || c == '_')
        })
}
