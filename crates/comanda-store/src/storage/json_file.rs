//! # JSON File Storage
//!
//! One pretty-printed JSON array per collection under the data directory.
//!
//! ## Write Path
//! ```text
//! store("tickets", text)
//!      │
//!      ▼
//! backup tickets.json ──► backups/tickets_<stamp>.json   (logged on failure)
//!      │
//!      ▼
//! write .tickets.json.<uuid>.tmp
//!      │
//!      ▼
//! rename over tickets.json   ← a reader sees the old or the new file, never half
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{BackupPolicy, Storage};
use crate::config::{collection_path, StoreConfig};
use crate::error::{StoreError, StoreResult};

/// File-backed storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
    backups: BackupPolicy,
}

impl JsonFileStorage {
    /// Opens the data directory, creating it if needed.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir).map_err(|e| StoreError::io(&config.data_dir, e))?;
        debug!(dir = %config.data_dir.display(), "Data directory ready");

        Ok(JsonFileStorage {
            dir: config.data_dir.clone(),
            backups: BackupPolicy::from_config(config),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn backups(&self) -> &BackupPolicy {
        &self.backups
    }

    fn path(&self, collection: &str) -> PathBuf {
        collection_path(&self.dir, collection)
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, collection: &str) -> StoreResult<Option<String>> {
        let path = self.path(collection);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn store(&self, collection: &str, contents: &str) -> StoreResult<()> {
        let path = self.path(collection);
        self.backups.backup(&path, collection);

        let temp = self
            .dir
            .join(format!(".{}.json.{}.tmp", collection, Uuid::new_v4().simple()));

        fs::write(&temp, contents).map_err(|e| StoreError::io(&temp, e))?;

        if let Err(e) = fs::rename(&temp, &path) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                warn!(temp = %temp.display(), error = %cleanup, "Cannot remove temporary file");
            }
            return Err(StoreError::io(path, e));
        }

        debug!(file = %path.display(), bytes = contents.len(), "Collection written");
        Ok(())
    }
}
