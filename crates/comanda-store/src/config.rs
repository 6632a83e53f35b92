//! # Store Configuration
//!
//! Where the collections live and how writes are protected.
//!
//! ## Layout on Disk
//! ```text
//! <data_dir>/
//! ├── products.json
//! ├── materias_primas.json
//! ├── recetas.json
//! ├── compras.json
//! ├── tickets.json
//! ├── tickets.csv            ← spreadsheet mirror (optional)
//! ├── gastos_adicionales.json
//! ├── proveedores.json
//! ├── planes_venta.json
//! └── backups/
//!     └── tickets_20240105_093000_123456.json
//! ```

use std::path::{Path, PathBuf};

/// Default number of backup copies kept per collection.
pub const DEFAULT_MAX_BACKUPS: usize = 20;

/// Store configuration.
///
/// ## Example
/// ```rust
/// use comanda_store::StoreConfig;
///
/// let config = StoreConfig::new("./data")
///     .max_backups(5)
///     .spreadsheet_mirror(false);
///
/// assert_eq!(config.backup_dir(), std::path::Path::new("./data/backups"));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the JSON collections.
    pub data_dir: PathBuf,

    /// Directory for backup copies.
    /// Default: `<data_dir>/backups`
    pub backup_dir: Option<PathBuf>,

    /// Whether to copy a collection before overwriting it.
    /// Default: true
    pub backups_enabled: bool,

    /// Copies kept per collection; older ones are pruned.
    /// Default: 20
    pub max_backups: usize,

    /// Whether to rewrite `tickets.csv` after each ticket change.
    /// Default: true
    pub spreadsheet_mirror: bool,
}

impl StoreConfig {
    /// Creates a configuration rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            backup_dir: None,
            backups_enabled: true,
            max_backups: DEFAULT_MAX_BACKUPS,
            spreadsheet_mirror: true,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// ## Environment Variables
    /// - `COMANDA_DATA_DIR`: data directory (default `./data`)
    /// - `COMANDA_BACKUPS`: `0`, `false` or `off` disables backups
    /// - `COMANDA_MAX_BACKUPS`: copies kept per collection
    /// - `COMANDA_TICKET_MIRROR`: `0`, `false` or `off` disables tickets.csv
    pub fn from_env() -> Self {
        let data_dir = std::env::var("COMANDA_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let mut config = StoreConfig::new(data_dir);

        if let Some(enabled) = std::env::var("COMANDA_BACKUPS").ok().and_then(|v| parse_flag(&v)) {
            config.backups_enabled = enabled;
        }

        if let Ok(max) = std::env::var("COMANDA_MAX_BACKUPS") {
            if let Ok(max) = max.trim().parse::<usize>() {
                config.max_backups = max;
            }
        }

        if let Some(mirror) = std::env::var("COMANDA_TICKET_MIRROR")
            .ok()
            .and_then(|v| parse_flag(&v))
        {
            config.spreadsheet_mirror = mirror;
        }

        config
    }

    /// Sets the backup directory.
    pub fn backup_dir_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Enables or disables backups.
    pub fn backups(mut self, enabled: bool) -> Self {
        self.backups_enabled = enabled;
        self
    }

    /// Sets how many backup copies are kept per collection.
    pub fn max_backups(mut self, max: usize) -> Self {
        self.max_backups = max;
        self
    }

    /// Enables or disables the tickets.csv mirror.
    pub fn spreadsheet_mirror(mut self, enabled: bool) -> Self {
        self.spreadsheet_mirror = enabled;
        self
    }

    /// Effective backup directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("backups"))
    }

    /// Path of the ticket spreadsheet mirror.
    pub fn mirror_path(&self) -> PathBuf {
        self.data_dir.join("tickets.csv")
    }

    /// Path of a collection file.
    pub fn collection_path(&self, stem: &str) -> PathBuf {
        collection_path(&self.data_dir, stem)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new("./data")
    }
}

pub(crate) fn collection_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.json", stem))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
