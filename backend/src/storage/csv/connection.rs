//! File-path management and crash-safe writes for the flat-file store.
//!
//! All tables live as CSV files directly under the base directory, with
//! timestamped backups in a `backups/` subdirectory. Every table rewrite
//! goes through `atomic_replace`: backup the live file, write the new
//! contents to a temporary sibling, fsync, then rename over the live
//! file. A crash at any point leaves either the old or the new table on
//! disk, never a half-written one.

use crate::error::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp suffix appended to backup file names. Millisecond
/// precision, so rapid consecutive saves never overwrite each other's
/// backup.
const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";

/// Manages the data directory layout shared by all repositories.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    max_backups: usize,
}

impl CsvConnection {
    /// Open (creating if necessary) a data directory and its `backups/`
    /// subdirectory.
    pub fn new<P: AsRef<Path>>(base_directory: P, max_backups: usize) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(&base_directory)?;
        fs::create_dir_all(base_directory.join("backups"))?;
        Ok(Self {
            base_directory,
            max_backups,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of a table's live CSV file, e.g. `orders` -> `<base>/orders.csv`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.base_directory.join(format!("{}.csv", table))
    }

    pub fn backups_directory(&self) -> PathBuf {
        self.base_directory.join("backups")
    }

    /// Create the table file with its header row if it does not exist yet.
    pub fn ensure_table_exists(&self, table: &str, header: &str) -> Result<()> {
        let path = self.table_path(table);
        if !path.exists() {
            fs::write(&path, format!("{}\n", header))?;
            info!("created {} table at {}", table, path.display());
        }
        Ok(())
    }

    /// Replace a table's contents on disk. The previous live file is
    /// backed up first, then the new bytes are written to a temporary
    /// file, synced, and renamed into place.
    pub fn atomic_replace(&self, table: &str, contents: &[u8]) -> Result<()> {
        let path = self.table_path(table);
        if path.exists() {
            self.create_backup(table, Utc::now())?;
        }

        let tmp_path = self.base_directory.join(format!("{}.csv.tmp", table));
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(contents)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Copy the live table file into `backups/` with a timestamp suffix.
    pub fn create_backup(&self, table: &str, now: DateTime<Utc>) -> Result<PathBuf> {
        let source = self.table_path(table);
        let backup_path = self
            .backups_directory()
            .join(format!("{}_{}.csv", table, now.format(BACKUP_STAMP_FORMAT)));
        fs::copy(&source, &backup_path)?;
        Ok(backup_path)
    }

    /// All backups of a table, newest first. The timestamp is embedded in
    /// the file name, so lexicographic order is chronological order.
    pub fn backups_for(&self, table: &str) -> Result<Vec<PathBuf>> {
        let prefix = format!("{}_", table);
        let mut backups = Vec::new();
        let backups_dir = self.backups_directory();
        if !backups_dir.exists() {
            return Ok(backups);
        }
        for entry in fs::read_dir(&backups_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(&prefix) && name.ends_with(".csv") {
                backups.push(path);
            }
        }
        backups.sort();
        backups.reverse();
        Ok(backups)
    }

    /// Delete aged backups of a table beyond the retention count.
    /// Returns how many files were removed.
    pub fn prune_backups(&self, table: &str) -> Result<usize> {
        let backups = self.backups_for(table)?;
        let mut removed = 0;
        for path in backups.iter().skip(self.max_backups) {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("could not remove aged backup {}: {}", path.display(), e),
            }
        }
        if removed > 0 {
            info!("pruned {} aged {} backup(s)", removed, table);
        }
        Ok(removed)
    }
}
