//! Per-run backup ledger.
//!
//! Every run gets its own directory under the backup root, named after the run's
//! start time (`%Y-%m-%d_%H.%M.%S`, with `_2`, `_3`... appended if that name is
//! taken). Before the first write to a path, the ledger either copies the
//! existing file into that directory, mirroring its location relative to the
//! game directory, or, if the path does not exist yet, appends it to the removal
//! manifest so an uninstall knows to delete it.

use crate::error::{Error, Result};
use crate::utils::absolute;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

/// Name of the removal manifest inside a run's backup directory.
pub const REMOVAL_MANIFEST: &str = "remove these files.txt";

/// Timestamp format of backup directory names.
pub const BACKUP_DIR_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";

/// A file copied aside before it was first modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Absolute path of the file that was backed up.
    pub original: Utf8PathBuf,
    /// Where the copy lives.
    pub backup: Utf8PathBuf,
    pub created_at: DateTime<Local>,
}

#[derive(Debug)]
pub struct BackupLedger {
    game_root: Utf8PathBuf,
    backup_dir: Utf8PathBuf,
    seen: HashSet<String>,
    records: Vec<BackupRecord>,
}

impl BackupLedger {
    /// Create this run's backup directory under `backup_root`.
    pub fn create(game_root: &Utf8Path, backup_root: &Utf8Path, started: DateTime<Local>) -> Result<Self> {
        let base = started.format(BACKUP_DIR_FORMAT).to_string();
        let mut backup_dir = backup_root.join(&base);
        let mut suffix = 2;
        while backup_dir.as_std_path().exists() {
            backup_dir = backup_root.join(format!("{}_{}", base, suffix));
            suffix += 1;
        }
        std::fs::create_dir_all(backup_dir.as_std_path())?;
        tracing::info!("Backups for this run go to {}", backup_dir);

        Ok(Self {
            game_root: absolute(game_root)?,
            backup_dir,
            seen: HashSet::new(),
            records: Vec::new(),
        })
    }

    pub fn backup_dir(&self) -> &Utf8Path {
        &self.backup_dir
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.backup_dir.join(REMOVAL_MANIFEST)
    }

    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    /// Back up `path` on its first encounter this run.
    ///
    /// Returns the new record if a copy was made. Later calls for the same path
    /// (compared case-insensitively) do nothing.
    pub fn backup_if_needed(&mut self, path: &Utf8Path) -> Result<Option<BackupRecord>> {
        let original = absolute(path)?;
        if !self.seen.insert(original.as_str().to_lowercase()) {
            return Ok(None);
        }

        if !original.as_std_path().exists() {
            self.append_to_manifest(&original)?;
            return Ok(None);
        }

        let relative = original
            .strip_prefix(&self.game_root)
            .map(Utf8Path::to_path_buf)
            .or_else(|_| {
                original
                    .file_name()
                    .map(Utf8PathBuf::from)
                    .ok_or_else(|| Error::InvalidTarget(original.to_string()))
            })?;
        let backup = self.backup_dir.join(&relative);
        if let Some(parent) = backup.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::copy(original.as_std_path(), backup.as_std_path())?;
        tracing::info!("Backing up '{}'", relative);

        let record = BackupRecord {
            original,
            backup,
            created_at: Local::now(),
        };
        self.records.push(record.clone());
        Ok(Some(record))
    }

    fn append_to_manifest(&self, path: &Utf8Path) -> Result<()> {
        tracing::debug!("'{}' is new; adding it to the removal manifest", path);
        let mut manifest = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.manifest_path().as_std_path())?;
        writeln!(manifest, "{}", path)?;
        Ok(())
    }
}
