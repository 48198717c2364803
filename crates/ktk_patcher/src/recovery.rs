//! Restoring a game directory from a run's backup.

use crate::backup::REMOVAL_MANIFEST;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// What [`restore_latest`] did.
#[derive(Debug, Clone, Default)]
pub struct RestoreSummary {
    pub backup_dir: Utf8PathBuf,
    /// Files created by the run that were deleted.
    pub removed: Vec<Utf8PathBuf>,
    /// Files copied back from the backup.
    pub restored: Vec<Utf8PathBuf>,
}

/// Sort key for `2024-03-09_14.05.07` and `2024-03-09_14.05.07_2` style names.
fn backup_sort_key(name: &str) -> (String, u32) {
    match name.get(19..).and_then(|rest| rest.strip_prefix('_')) {
        Some(suffix) => (name[..19].to_string(), suffix.parse().unwrap_or(0)),
        None => (name.to_string(), 1),
    }
}

/// Backup directories under `backup_root`, newest first.
pub fn list_backups(backup_root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !backup_root.as_std_path().is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(backup_root.as_std_path())? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    names.sort_by_key(|name| std::cmp::Reverse(backup_sort_key(name)));
    Ok(names.into_iter().map(|name| backup_root.join(name)).collect())
}

/// Undo the most recent run recorded under `backup_root`.
///
/// Deletes every path listed in the run's removal manifest, then copies each
/// backed-up file back to the same path relative to `game_root`.
pub fn restore_latest(backup_root: &Utf8Path, game_root: &Utf8Path) -> Result<RestoreSummary> {
    let backup_dir = list_backups(backup_root)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Other(format!("No backups found in {}", backup_root)))?;
    restore_from(&backup_dir, game_root)
}

/// Undo the run whose backup lives in `backup_dir`.
pub fn restore_from(backup_dir: &Utf8Path, game_root: &Utf8Path) -> Result<RestoreSummary> {
    tracing::info!("Restoring from {}", backup_dir);
    let mut summary = RestoreSummary {
        backup_dir: backup_dir.to_path_buf(),
        ..RestoreSummary::default()
    };

    let manifest = backup_dir.join(REMOVAL_MANIFEST);
    if manifest.as_std_path().is_file() {
        let contents = std::fs::read_to_string(manifest.as_std_path())?;
        for line in contents.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let path = Utf8PathBuf::from(line);
            if path.as_std_path().is_file() {
                std::fs::remove_file(path.as_std_path())?;
                tracing::info!("Removed '{}'", path);
                summary.removed.push(path);
            }
        }
    }

    for entry in WalkDir::new(backup_dir.as_std_path()) {
        let entry = entry.map_err(|e| Error::Other(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(entry.path())
            .ok_or_else(|| Error::InvalidTarget(entry.path().to_string_lossy().into_owned()))?;
        let relative = path
            .strip_prefix(backup_dir)
            .map_err(|_| Error::InvalidTarget(path.to_string()))?;
        if relative.as_str() == REMOVAL_MANIFEST {
            continue;
        }

        let destination = game_root.join(relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::copy(path.as_std_path(), destination.as_std_path())?;
        tracing::info!("Restored '{}'", relative);
        summary.restored.push(destination);
    }

    Ok(summary)
}
