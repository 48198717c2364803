//! Conflicts between capsule writes and loose override files.
//!
//! The game loads a loose file in `Override/` in preference to a capsule entry
//! with the same name, so a resource patched into a module can be shadowed by a
//! stale override file. The policy decides what to do about it.

use crate::error::Result;
use crate::utils::find_case_insensitive;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to treat a loose override file that shadows a capsule destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePolicy {
    /// Do not look for conflicts at all.
    #[default]
    Ignore,
    /// Log a warning and leave the override file in place.
    Warn,
    /// Rename the override file to `old_<name>` and log a warning.
    Rename,
}

impl fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverridePolicy::Ignore => f.write_str("ignore"),
            OverridePolicy::Warn => f.write_str("warn"),
            OverridePolicy::Rename => f.write_str("rename"),
        }
    }
}

impl std::str::FromStr for OverridePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(OverridePolicy::Ignore),
            "warn" => Ok(OverridePolicy::Warn),
            "rename" => Ok(OverridePolicy::Rename),
            other => Err(format!("unknown override policy '{}'", other)),
        }
    }
}

/// What conflict resolution did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// No check was made, or no shadowing file exists.
    Clear,
    /// A shadowing file exists and was left alone.
    Warned { message: String },
    /// A shadowing file was moved out of the way.
    Renamed {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        message: String,
    },
}

impl OverrideOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            OverrideOutcome::Clear => None,
            OverrideOutcome::Warned { message } | OverrideOutcome::Renamed { message, .. } => {
                Some(message)
            }
        }
    }
}

/// Apply `policy` for a write of `filename` into `archive`.
pub fn resolve_conflict(
    policy: OverridePolicy,
    override_dir: &Utf8Path,
    filename: &str,
    archive: &Utf8Path,
) -> Result<OverrideOutcome> {
    if policy == OverridePolicy::Ignore {
        return Ok(OverrideOutcome::Clear);
    }

    let Some(shadowing) = find_case_insensitive(override_dir, filename) else {
        return Ok(OverrideOutcome::Clear);
    };
    if !shadowing.as_std_path().is_file() {
        return Ok(OverrideOutcome::Clear);
    }

    let archive_name = archive.file_name().unwrap_or(archive.as_str());
    match policy {
        OverridePolicy::Ignore => Ok(OverrideOutcome::Clear),
        OverridePolicy::Warn => {
            let message = format!(
                "A resource located at '{}' is shadowing this mod's changes in {}!",
                shadowing, archive_name
            );
            tracing::warn!("{}", message);
            Ok(OverrideOutcome::Warned { message })
        }
        OverridePolicy::Rename => {
            let renamed = free_old_name(&shadowing);
            std::fs::rename(shadowing.as_std_path(), renamed.as_std_path())?;
            let message = format!(
                "Renamed '{}' to '{}' to prevent it from shadowing this mod's changes in {}",
                shadowing,
                renamed.file_name().unwrap_or(renamed.as_str()),
                archive_name
            );
            tracing::warn!("{}", message);
            Ok(OverrideOutcome::Renamed {
                from: shadowing,
                to: renamed,
                message,
            })
        }
    }
}

/// `old_<name>`, or `old_<stem> (N).<ext>` with the first free `N`.
fn free_old_name(path: &Utf8Path) -> Utf8PathBuf {
    let parent = path.parent().unwrap_or(Utf8Path::new(""));
    let name = path.file_name().unwrap_or_default();
    let first = parent.join(format!("old_{}", name));
    if !first.as_std_path().exists() {
        return first;
    }

    let stem = path.file_stem().unwrap_or(name);
    let suffix = path.extension().map(|e| format!(".{}", e)).unwrap_or_default();
    (1u32..)
        .map(|i| parent.join(format!("old_{} ({}){}", stem, i, suffix)))
        .find(|candidate| !candidate.as_std_path().exists())
        .unwrap_or(first)
}
