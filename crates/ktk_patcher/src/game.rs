//! Installation target classification.
//!
//! The engine supports two game profiles. Classification counts well-known
//! marker files and directories at the top of the game directory; the profile
//! with strictly more markers wins. A tie (including zero markers for both) is
//! inconclusive and aborts the run before anything is modified.

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Supported game profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    /// Knights of the Old Republic.
    K1,
    /// Knights of the Old Republic II: The Sith Lords.
    K2,
}

impl Game {
    /// Numeric id passed to script compilers (`1` or `2`).
    pub fn number(&self) -> u8 {
        match self {
            Game::K1 => 1,
            Game::K2 => 2,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::K1 => f.write_str("KotOR"),
            Game::K2 => f.write_str("TSL"),
        }
    }
}

/// Top-level entries (lowercase) that only a KotOR install has.
const K1_MARKERS: &[&str] = &["swkotor.exe", "swkotor.ini", "streamwaves", "swkotor.app"];

/// Top-level entries (lowercase) that only a TSL install has.
const K2_MARKERS: &[&str] = &[
    "swkotor2.exe",
    "swkotor2.ini",
    "streamvoice",
    "kotor2.app",
];

/// Classify `game_dir` as exactly one supported profile.
pub fn classify(game_dir: &Utf8Path) -> Result<Game> {
    let mut entries = HashSet::new();
    if game_dir.as_std_path().is_dir() {
        for entry in std::fs::read_dir(game_dir.as_std_path())? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.insert(name.to_ascii_lowercase());
            }
        }
    }

    let count = |markers: &[&str]| markers.iter().filter(|m| entries.contains(**m)).count();
    let k1_markers = count(K1_MARKERS);
    let k2_markers = count(K2_MARKERS);

    tracing::debug!(
        "Game classification for {}: KotOR markers={} TSL markers={}",
        game_dir,
        k1_markers,
        k2_markers
    );

    match k1_markers.cmp(&k2_markers) {
        std::cmp::Ordering::Greater => Ok(Game::K1),
        std::cmp::Ordering::Less => Ok(Game::K2),
        std::cmp::Ordering::Equal => Err(Error::AmbiguousTarget {
            game_dir: game_dir.to_path_buf(),
            k1_markers,
            k2_markers,
        }),
    }
}
