//! The change-list schema.
//!
//! A mod ships a `changes.toml` (or `changes.json`) in its staging directory.
//! Each top-level array lists the operations of one category; the order of the
//! arrays in the file is irrelevant because the queue builder imposes the
//! category order.
//!
//! ```toml
//! [settings]
//! name = "Bastila Sound Fix"
//! override_policy = "rename"
//!
//! [[install]]
//! source = "n_bastila.tga"
//!
//! [[tlk]]
//! source = "dialog.tlk"
//! edits = [{ action = "append", text = "Hello there", token = "StrRef0" }]
//!
//! [[ssf]]
//! source = "n_bastila.ssf"
//! edits = [{ event = "battle_cry1", strref = "StrRef0" }]
//! ```

use crate::error::{Error, Result};
use crate::game::Game;
use crate::mods::gff::FieldEdit;
use crate::mods::hack::HackEdit;
use crate::mods::ssf::SsfEdit;
use crate::mods::tlk::TlkEdit;
use crate::overrides::OverridePolicy;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Filenames probed, in order, when looking for a change-list in a staging directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["changes.toml", "changes.json"];

/// Mod-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSettings {
    /// Display name of the mod, used in log output.
    pub name: Option<String>,
    /// Files (relative to the override directory) that must already be installed.
    pub required_files: Vec<String>,
    /// Message shown when a required file is missing.
    pub required_message: Option<String>,
    /// Game the mod was written for. A mismatch with the detected game is only a warning.
    pub game: Option<Game>,
    pub override_policy: OverridePolicy,
    /// Keep the processed script sources after the run.
    pub save_processed_scripts: bool,
}

/// Where an operation reads its source and where it writes the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTarget {
    /// Source filename in the staging directory, e.g. `n_bastila.utc`.
    pub source: String,
    /// Subdirectory of the staging directory holding `source`.
    #[serde(default)]
    pub source_folder: Option<String>,
    /// Directory or capsule, relative to the game directory.
    #[serde(default)]
    pub destination: Option<String>,
    /// Filename to write; defaults to `source`.
    #[serde(default)]
    pub save_as: Option<String>,
    /// Start from the mod's copy even if the game already has this resource.
    #[serde(default)]
    pub replace: bool,
    /// Leave an existing target untouched (install entries default to `true`).
    #[serde(default)]
    pub skip_if_exists: Option<bool>,
}

impl PatchTarget {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_folder: None,
            destination: None,
            save_as: None,
            replace: false,
            skip_if_exists: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_save_as(mut self, save_as: impl Into<String>) -> Self {
        self.save_as = Some(save_as.into());
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringTableEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
    #[serde(default)]
    pub edits: Vec<TlkEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
    #[serde(default)]
    pub edits: Vec<FieldEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
    #[serde(default)]
    pub edits: Vec<HackEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSetEntry {
    #[serde(flatten)]
    pub target: PatchTarget,
    #[serde(default)]
    pub edits: Vec<SsfEdit>,
}

/// A parsed change-list. Read-only once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub settings: PatchSettings,
    pub install: Vec<InstallEntry>,
    #[serde(rename = "tlk")]
    pub string_table: Vec<StringTableEntry>,
    #[serde(rename = "gff")]
    pub records: Vec<RecordEntry>,
    #[serde(rename = "hack")]
    pub hacks: Vec<HackEntry>,
    pub compile: Vec<CompileEntry>,
    #[serde(rename = "ssf")]
    pub sound_sets: Vec<SoundSetEntry>,
}

impl PatchConfig {
    /// Load a change-list, choosing the parser by file extension.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.as_std_path().is_file() {
            return Err(Error::ConfigMissing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        let extension = path.extension().map(|e| e.to_ascii_lowercase());
        let config = match extension.as_deref() {
            Some("toml") => toml::from_str(&contents)?,
            Some("json") => serde_json::from_str(&contents)?,
            _ => return Err(Error::UnsupportedConfigFormat(path.to_path_buf())),
        };

        tracing::debug!("Loaded patch configuration from {}", path);
        Ok(config)
    }

    /// Locate the change-list inside a staging directory.
    pub fn find(staging_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| staging_dir.join(name))
            .find(|path| path.as_std_path().is_file())
    }

    /// Total number of declared operations across all categories.
    pub fn operation_count(&self) -> usize {
        self.install.len()
            + self.string_table.len()
            + self.records.len()
            + self.hacks.len()
            + self.compile.len()
            + self.sound_sets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StrRefValue;
    use crate::mods::tlk::TlkEdit;
    use ktk_formats::SoundEvent;

    const TOML_CONFIG: &str = r#"
[settings]
name = "Test Mod"
required_files = ["k_base.ncs"]
override_policy = "rename"
game = "k1"

[[ssf]]
source = "n_bastila.ssf"
edits = [{ event = "battle_cry1", strref = "StrRef0" }, { event = "dead", strref = 12 }]

[[install]]
source = "portrait.tga"
destination = "Override"

[[tlk]]
source = "dialog.tlk"
edits = [
    { action = "append", text = "Hello", token = "StrRef0" },
    { action = "replace", strref = 5, sound = "" },
]
"#;

    #[test]
    fn test_parse_toml() {
        let config: PatchConfig = toml::from_str(TOML_CONFIG).unwrap();

        assert_eq!(config.settings.name.as_deref(), Some("Test Mod"));
        assert_eq!(config.settings.override_policy, OverridePolicy::Rename);
        assert_eq!(config.settings.game, Some(Game::K1));
        assert!(!config.settings.save_processed_scripts);
        assert_eq!(config.install[0].target.destination.as_deref(), Some("Override"));
        assert_eq!(config.operation_count(), 3);

        let edits = &config.sound_sets[0].edits;
        assert_eq!(edits[0].event, SoundEvent::BattleCry1);
        assert_eq!(edits[0].strref, StrRefValue::Token("StrRef0".to_string()));
        assert_eq!(edits[1].strref, StrRefValue::Literal(12));

        assert!(matches!(
            &config.string_table[0].edits[1],
            TlkEdit::Replace { strref: 5, text: None, sound: Some(s) } if s.is_empty()
        ));
    }

    #[test]
    fn test_parse_json_defaults() {
        let config: PatchConfig =
            serde_json::from_str(r#"{ "compile": [{ "source": "k_act_test.nss" }] }"#).unwrap();
        assert_eq!(config.compile.len(), 1);
        assert_eq!(config.settings.override_policy, OverridePolicy::Ignore);
        assert!(config.install.is_empty());
        assert!(!config.compile[0].target.replace);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        assert!(matches!(
            PatchConfig::load(&root.join("changes.toml")),
            Err(Error::ConfigMissing(_))
        ));

        std::fs::write(root.join("changes.json"), r#"{ "install": [{ "source": "a.2da" }] }"#)
            .unwrap();
        assert_eq!(PatchConfig::find(&root).unwrap(), root.join("changes.json"));
        let config = PatchConfig::load(&root.join("changes.json")).unwrap();
        assert_eq!(config.install[0].target.source, "a.2da");

        std::fs::write(root.join("changes.ini"), "[settings]").unwrap();
        assert!(matches!(
            PatchConfig::load(&root.join("changes.ini")),
            Err(Error::UnsupportedConfigFormat(_))
        ));
    }
}
