//! Modification variants.
//!
//! Every queued operation is a [`Modification`]: a [`PatchTarget`] saying where
//! bytes come from and go to, plus a [`ModificationKind`] carrying the edit
//! instructions. All kinds share one [`apply`](Modification::apply) contract:
//! source bytes in, replacement bytes (or nothing to write) out.

pub mod gff;
pub mod hack;
pub mod nss;
pub mod ssf;
pub mod tlk;

use crate::codecs::Codecs;
use crate::config::{
    CompileEntry, HackEntry, InstallEntry, PatchTarget, RecordEntry, SoundSetEntry, StringTableEntry,
};
use crate::error::Result;
use crate::game::Game;
use crate::memory::PatcherMemory;
use crate::queue::Category;
use camino::Utf8Path;
use gff::FieldEdit;
use hack::HackEdit;
use ssf::SsfEdit;
use tlk::TlkEdit;

/// Where a modification's own source file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRoot {
    /// The mod's staging directory.
    Staging,
    /// The scratch directory holding processed script sources.
    Scratch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModificationKind {
    Install,
    StringTable(Vec<TlkEdit>),
    StructuredRecord(Vec<FieldEdit>),
    ScriptHack(Vec<HackEdit>),
    Compile,
    SoundSet(Vec<SsfEdit>),
}

/// Mutable state and collaborators shared by every operation of a run.
pub struct PatchContext<'a> {
    pub memory: &'a mut PatcherMemory,
    pub codecs: &'a Codecs,
    pub game: Game,
    pub scratch_dir: &'a Utf8Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    pub target: PatchTarget,
    pub kind: ModificationKind,
    pub source_root: SourceRoot,
}

impl Modification {
    pub fn new(target: PatchTarget, kind: ModificationKind) -> Self {
        let source_root = match kind {
            ModificationKind::Compile => SourceRoot::Scratch,
            _ => SourceRoot::Staging,
        };
        Self {
            target,
            kind,
            source_root,
        }
    }

    pub fn with_source_root(mut self, source_root: SourceRoot) -> Self {
        self.source_root = source_root;
        self
    }

    pub fn category(&self) -> Category {
        match self.kind {
            ModificationKind::Install => Category::Install,
            ModificationKind::StringTable(_) => Category::StringTable,
            ModificationKind::StructuredRecord(_) => Category::StructuredRecord,
            ModificationKind::ScriptHack(_) => Category::ScriptHack,
            ModificationKind::Compile => Category::Compile,
            ModificationKind::SoundSet(_) => Category::SoundSet,
        }
    }

    pub fn source(&self) -> &str {
        &self.target.source
    }

    /// Filename written at the destination.
    ///
    /// Compiled scripts default to the source stem with an `.ncs` extension.
    pub fn save_as(&self) -> String {
        if let Some(save_as) = &self.target.save_as {
            return save_as.clone();
        }
        match self.kind {
            ModificationKind::Compile => {
                let stem = self
                    .target
                    .source
                    .rsplit_once('.')
                    .map_or(self.target.source.as_str(), |(stem, _)| stem);
                format!("{}.ncs", stem)
            }
            _ => self.target.source.clone(),
        }
    }

    /// Destination directory or capsule, relative to the game directory.
    ///
    /// The string table lives in the game root; everything else defaults to `Override`.
    pub fn destination(&self) -> &str {
        match (&self.target.destination, &self.kind) {
            (Some(destination), _) => destination.as_str(),
            (None, ModificationKind::StringTable(_)) => ".",
            (None, _) => "Override",
        }
    }

    /// Whether an existing target should be left untouched.
    pub fn skip_if_exists(&self) -> bool {
        let default = matches!(self.kind, ModificationKind::Install);
        self.target.skip_if_exists.unwrap_or(default)
    }

    pub fn describe(&self) -> String {
        let destination = match self.destination() {
            "." => "the game folder".to_string(),
            other => format!("'{}'", other),
        };
        let save_as = self.save_as();
        match &self.kind {
            ModificationKind::Install => {
                format!("Copying '{}' to {} as '{}'", self.source(), destination, save_as)
            }
            ModificationKind::StringTable(edits) => format!(
                "Applying {} string table edit(s) to '{}' in {}",
                edits.len(),
                save_as,
                destination
            ),
            ModificationKind::StructuredRecord(edits) => format!(
                "Modifying {} field(s) of '{}' in {}",
                edits.len(),
                save_as,
                destination
            ),
            ModificationKind::ScriptHack(edits) => format!(
                "Hacking {} location(s) in '{}' in {}",
                edits.len(),
                save_as,
                destination
            ),
            ModificationKind::Compile => format!(
                "Compiling '{}' and saving to {} as '{}'",
                self.source(),
                destination,
                save_as
            ),
            ModificationKind::SoundSet(edits) => format!(
                "Setting {} sound(s) of '{}' in {}",
                edits.len(),
                save_as,
                destination
            ),
        }
    }

    /// Produce the bytes to write, or `None` if there is nothing to write.
    pub fn apply(&self, source: &[u8], ctx: &mut PatchContext<'_>) -> Result<Option<Vec<u8>>> {
        match &self.kind {
            ModificationKind::Install => Ok(Some(source.to_vec())),
            ModificationKind::StringTable(edits) => tlk::apply(source, edits, ctx).map(Some),
            ModificationKind::StructuredRecord(edits) => gff::apply(source, edits, ctx).map(Some),
            ModificationKind::ScriptHack(edits) => hack::apply(source, edits, ctx).map(Some),
            ModificationKind::Compile => nss::apply(self.source(), source, ctx),
            ModificationKind::SoundSet(edits) => ssf::apply(source, edits, ctx).map(Some),
        }
    }
}

impl From<&InstallEntry> for Modification {
    fn from(entry: &InstallEntry) -> Self {
        Modification::new(entry.target.clone(), ModificationKind::Install)
    }
}

impl From<&StringTableEntry> for Modification {
    fn from(entry: &StringTableEntry) -> Self {
        Modification::new(entry.target.clone(), ModificationKind::StringTable(entry.edits.clone()))
    }
}

impl From<&RecordEntry> for Modification {
    fn from(entry: &RecordEntry) -> Self {
        Modification::new(
            entry.target.clone(),
            ModificationKind::StructuredRecord(entry.edits.clone()),
        )
    }
}

impl From<&HackEntry> for Modification {
    fn from(entry: &HackEntry) -> Self {
        Modification::new(entry.target.clone(), ModificationKind::ScriptHack(entry.edits.clone()))
    }
}

impl From<&CompileEntry> for Modification {
    fn from(entry: &CompileEntry) -> Self {
        Modification::new(entry.target.clone(), ModificationKind::Compile)
    }
}

impl From<&SoundSetEntry> for Modification {
    fn from(entry: &SoundSetEntry) -> Self {
        Modification::new(entry.target.clone(), ModificationKind::SoundSet(entry.edits.clone()))
    }
}
