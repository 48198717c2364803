//! Declarative mod installation engine for KotOR and TSL.
//!
//! A mod ships a staging directory (`tslpatchdata/`) holding its source files
//! and a change-list (`changes.toml` or `changes.json`). The [`Patcher`] reads
//! the change-list, orders its operations by category, and applies each one to
//! the game directory: copying files, editing the talk table, structured
//! records, sound sets and compiled scripts, and compiling script sources. Every
//! file is backed up before its first modification so that [`recovery`] can
//! undo the run.
//!
//! # Example
//!
//! ```no_run
//! use ktk_patcher::{Patcher, RunContext, OverridePolicy};
//!
//! let context = RunContext::new("C:/Games/KotOR", "C:/Mods/BastilaFix")
//!     .with_override_policy(OverridePolicy::Rename);
//! let summary = Patcher::load(context)?.run()?;
//!
//! println!("{} of {} operations succeeded", summary.succeeded, summary.attempted);
//! for failure in &summary.failures {
//!     eprintln!("{}: {}", failure.operation, failure.message);
//! }
//! # Ok::<(), ktk_patcher::Error>(())
//! ```
//!
//! Structured records (GFF) and script compilation need host-supplied codecs;
//! see [`codecs`].

pub mod backup;
pub mod codecs;
pub mod config;
pub mod error;
pub mod game;
pub mod locator;
pub mod memory;
pub mod mods;
pub mod overrides;
pub mod patcher;
pub mod queue;
pub mod recovery;
pub mod summary;
pub mod utils;

pub use backup::{BackupLedger, BackupRecord, REMOVAL_MANIFEST};
pub use codecs::{CompileContext, ExternalCompiler, ScriptCompiler, StructuredRecordEditor};
pub use config::{PatchConfig, PatchSettings, PatchTarget};
pub use error::{Error, Result};
pub use game::Game;
pub use locator::ResourceLocation;
pub use memory::{PatcherMemory, StrRefValue};
pub use mods::{Modification, ModificationKind};
pub use overrides::OverridePolicy;
pub use patcher::{PatchProgress, PatchStage, Patcher, RunContext};
pub use queue::{Category, OperationQueue, CATEGORY_ORDER};
pub use recovery::{list_backups, restore_latest, RestoreSummary};
pub use summary::{FailureSeverity, OperationFailure, RunSummary};

#[cfg(test)]
mod tests;
