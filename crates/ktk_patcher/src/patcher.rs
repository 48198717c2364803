//! The patch orchestrator.
//!
//! # Run Algorithm
//!
//! 1. **Pre-flight.** The change-list and staging directory must exist, every
//!    required file must be installed, and the game directory must classify as
//!    exactly one supported game. Any failure here is returned as `Err` before
//!    anything on disk changes.
//! 2. **Script preparation.** If the change-list compiles scripts, every `.nss`
//!    file in the staging tree is copied flat into the scratch directory. A
//!    bundled `nwscript.nss` is queued for installation into `Override` at the
//!    end of the install block.
//! 3. **Main loop.** Each queued [`Modification`] runs inside its own fault
//!    boundary; its `Result` is folded into the [`RunSummary`]:
//!    - resolve the target, requiring a capsule destination to exist, and hand
//!      its path to the [`BackupLedger`];
//!    - log what is about to happen;
//!    - find the source bytes (the mod's copy when `replace` is set or nothing is
//!      installed, the installed copy otherwise);
//!    - apply the variant; "nothing to write" ends the item;
//!    - for capsule destinations, apply the [`OverridePolicy`];
//!    - write.
//!
//!    The cancel flag is checked between items, never during one.
//! 4. **Cleanup.** The scratch directory is removed unless processed scripts
//!    are kept, and `installlog.txt` is written to the mod directory.

use crate::backup::BackupLedger;
use crate::codecs::{Codecs, ScriptCompiler, StructuredRecordEditor};
use crate::config::{PatchConfig, PatchTarget};
use crate::error::{Error, Result};
use crate::game::{classify, Game};
use crate::locator::{require, ResourceLocation};
use crate::memory::PatcherMemory;
use crate::mods::{Modification, ModificationKind, PatchContext, SourceRoot};
use crate::overrides::{resolve_conflict, OverridePolicy};
use crate::queue::OperationQueue;
use crate::summary::{Outcome, RunSummary, INSTALL_LOG};
use crate::utils::{find_case_insensitive, resolve_relative, validate_file_name, validate_relative};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use ktk_capsule::{is_capsule_path, ResourceIdentifier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

/// Staging directory name inside a mod directory.
pub const STAGING_DIR: &str = "tslpatchdata";
/// Scratch directory name inside a mod directory.
pub const SCRATCH_DIR: &str = "temp_nss_working_dir";
/// Backup root name inside a mod directory.
pub const BACKUP_DIR: &str = "backup";
/// Loose override directory name inside the game directory.
pub const OVERRIDE_DIR: &str = "Override";

const SCRIPT_HEADER: &str = "nwscript.nss";

/// Paths and flags for one run.
///
/// `override_policy` and `save_processed_scripts` default to the values in the
/// change-list's settings when left as `None`.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub game_dir: Utf8PathBuf,
    pub mod_dir: Utf8PathBuf,
    pub staging_dir: Utf8PathBuf,
    pub config_path: Utf8PathBuf,
    pub backup_root: Utf8PathBuf,
    pub override_policy: Option<OverridePolicy>,
    pub save_processed_scripts: Option<bool>,
    pub cancel: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(game_dir: impl Into<Utf8PathBuf>, mod_dir: impl Into<Utf8PathBuf>) -> Self {
        let game_dir = game_dir.into();
        let mod_dir = mod_dir.into();
        let staging_dir = mod_dir.join(STAGING_DIR);
        let config_path =
            PatchConfig::find(&staging_dir).unwrap_or_else(|| staging_dir.join("changes.toml"));

        Self {
            backup_root: mod_dir.join(BACKUP_DIR),
            game_dir,
            mod_dir,
            staging_dir,
            config_path,
            override_policy: None,
            save_processed_scripts: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_override_policy(mut self, policy: OverridePolicy) -> Self {
        self.override_policy = Some(policy);
        self
    }

    pub fn with_save_processed_scripts(mut self, keep: bool) -> Self {
        self.save_processed_scripts = Some(keep);
        self
    }

    pub fn with_backup_root(mut self, backup_root: impl Into<Utf8PathBuf>) -> Self {
        self.backup_root = backup_root.into();
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn scratch_dir(&self) -> Utf8PathBuf {
        self.mod_dir.join(SCRATCH_DIR)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Progress information emitted while a run executes.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchProgress {
    pub stage: PatchStage,
    /// 1-based index of the current operation during `Applying`.
    pub current: u32,
    pub total: u32,
    /// Description of the current operation.
    pub description: Option<String>,
}

/// Emitted in order: `Validating` -> `PreparingScripts` (if any) -> `Applying`
/// (repeated) -> `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchStage {
    Validating,
    PreparingScripts,
    Applying,
    Complete,
}

type ProgressCallback = Arc<dyn Fn(PatchProgress) + Send + Sync>;

/// Runs a change-list against a game directory.
pub struct Patcher {
    context: RunContext,
    config: PatchConfig,
    codecs: Codecs,
    progress_callback: Option<ProgressCallback>,
}

impl Patcher {
    pub fn new(context: RunContext, config: PatchConfig) -> Self {
        Self {
            context,
            config,
            codecs: Codecs::default(),
            progress_callback: None,
        }
    }

    /// Load the change-list named by `context.config_path`.
    pub fn load(context: RunContext) -> Result<Self> {
        let config = PatchConfig::load(&context.config_path)?;
        Ok(Self::new(context, config))
    }

    pub fn with_record_editor<E>(mut self, editor: E) -> Self
    where
        E: StructuredRecordEditor + 'static,
    {
        self.codecs.record_editor = Some(Box::new(editor));
        self
    }

    pub fn with_compiler<C>(mut self, compiler: C) -> Self
    where
        C: ScriptCompiler + 'static,
    {
        self.codecs.compiler = Some(Box::new(compiler));
        self
    }

    /// Register a progress callback, called once per stage and once per operation.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(PatchProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// The operations a run would execute, in order, before script preparation.
    pub fn plan(&self) -> OperationQueue {
        OperationQueue::build(&self.config)
    }

    fn override_policy(&self) -> OverridePolicy {
        self.context
            .override_policy
            .unwrap_or(self.config.settings.override_policy)
    }

    fn save_processed_scripts(&self) -> bool {
        self.context
            .save_processed_scripts
            .unwrap_or(self.config.settings.save_processed_scripts)
    }

    /// Execute the run. Only pre-flight failures (and failures to set up the
    /// backup or scratch directories) are returned as `Err`; per-operation
    /// failures are reported in the summary.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Local::now();
        let mut summary = RunSummary::default();

        if let Some(name) = &self.config.settings.name {
            tracing::info!("Installing {}", name);
            summary.note(format!("Installing {}", name));
        }
        tracing::info!("Game dir: {}", self.context.game_dir);
        tracing::info!("Mod dir: {}", self.context.mod_dir);

        self.emit_progress(PatchStage::Validating, 0, 0, None);
        let game = self.preflight(&mut summary)?;

        let mut queue = self.plan();
        let scratch_dir = self.context.scratch_dir();
        let compiles = !self.config.compile.is_empty();
        if compiles {
            self.emit_progress(PatchStage::PreparingScripts, 0, 0, None);
            self.prepare_scripts(&scratch_dir, &mut queue)?;
        }

        let mut ledger = BackupLedger::create(&self.context.game_dir, &self.context.backup_root, started)?;
        let mut memory = PatcherMemory::default();
        let policy = self.override_policy();
        let total = queue.len() as u32;

        for (index, modification) in queue.iter().enumerate() {
            if self.context.is_cancelled() {
                tracing::warn!("Install cancelled after {} of {} operation(s)", index, total);
                summary.warn(format!("Install cancelled after {} of {} operation(s)", index, total));
                summary.cancelled = true;
                break;
            }

            let description = modification.describe();
            self.emit_progress(
                PatchStage::Applying,
                index as u32 + 1,
                total,
                Some(description.clone()),
            );

            let mut ctx = PatchContext {
                memory: &mut memory,
                codecs: &self.codecs,
                game,
                scratch_dir: &scratch_dir,
            };
            let result = self.apply_one(modification, &description, &mut ctx, &mut ledger, policy, &mut summary);
            summary.record(&description, result);
        }

        summary.backups = ledger.records().to_vec();

        if compiles && !self.save_processed_scripts() && scratch_dir.as_std_path().exists() {
            if let Err(e) = std::fs::remove_dir_all(scratch_dir.as_std_path()) {
                summary.warn(format!("Could not remove {}: {}", scratch_dir, e));
            }
        }

        tracing::info!(
            "Finished: {} of {} operation(s) succeeded, {} skipped, {} failed",
            summary.succeeded,
            summary.attempted,
            summary.skipped,
            summary.failed()
        );

        let log_path = self.context.mod_dir.join(INSTALL_LOG);
        if let Err(e) = summary.write_log(&log_path) {
            tracing::warn!("Could not write {}: {}", log_path, e);
        }

        self.emit_progress(PatchStage::Complete, total, total, None);
        Ok(summary)
    }

    fn preflight(&self, summary: &mut RunSummary) -> Result<Game> {
        if !self.context.config_path.as_std_path().is_file() {
            return Err(Error::ConfigMissing(self.context.config_path.clone()));
        }
        if !self.context.staging_dir.as_std_path().is_dir() {
            return Err(Error::StagingMissing(self.context.staging_dir.clone()));
        }

        let override_dir = resolve_relative(&self.context.game_dir, Utf8Path::new(OVERRIDE_DIR));
        for required in &self.config.settings.required_files {
            let path = resolve_relative(&override_dir, &validate_relative(required)?);
            if !path.as_std_path().is_file() {
                return Err(Error::RequiredFileMissing {
                    path,
                    message: self.config.settings.required_message.clone(),
                });
            }
        }

        let game = classify(&self.context.game_dir)?;
        tracing::info!("Detected {}", game);
        if let Some(expected) = self.config.settings.game {
            if expected != game {
                summary.warn(format!(
                    "This mod was written for {} but the game directory looks like {}",
                    expected, game
                ));
            }
        }
        Ok(game)
    }

    fn prepare_scripts(&self, scratch_dir: &Utf8Path, queue: &mut OperationQueue) -> Result<()> {
        if scratch_dir.as_std_path().exists() {
            std::fs::remove_dir_all(scratch_dir.as_std_path())?;
        }
        std::fs::create_dir_all(scratch_dir.as_std_path())?;

        let mut copied = 0;
        for entry in WalkDir::new(self.context.staging_dir.as_std_path()) {
            let entry = entry.map_err(|e| Error::Other(e.to_string()))?;
            let is_script = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("nss"));
            if !entry.file_type().is_file() || !is_script {
                continue;
            }
            std::fs::copy(entry.path(), scratch_dir.join(entry.file_name().to_string_lossy().as_ref()))?;
            copied += 1;
        }
        tracing::debug!("Copied {} script source(s) to {}", copied, scratch_dir);

        if let Some(header) = find_case_insensitive(scratch_dir, SCRIPT_HEADER) {
            let name = header.file_name().unwrap_or(SCRIPT_HEADER).to_string();
            tracing::info!("Queueing '{}' for installation into {}", name, OVERRIDE_DIR);
            queue.push_install(
                Modification::new(
                    PatchTarget::new(name)
                        .with_destination(OVERRIDE_DIR)
                        .with_replace(true),
                    ModificationKind::Install,
                )
                .with_source_root(SourceRoot::Scratch),
            );
        }
        Ok(())
    }

    fn resolve_target(&self, destination: &Utf8Path, save_as: &str) -> Result<ResourceLocation> {
        let resolved = resolve_relative(&self.context.game_dir, destination);
        if is_capsule_path(destination) {
            return Ok(ResourceLocation::ArchiveEntry {
                archive: resolved,
                identifier: ResourceIdentifier::from_filename(save_as)?,
            });
        }
        let file = find_case_insensitive(&resolved, save_as).unwrap_or_else(|| resolved.join(save_as));
        Ok(ResourceLocation::LooseFile(file))
    }

    fn source_roots(
        &self,
        modification: &Modification,
        target: &ResourceLocation,
        target_exists: bool,
        scratch_dir: &Utf8Path,
    ) -> Result<Vec<ResourceLocation>> {
        let source = modification.source();
        let dir = match modification.source_root {
            SourceRoot::Scratch => scratch_dir.to_path_buf(),
            SourceRoot::Staging => match &modification.target.source_folder {
                Some(folder) => resolve_relative(&self.context.staging_dir, &validate_relative(folder)?),
                None => self.context.staging_dir.clone(),
            },
        };
        let staged = ResourceLocation::LooseFile(
            find_case_insensitive(&dir, source).unwrap_or_else(|| dir.join(source)),
        );

        Ok(match modification.kind {
            ModificationKind::Install | ModificationKind::Compile => vec![staged],
            _ if modification.target.replace || !target_exists => vec![staged, target.clone()],
            _ => vec![target.clone()],
        })
    }

    fn apply_one(
        &self,
        modification: &Modification,
        description: &str,
        ctx: &mut PatchContext<'_>,
        ledger: &mut BackupLedger,
        policy: OverridePolicy,
        summary: &mut RunSummary,
    ) -> Result<Outcome> {
        let destination = validate_relative(modification.destination())?;
        validate_file_name(modification.source())?;
        let save_as = validate_file_name(&modification.save_as())?.to_string();
        let target = self.resolve_target(&destination, &save_as)?;

        if let ResourceLocation::ArchiveEntry { archive, .. } = &target {
            if !archive.as_std_path().is_file() {
                return Err(Error::MissingArchive {
                    archive: archive.clone(),
                    resource: save_as,
                });
            }
        }

        let exists = target.exists()?;
        if exists && modification.skip_if_exists() && !modification.target.replace {
            return Ok(Outcome::Skipped(format!(
                "'{}' already exists in '{}'; skipping",
                save_as,
                modification.destination()
            )));
        }
        if let Some(record) = ledger.backup_if_needed(target.disk_path())? {
            summary.note(format!("Backed up '{}'", record.original));
        }

        tracing::info!("{}", description);
        summary.note(description);

        let roots = self.source_roots(modification, &target, exists, ctx.scratch_dir)?;
        let source = require(modification.source(), &roots)?;

        let Some(bytes) = modification.apply(&source.bytes, ctx)? else {
            return Ok(Outcome::Skipped(format!(
                "'{}' produced nothing to write",
                modification.source()
            )));
        };

        if let ResourceLocation::ArchiveEntry { archive, .. } = &target {
            let override_dir = resolve_relative(&self.context.game_dir, Utf8Path::new(OVERRIDE_DIR));
            let outcome = resolve_conflict(policy, &override_dir, &save_as, archive)?;
            if let Some(warning) = outcome.warning() {
                summary.warn(warning);
            }
        }

        target.write(bytes)?;
        Ok(Outcome::Written)
    }

    fn emit_progress(&self, stage: PatchStage, current: u32, total: u32, description: Option<String>) {
        if let Some(callback) = &self.progress_callback {
            callback(PatchProgress {
                stage,
                current,
                total,
                description,
            });
        }
    }
}
