//! Host-supplied codecs.
//!
//! The structured-record format and the script compiler are black boxes to the
//! engine: it resolves tokens and decides what to feed them, and they turn
//! bytes into bytes. Hosts register implementations on the
//! [`Patcher`](crate::Patcher); a category whose codec is missing fails per
//! operation with [`Error::CodecUnavailable`].

use crate::error::{Error, Result};
use crate::game::Game;
use crate::mods::gff::FieldEdit;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::Command;

/// Applies field edits to a structured-record (GFF) resource.
///
/// Every [`FieldEdit`] handed to the editor has its tokens already resolved to
/// literal string references.
pub trait StructuredRecordEditor: Send + Sync {
    fn apply(&self, source: &[u8], edits: &[FieldEdit]) -> Result<Vec<u8>>;
}

/// What a compiler needs besides the processed source text.
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// Processed source file, already written to the scratch directory.
    pub source_path: Utf8PathBuf,
    /// Directory holding every script source of the mod, for `#include`.
    pub include_dir: Utf8PathBuf,
    pub game: Game,
}

/// Produces compiled script bytecode from source text.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &str, context: &CompileContext) -> Result<Vec<u8>>;
}

/// Runs an `nwnnsscomp`-compatible executable.
///
/// Invoked as `<exe> -c <source> -o <output> -g <1|2>` from the include directory.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    executable: Utf8PathBuf,
}

impl ExternalCompiler {
    pub fn new(executable: impl Into<Utf8PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }
}

impl ScriptCompiler for ExternalCompiler {
    fn compile(&self, _source: &str, context: &CompileContext) -> Result<Vec<u8>> {
        let output = context.source_path.with_extension("ncs");

        tracing::debug!(
            "Running {} on {} (game {})",
            self.executable,
            context.source_path,
            context.game.number()
        );
        let result = Command::new(self.executable.as_std_path())
            .current_dir(context.include_dir.as_std_path())
            .arg("-c")
            .arg(context.source_path.as_std_path())
            .arg("-o")
            .arg(output.as_std_path())
            .arg("-g")
            .arg(context.game.number().to_string())
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(Error::Compiler(format!(
                "{} exited with {}: {}",
                self.executable,
                result.status,
                detail.trim()
            )));
        }

        let bytecode = std::fs::read(output.as_std_path()).map_err(|e| {
            Error::Compiler(format!("compiler produced no output at {}: {}", output, e))
        })?;
        std::fs::remove_file(output.as_std_path())?;
        Ok(bytecode)
    }
}

/// The optional codecs registered for a run.
#[derive(Default)]
pub struct Codecs {
    pub record_editor: Option<Box<dyn StructuredRecordEditor>>,
    pub compiler: Option<Box<dyn ScriptCompiler>>,
}

impl Codecs {
    pub fn record_editor(&self) -> Result<&dyn StructuredRecordEditor> {
        self.record_editor
            .as_deref()
            .ok_or(Error::CodecUnavailable("structured record"))
    }

    pub fn compiler(&self) -> Result<&dyn ScriptCompiler> {
        self.compiler
            .as_deref()
            .ok_or(Error::CodecUnavailable("script compiler"))
    }
}

impl std::fmt::Debug for Codecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codecs")
            .field("record_editor", &self.record_editor.is_some())
            .field("compiler", &self.compiler.is_some())
            .finish()
    }
}
