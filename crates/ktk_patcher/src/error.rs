//! Error types for patch runs.
//!
//! All fallible functions in this crate return [`Result<T>`]. Errors fall into
//! three groups, which the orchestrator treats differently:
//!
//! - **Pre-flight** ([`ConfigMissing`](Error::ConfigMissing),
//!   [`StagingMissing`](Error::StagingMissing),
//!   [`RequiredFileMissing`](Error::RequiredFileMissing),
//!   [`AmbiguousTarget`](Error::AmbiguousTarget)) abort the run before anything
//!   on disk is touched.
//! - **Hard per-operation** ([`MissingArchive`](Error::MissingArchive)) fails one
//!   operation and is reported as a hard failure; the run continues.
//! - Everything else is a **soft per-operation** failure.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading sources, writing targets, copying backups).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Error from `ktk_capsule` while reading or writing a capsule.
    #[error("Capsule error: {0}")]
    Capsule(#[from] ktk_capsule::CapsuleError),

    /// Error from `ktk_formats` while decoding or editing a talk table or sound set.
    #[error("Format error: {0}")]
    Format(#[from] ktk_formats::FormatError),

    /// The change-list file disappeared between loading and running.
    #[error("Patch configuration not found: {0}")]
    ConfigMissing(Utf8PathBuf),

    /// The config file extension is neither `.toml` nor `.json`.
    #[error("Unsupported patch configuration format: {0}")]
    UnsupportedConfigFormat(Utf8PathBuf),

    /// The mod's staging directory (where source files live) does not exist.
    #[error("Mod staging directory not found: {0}")]
    StagingMissing(Utf8PathBuf),

    /// A file the mod declares as a prerequisite is not installed.
    #[error("Required file not found: {path}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    RequiredFileMissing {
        path: Utf8PathBuf,
        message: Option<String>,
    },

    /// The game directory could not be classified as exactly one supported game.
    #[error("Could not determine which game is installed in '{game_dir}' (KotOR markers: {k1_markers}, TSL markers: {k2_markers})")]
    AmbiguousTarget {
        game_dir: Utf8PathBuf,
        k1_markers: usize,
        k2_markers: usize,
    },

    /// An operation targets a capsule that is not on disk.
    #[error("The capsule '{archive}' did not exist when attempting to patch '{resource}'")]
    MissingArchive {
        archive: Utf8PathBuf,
        resource: String,
    },

    /// No root yielded content for a resource that must already exist.
    #[error("Resource '{resource}' not found (searched: {})", .searched.join(", "))]
    ResourceNotFound {
        resource: String,
        searched: Vec<String>,
    },

    /// A `StrRefN` token was referenced before any operation stored it.
    #[error("Unknown memory token '{0}'")]
    UnknownToken(String),

    /// A token string is not of the form `StrRefN`.
    #[error("Invalid memory token '{0}'")]
    InvalidToken(String),

    /// A destination or source path escapes its root or is otherwise unusable.
    #[error("Invalid target path '{0}'")]
    InvalidTarget(String),

    /// A byte edit lies outside the resource it edits.
    #[error("Hack at offset {offset} (width {width}) is outside a {len} byte resource")]
    HackOutOfRange { offset: u64, width: usize, len: usize },

    /// No codec was registered for a category that needs one.
    #[error("No {0} codec registered")]
    CodecUnavailable(&'static str),

    /// The structured-record editor rejected an edit.
    #[error("Structured record edit failed: {0}")]
    RecordEditor(String),

    /// The script compiler failed.
    #[error("Script compilation failed: {0}")]
    Compiler(String),

    /// Catch-all for errors from host-supplied collaborators.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Hard failures are reported separately from ordinary per-operation errors.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Error::MissingArchive { .. })
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
