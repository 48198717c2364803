//! Error types for resource identifiers and capsule containers.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CapsuleError>;

/// Errors that can occur while reading, editing or writing a capsule.
#[derive(Error, Debug)]
pub enum CapsuleError {
    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The first four bytes do not name a known container.
    #[error("Invalid capsule signature: {0:?}")]
    InvalidSignature([u8; 4]),

    /// The container signature is known but its version is not.
    #[error("Unsupported capsule version: {0:?}")]
    UnsupportedVersion([u8; 4]),

    /// A header offset or size points outside the file.
    #[error("Capsule is truncated: {0}")]
    Truncated(String),

    /// A resref is empty, too long, or contains characters the game cannot store.
    #[error("Invalid resref '{0}'")]
    InvalidResRef(String),

    /// A filename extension does not map to a known resource type.
    #[error("Unknown resource type for extension '{0}'")]
    UnknownExtension(String),

    /// A filename has no extension to derive a resource type from.
    #[error("Missing resource extension in '{0}'")]
    MissingExtension(String),

    /// The path does not use a capsule extension.
    #[error("Not a capsule path: {0}")]
    NotACapsule(Utf8PathBuf),
}
