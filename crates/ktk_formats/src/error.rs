use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors raised while decoding or editing a talk table or sound set.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {format} signature: {found:?}")]
    InvalidSignature { format: &'static str, found: [u8; 4] },

    #[error("Unsupported {format} version: {found:?}")]
    UnsupportedVersion { format: &'static str, found: [u8; 4] },

    #[error("{0} data is truncated")]
    Truncated(&'static str),

    #[error("String reference {index} is out of range (table has {count} entries)")]
    EntryOutOfRange { index: u32, count: u32 },

    #[error("Sound resref '{0}' is longer than 16 characters")]
    SoundResRefTooLong(String),
}
