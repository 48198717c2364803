//! Codecs for the small fixed-layout KotOR formats that mods edit in place.
//!
//! - [`tlk`]: the talk table (`dialog.tlk`), the global string store.
//! - [`ssf`]: creature sound sets, mapping sound events to talk table entries.

pub mod error;
pub mod ssf;
pub mod tlk;

pub use error::{FormatError, Result};
pub use ssf::{SoundEvent, SoundSet, NO_SOUND};
pub use tlk::{TalkTable, TlkEntry};
