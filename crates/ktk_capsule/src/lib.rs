//! Resource identifiers and capsule containers for KotOR game data.
//!
//! The game stores most of its resources inside *capsules*: ERF-family archives
//! (`.erf`, `.mod`, `.sav`, `.hak`) and RIM archives (`.rim`). Each entry is
//! addressed by a [`ResRef`] and a [`ResourceType`]. This crate reads capsules
//! into memory, lets callers replace or add entries, and writes them back.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use ktk_capsule::{Capsule, ResRef, ResourceType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let path = Utf8Path::new("modules/danm13.mod");
//! let mut capsule = Capsule::open(path)?;
//! capsule.set(ResRef::new("n_bastila")?, ResourceType::UTC, std::fs::read("n_bastila.utc")?);
//! capsule.save(path)?;
//! # Ok(())
//! # }
//! ```

mod capsule;
mod erf;
pub mod error;
pub mod resource;
mod rim;

pub use capsule::{is_capsule_path, Capsule, CapsuleFormat, CapsuleResource, CAPSULE_EXTENSIONS};
pub use erf::ErfHeaderExtras;
pub use error::{CapsuleError, Result};
pub use resource::{ResRef, ResourceIdentifier, ResourceType, RESREF_MAX_LEN};
