//! In-memory capsule model shared by the ERF and RIM layouts.
//!
//! A [`Capsule`] is read fully into memory, edited with [`set`](Capsule::set) /
//! [`remove`](Capsule::remove), then written back with [`save`](Capsule::save).
//! Module capsules are a few megabytes at most, so there is no streaming writer.

use crate::erf::{self, ErfHeaderExtras};
use crate::error::{CapsuleError, Result};
use crate::resource::{ResRef, ResourceIdentifier, ResourceType};
use crate::rim;
use camino::Utf8Path;

/// Filename extensions that denote a capsule rather than a loose resource.
pub const CAPSULE_EXTENSIONS: &[&str] = &["mod", "erf", "sav", "rim", "hak"];

/// Returns `true` if the path uses a capsule extension (case-insensitive).
pub fn is_capsule_path(path: &Utf8Path) -> bool {
    path.extension()
        .map(|ext| CAPSULE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Byte length of a table of `count` fixed-size records from an untrusted header.
pub(crate) fn table_len(count: u32, record_size: u32, what: &str) -> Result<usize> {
    (count as usize)
        .checked_mul(record_size as usize)
        .ok_or_else(|| CapsuleError::Truncated(format!("{} with {} entries overflows", what, count)))
}

/// Borrow `len` bytes at `offset`, failing instead of panicking on short input.
pub(crate) fn slice_at<'a>(bytes: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            CapsuleError::Truncated(format!(
                "{} at offset {} (len {}) exceeds file size {}",
                what,
                offset,
                len,
                bytes.len()
            ))
        })
}

/// On-disk layout of a capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleFormat {
    /// ERF-family layout; the signature (`ERF `, `MOD `, `SAV `, `HAK `) is preserved.
    Erf([u8; 4]),
    Rim,
}

impl CapsuleFormat {
    /// Pick the layout a new capsule should use for the given path.
    pub fn for_path(path: &Utf8Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "rim" => Ok(Self::Rim),
            "mod" => Ok(Self::Erf(*b"MOD ")),
            "sav" => Ok(Self::Erf(*b"SAV ")),
            "hak" => Ok(Self::Erf(*b"HAK ")),
            "erf" => Ok(Self::Erf(*b"ERF ")),
            _ => Err(CapsuleError::NotACapsule(path.to_path_buf())),
        }
    }

    fn from_signature(signature: [u8; 4]) -> Result<Self> {
        match &signature {
            b"ERF " | b"MOD " | b"SAV " | b"HAK " => Ok(Self::Erf(signature)),
            b"RIM " => Ok(Self::Rim),
            _ => Err(CapsuleError::InvalidSignature(signature)),
        }
    }
}

/// One named, typed resource stored inside a capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapsuleResource {
    pub resref: ResRef,
    pub restype: ResourceType,
    pub data: Vec<u8>,
}

impl CapsuleResource {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resref.clone(), self.restype)
    }
}

/// A container of resources, kept in the order they appear on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capsule {
    format: CapsuleFormat,
    extras: ErfHeaderExtras,
    resources: Vec<CapsuleResource>,
}

impl Capsule {
    /// Create an empty capsule of the given layout.
    pub fn new(format: CapsuleFormat) -> Self {
        Self {
            format,
            extras: ErfHeaderExtras {
                description_strref: u32::MAX,
                ..ErfHeaderExtras::default()
            },
            resources: Vec::new(),
        }
    }

    /// Read and parse a capsule file.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let bytes = std::fs::read(path.as_std_path())?;
        let capsule = Self::from_bytes(&bytes)?;
        tracing::debug!(
            "Opened capsule {} ({} resources)",
            path,
            capsule.resources.len()
        );
        Ok(capsule)
    }

    /// Parse a capsule from memory; the layout is detected from the signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let head = slice_at(bytes, 0, 4, "signature")?;
        let signature = [head[0], head[1], head[2], head[3]];

        match CapsuleFormat::from_signature(signature)? {
            CapsuleFormat::Erf(signature) => {
                let (extras, resources) = erf::read(bytes)?;
                Ok(Self {
                    format: CapsuleFormat::Erf(signature),
                    extras,
                    resources,
                })
            }
            CapsuleFormat::Rim => Ok(Self {
                format: CapsuleFormat::Rim,
                extras: ErfHeaderExtras::default(),
                resources: rim::read(bytes)?,
            }),
        }
    }

    pub fn format(&self) -> CapsuleFormat {
        self.format
    }

    pub fn resources(&self) -> &[CapsuleResource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn position(&self, resref: &ResRef, restype: ResourceType) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| &r.resref == resref && r.restype == restype)
    }

    pub fn contains(&self, resref: &ResRef, restype: ResourceType) -> bool {
        self.position(resref, restype).is_some()
    }

    pub fn get(&self, resref: &ResRef, restype: ResourceType) -> Option<&[u8]> {
        self.position(resref, restype)
            .map(|idx| self.resources[idx].data.as_slice())
    }

    /// Insert a resource, replacing the data of an existing entry in place.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn set(&mut self, resref: ResRef, restype: ResourceType, data: Vec<u8>) -> bool {
        match self.position(&resref, restype) {
            Some(idx) => {
                self.resources[idx].data = data;
                true
            }
            None => {
                self.resources.push(CapsuleResource {
                    resref,
                    restype,
                    data,
                });
                false
            }
        }
    }

    /// Remove a resource, returning its data if it was present.
    pub fn remove(&mut self, resref: &ResRef, restype: ResourceType) -> Option<Vec<u8>> {
        self.position(resref, restype)
            .map(|idx| self.resources.remove(idx).data)
    }

    /// Serialize using the capsule's own layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self.format {
            CapsuleFormat::Erf(signature) => erf::write(signature, &self.extras, &self.resources),
            CapsuleFormat::Rim => rim::write(&self.resources),
        }
    }

    /// Serialize and write to `path`, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::write(path.as_std_path(), self.to_bytes()?)?;
        tracing::debug!("Saved capsule {} ({} resources)", path, self.resources.len());
        Ok(())
    }
}
