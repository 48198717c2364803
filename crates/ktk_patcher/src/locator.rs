//! Resource lookup across an ordered list of roots.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ktk_capsule::{Capsule, ResourceIdentifier};
use std::fmt;

/// Where a resource lives. A lookup key only; it never holds the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    LooseFile(Utf8PathBuf),
    ArchiveEntry {
        archive: Utf8PathBuf,
        identifier: ResourceIdentifier,
    },
}

impl ResourceLocation {
    /// The file on disk that a write to this location modifies.
    pub fn disk_path(&self) -> &Utf8Path {
        match self {
            ResourceLocation::LooseFile(path) => path,
            ResourceLocation::ArchiveEntry { archive, .. } => archive,
        }
    }

    pub fn exists(&self) -> Result<bool> {
        match self {
            ResourceLocation::LooseFile(path) => Ok(path.as_std_path().is_file()),
            ResourceLocation::ArchiveEntry {
                archive,
                identifier,
            } => {
                if !archive.as_std_path().is_file() {
                    return Ok(false);
                }
                let capsule = Capsule::open(archive)?;
                Ok(capsule.contains(&identifier.resref, identifier.restype))
            }
        }
    }

    /// Read the resource, or `None` if it (or its archive) does not exist.
    pub fn read(&self) -> Result<Option<Vec<u8>>> {
        match self {
            ResourceLocation::LooseFile(path) => {
                if !path.as_std_path().is_file() {
                    return Ok(None);
                }
                Ok(Some(std::fs::read(path.as_std_path())?))
            }
            ResourceLocation::ArchiveEntry {
                archive,
                identifier,
            } => {
                if !archive.as_std_path().is_file() {
                    return Ok(None);
                }
                let capsule = Capsule::open(archive)?;
                Ok(capsule
                    .get(&identifier.resref, identifier.restype)
                    .map(<[u8]>::to_vec))
            }
        }
    }

    /// Write `bytes`, creating parent directories for loose files. An archive
    /// must already exist.
    pub fn write(&self, bytes: Vec<u8>) -> Result<()> {
        match self {
            ResourceLocation::LooseFile(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent.as_std_path())?;
                }
                std::fs::write(path.as_std_path(), bytes)?;
            }
            ResourceLocation::ArchiveEntry {
                archive,
                identifier,
            } => {
                if !archive.as_std_path().is_file() {
                    return Err(Error::MissingArchive {
                        archive: archive.clone(),
                        resource: identifier.filename(),
                    });
                }
                let mut capsule = Capsule::open(archive)?;
                let replaced = capsule.set(identifier.resref.clone(), identifier.restype, bytes);
                capsule.save(archive)?;
                tracing::trace!(
                    "{} '{}' in {}",
                    if replaced { "Replaced" } else { "Added" },
                    identifier,
                    archive
                );
            }
        }
        Ok(())
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocation::LooseFile(path) => write!(f, "{}", path),
            ResourceLocation::ArchiveEntry {
                archive,
                identifier,
            } => write!(f, "{}:{}", archive, identifier),
        }
    }
}

/// A resource found by [`locate`].
#[derive(Debug, Clone)]
pub struct Located {
    pub location: ResourceLocation,
    pub bytes: Vec<u8>,
}

/// Try each root in order; the first one holding the resource wins.
pub fn locate(roots: &[ResourceLocation]) -> Result<Option<Located>> {
    for root in roots {
        match root.read()? {
            Some(bytes) => {
                tracing::debug!("Found {} ({} bytes)", root, bytes.len());
                return Ok(Some(Located {
                    location: root.clone(),
                    bytes,
                }));
            }
            None => tracing::debug!("Not found at {}", root),
        }
    }
    Ok(None)
}

/// Like [`locate`], but a miss is an error.
pub fn require(resource: &str, roots: &[ResourceLocation]) -> Result<Located> {
    locate(roots)?.ok_or_else(|| Error::ResourceNotFound {
        resource: resource.to_string(),
        searched: roots.iter().map(ToString::to_string).collect(),
    })
}
