//! Resource naming: resrefs, resource types and the pair that identifies a resource.
//!
//! The game addresses every resource by a short case-insensitive name (the
//! *resref*) plus a numeric type. Loose files carry the type as their extension
//! (`creature.utc`); capsules store the numeric id next to the name.

use crate::error::{CapsuleError, Result};
use std::fmt;

/// Maximum length of a resref in bytes.
pub const RESREF_MAX_LEN: usize = 16;

/// A case-insensitive resource name of at most [`RESREF_MAX_LEN`] ASCII characters.
///
/// Stored lowercased, so two resrefs compare equal regardless of the case they
/// were created with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResRef(String);

impl ResRef {
    /// Create a resref, validating length and character set.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        let valid = !name.is_empty()
            && name.len() <= RESREF_MAX_LEN
            && name
                .bytes()
                .all(|b| b.is_ascii_graphic() && b != b'/' && b != b'\\');

        if !valid {
            return Err(CapsuleError::InvalidResRef(name.to_string()));
        }

        Ok(Self(name.to_ascii_lowercase()))
    }

    /// Decode a null-padded 16 byte resref field as stored in capsule key tables.
    pub fn from_padded(raw: &[u8; RESREF_MAX_LEN]) -> Result<Self> {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(RESREF_MAX_LEN);
        let name = String::from_utf8_lossy(&raw[..end]);
        Self::new(name.as_ref())
    }

    /// Encode as a null-padded 16 byte field.
    pub fn to_padded(&self) -> [u8; RESREF_MAX_LEN] {
        let mut out = [0u8; RESREF_MAX_LEN];
        out[..self.0.len()].copy_from_slice(self.0.as_bytes());
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric resource type as stored in capsule key tables.
///
/// Unknown ids read from a capsule are preserved as-is; only the types listed in
/// the extension table can be created from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(pub u16);

/// Extension table: `(id, extension)`.
const RESOURCE_TYPES: &[(u16, &str)] = &[
    (1, "bmp"),
    (3, "tga"),
    (4, "wav"),
    (6, "plt"),
    (7, "ini"),
    (8, "mp3"),
    (10, "txt"),
    (2002, "mdl"),
    (2009, "nss"),
    (2010, "ncs"),
    (2011, "mod"),
    (2012, "are"),
    (2013, "set"),
    (2014, "ifo"),
    (2015, "bic"),
    (2016, "wok"),
    (2017, "2da"),
    (2018, "tlk"),
    (2022, "txi"),
    (2023, "git"),
    (2024, "bti"),
    (2025, "uti"),
    (2026, "btc"),
    (2027, "utc"),
    (2029, "dlg"),
    (2030, "itp"),
    (2032, "utt"),
    (2033, "dds"),
    (2035, "uts"),
    (2036, "ltr"),
    (2037, "gff"),
    (2038, "fac"),
    (2040, "ute"),
    (2042, "utd"),
    (2044, "utp"),
    (2045, "dft"),
    (2046, "gic"),
    (2047, "gui"),
    (2051, "utm"),
    (2052, "dwk"),
    (2053, "pwk"),
    (2056, "jrl"),
    (2057, "sav"),
    (2058, "utw"),
    (2060, "ssf"),
    (2061, "hak"),
    (2064, "ndb"),
    (2065, "ptm"),
    (2066, "ptt"),
    (3000, "lyt"),
    (3001, "vis"),
    (3002, "rim"),
    (3003, "pth"),
    (3004, "lip"),
    (3007, "tpc"),
    (3008, "mdx"),
    (9997, "erf"),
];

impl ResourceType {
    pub const NSS: Self = Self(2009);
    pub const NCS: Self = Self(2010);
    pub const TLK: Self = Self(2018);
    pub const UTC: Self = Self(2027);
    pub const SSF: Self = Self(2060);

    /// Look up a type by file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        RESOURCE_TYPES
            .iter()
            .find(|(_, e)| *e == ext)
            .map(|(id, _)| Self(*id))
    }

    /// The canonical extension, if the type is in the extension table.
    pub fn extension(&self) -> Option<&'static str> {
        RESOURCE_TYPES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, e)| *e)
    }

    pub fn id(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension() {
            Some(ext) => f.write_str(ext),
            None => write!(f, "type{}", self.0),
        }
    }
}

/// A resref and type pair: the identity of a resource inside a capsule or a
/// loose directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentifier {
    pub resref: ResRef,
    pub restype: ResourceType,
}

impl ResourceIdentifier {
    pub fn new(resref: ResRef, restype: ResourceType) -> Self {
        Self { resref, restype }
    }

    /// Parse a loose filename such as `creature.utc`.
    ///
    /// The type comes from the last extension; everything before it is the resref.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let (stem, ext) = filename
            .rsplit_once('.')
            .ok_or_else(|| CapsuleError::MissingExtension(filename.to_string()))?;
        let restype = ResourceType::from_extension(ext)
            .ok_or_else(|| CapsuleError::UnknownExtension(ext.to_string()))?;
        Ok(Self::new(ResRef::new(stem)?, restype))
    }

    /// The loose filename for this resource (`resref.ext`).
    pub fn filename(&self) -> String {
        format!("{}.{}", self.resref, self.restype)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resref, self.restype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resref_lowercases() {
        let a = ResRef::new("N_Bastila").unwrap();
        let b = ResRef::new("n_bastila").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "n_bastila");
    }

    #[test]
    fn test_resref_rejects_long_names() {
        assert!(ResRef::new("a_name_that_is_too_long").is_err());
        assert!(ResRef::new("").is_err());
        assert!(ResRef::new("dir/file").is_err());
    }

    #[test]
    fn test_resref_padding() {
        let resref = ResRef::new("area").unwrap();
        let padded = resref.to_padded();
        assert_eq!(&padded[..4], b"area");
        assert!(padded[4..].iter().all(|&b| b == 0));
        assert_eq!(ResRef::from_padded(&padded).unwrap(), resref);
    }

    #[test]
    fn test_resource_type_lookup() {
        assert_eq!(ResourceType::from_extension("UTC"), Some(ResourceType::UTC));
        assert_eq!(ResourceType::SSF.extension(), Some("ssf"));
        assert_eq!(ResourceType::from_extension("xyz"), None);
        assert_eq!(ResourceType(4242).to_string(), "type4242");
    }

    #[test]
    fn test_identifier_from_filename() {
        let ident = ResourceIdentifier::from_filename("Creature.UTC").unwrap();
        assert_eq!(ident.resref.as_str(), "creature");
        assert_eq!(ident.restype, ResourceType::UTC);
        assert_eq!(ident.filename(), "creature.utc");

        assert!(ResourceIdentifier::from_filename("noext").is_err());
        assert!(ResourceIdentifier::from_filename("file.bogus").is_err());
    }
}
