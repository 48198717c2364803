//! ERF-family container layout (`ERF `, `MOD `, `SAV `, `HAK `, version `V1.0`).
//!
//! ```text
//! header (160 bytes)
//! localized description strings
//! key list      (24 bytes per entry: resref[16], res_id u32, type u16, unused u16)
//! resource list (8 bytes per entry: offset u32, size u32)
//! resource data
//! ```

use crate::capsule::{slice_at, table_len, CapsuleResource};
use crate::error::{CapsuleError, Result};
use crate::resource::{ResRef, ResourceType, RESREF_MAX_LEN};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, Read, Write};

pub(crate) const VERSION: [u8; 4] = *b"V1.0";
const HEADER_SIZE: u32 = 160;
const KEY_SIZE: u32 = 24;
const RESOURCE_ENTRY_SIZE: u32 = 8;

/// Header fields that carry no resource data but must survive a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErfHeaderExtras {
    pub language_count: u32,
    /// Raw localized description block, kept byte-for-byte.
    pub localized_strings: Vec<u8>,
    pub build_year: u32,
    pub build_day: u32,
    pub description_strref: u32,
}

pub(crate) fn read(bytes: &[u8]) -> Result<(ErfHeaderExtras, Vec<CapsuleResource>)> {
    let mut reader = Cursor::new(slice_at(bytes, 0, HEADER_SIZE as usize, "ERF header")?);

    let mut signature = [0u8; 4];
    reader.read_exact(&mut signature)?;
    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    if version != VERSION {
        return Err(CapsuleError::UnsupportedVersion(version));
    }

    let language_count = reader.read_u32::<LE>()?;
    let localized_size = reader.read_u32::<LE>()?;
    let entry_count = reader.read_u32::<LE>()?;
    let localized_offset = reader.read_u32::<LE>()?;
    let key_offset = reader.read_u32::<LE>()?;
    let resource_offset = reader.read_u32::<LE>()?;
    let build_year = reader.read_u32::<LE>()?;
    let build_day = reader.read_u32::<LE>()?;
    let description_strref = reader.read_u32::<LE>()?;

    let localized_strings = slice_at(
        bytes,
        localized_offset as usize,
        localized_size as usize,
        "ERF localized strings",
    )?
    .to_vec();

    let keys = slice_at(
        bytes,
        key_offset as usize,
        table_len(entry_count, KEY_SIZE, "ERF key list")?,
        "ERF key list",
    )?;
    let entries = slice_at(
        bytes,
        resource_offset as usize,
        table_len(entry_count, RESOURCE_ENTRY_SIZE, "ERF resource list")?,
        "ERF resource list",
    )?;

    let mut key_reader = Cursor::new(keys);
    let mut entry_reader = Cursor::new(entries);
    let mut resources = Vec::with_capacity(entry_count as usize);

    for _ in 0..entry_count {
        let mut raw_resref = [0u8; RESREF_MAX_LEN];
        key_reader.read_exact(&mut raw_resref)?;
        let _res_id = key_reader.read_u32::<LE>()?;
        let restype = ResourceType(key_reader.read_u16::<LE>()?);
        let _unused = key_reader.read_u16::<LE>()?;

        let offset = entry_reader.read_u32::<LE>()?;
        let size = entry_reader.read_u32::<LE>()?;

        let resref = ResRef::from_padded(&raw_resref)?;
        let data = slice_at(bytes, offset as usize, size as usize, resref.as_str())?.to_vec();

        resources.push(CapsuleResource {
            resref,
            restype,
            data,
        });
    }

    Ok((
        ErfHeaderExtras {
            language_count,
            localized_strings,
            build_year,
            build_day,
            description_strref,
        },
        resources,
    ))
}

pub(crate) fn write(
    signature: [u8; 4],
    extras: &ErfHeaderExtras,
    resources: &[CapsuleResource],
) -> Result<Vec<u8>> {
    let entry_count = resources.len() as u32;
    let localized_offset = HEADER_SIZE;
    let key_offset = localized_offset + extras.localized_strings.len() as u32;
    let resource_offset = key_offset + entry_count * KEY_SIZE;
    let data_offset = resource_offset + entry_count * RESOURCE_ENTRY_SIZE;

    let data_len: usize = resources.iter().map(|r| r.data.len()).sum();
    let mut out = Vec::with_capacity(data_offset as usize + data_len);

    out.write_all(&signature)?;
    out.write_all(&VERSION)?;
    out.write_u32::<LE>(extras.language_count)?;
    out.write_u32::<LE>(extras.localized_strings.len() as u32)?;
    out.write_u32::<LE>(entry_count)?;
    out.write_u32::<LE>(localized_offset)?;
    out.write_u32::<LE>(key_offset)?;
    out.write_u32::<LE>(resource_offset)?;
    out.write_u32::<LE>(extras.build_year)?;
    out.write_u32::<LE>(extras.build_day)?;
    out.write_u32::<LE>(extras.description_strref)?;
    out.resize(HEADER_SIZE as usize, 0);

    out.write_all(&extras.localized_strings)?;

    for (index, resource) in resources.iter().enumerate() {
        out.write_all(&resource.resref.to_padded())?;
        out.write_u32::<LE>(index as u32)?;
        out.write_u16::<LE>(resource.restype.id())?;
        out.write_u16::<LE>(0)?;
    }

    let mut offset = data_offset;
    for resource in resources {
        out.write_u32::<LE>(offset)?;
        out.write_u32::<LE>(resource.data.len() as u32)?;
        offset += resource.data.len() as u32;
    }

    for resource in resources {
        out.write_all(&resource.data)?;
    }

    Ok(out)
}
