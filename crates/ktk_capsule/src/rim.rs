//! RIM container layout (`RIM `, version `V1.0`).
//!
//! ```text
//! header (120 bytes: signature, version, reserved u32, count u32, key offset u32, padding)
//! key list (32 bytes per entry: resref[16], type u32, res_id u32, offset u32, size u32)
//! resource data
//! ```

use crate::capsule::{slice_at, table_len, CapsuleResource};
use crate::error::{CapsuleError, Result};
use crate::resource::{ResRef, ResourceType, RESREF_MAX_LEN};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, Read, Write};

pub(crate) const SIGNATURE: [u8; 4] = *b"RIM ";
const VERSION: [u8; 4] = *b"V1.0";
const HEADER_SIZE: u32 = 120;
const KEY_SIZE: u32 = 32;

pub(crate) fn read(bytes: &[u8]) -> Result<Vec<CapsuleResource>> {
    let mut reader = Cursor::new(slice_at(bytes, 0, HEADER_SIZE as usize, "RIM header")?);

    let mut signature = [0u8; 4];
    reader.read_exact(&mut signature)?;
    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    if version != VERSION {
        return Err(CapsuleError::UnsupportedVersion(version));
    }

    let _reserved = reader.read_u32::<LE>()?;
    let entry_count = reader.read_u32::<LE>()?;
    let key_offset = reader.read_u32::<LE>()?;

    let keys = slice_at(
        bytes,
        key_offset as usize,
        table_len(entry_count, KEY_SIZE, "RIM key list")?,
        "RIM key list",
    )?;
    let mut key_reader = Cursor::new(keys);
    let mut resources = Vec::with_capacity(entry_count as usize);

    for _ in 0..entry_count {
        let mut raw_resref = [0u8; RESREF_MAX_LEN];
        key_reader.read_exact(&mut raw_resref)?;
        let restype = key_reader.read_u32::<LE>()?;
        let _res_id = key_reader.read_u32::<LE>()?;
        let offset = key_reader.read_u32::<LE>()?;
        let size = key_reader.read_u32::<LE>()?;

        let resref = ResRef::from_padded(&raw_resref)?;
        let data = slice_at(bytes, offset as usize, size as usize, resref.as_str())?.to_vec();

        resources.push(CapsuleResource {
            resref,
            restype: ResourceType(restype as u16),
            data,
        });
    }

    Ok(resources)
}

pub(crate) fn write(resources: &[CapsuleResource]) -> Result<Vec<u8>> {
    let entry_count = resources.len() as u32;
    let data_offset = HEADER_SIZE + entry_count * KEY_SIZE;

    let data_len: usize = resources.iter().map(|r| r.data.len()).sum();
    let mut out = Vec::with_capacity(data_offset as usize + data_len);

    out.write_all(&SIGNATURE)?;
    out.write_all(&VERSION)?;
    out.write_u32::<LE>(0)?;
    out.write_u32::<LE>(entry_count)?;
    out.write_u32::<LE>(HEADER_SIZE)?;
    out.resize(HEADER_SIZE as usize, 0);

    let mut offset = data_offset;
    for (index, resource) in resources.iter().enumerate() {
        out.write_all(&resource.resref.to_padded())?;
        out.write_u32::<LE>(resource.restype.id() as u32)?;
        out.write_u32::<LE>(index as u32)?;
        out.write_u32::<LE>(offset)?;
        out.write_u32::<LE>(resource.data.len() as u32)?;
        offset += resource.data.len() as u32;
    }

    for resource in resources {
        out.write_all(&resource.data)?;
    }

    Ok(out)
}
