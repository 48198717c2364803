//! Raw byte edits to compiled scripts.
//!
//! Values are written big-endian, which is the byte order of the script
//! bytecode's operands.

use super::PatchContext;
use crate::error::{Error, Result};
use crate::memory::StrRefValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HackEdit {
    pub offset: u64,
    pub value: HackValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackValue {
    U8(u8),
    U16(u16),
    U32(u32),
    Strref16(StrRefValue),
    Strref32(StrRefValue),
}

impl HackValue {
    fn width(&self) -> usize {
        match self {
            HackValue::U8(_) => 1,
            HackValue::U16(_) | HackValue::Strref16(_) => 2,
            HackValue::U32(_) | HackValue::Strref32(_) => 4,
        }
    }
}

pub(crate) fn apply(source: &[u8], edits: &[HackEdit], ctx: &mut PatchContext<'_>) -> Result<Vec<u8>> {
    let mut bytes = source.to_vec();

    for edit in edits {
        let width = edit.value.width();
        let start = usize::try_from(edit.offset).ok();
        let range = start
            .and_then(|start| start.checked_add(width).map(|end| start..end))
            .filter(|range| range.end <= bytes.len())
            .ok_or(Error::HackOutOfRange {
                offset: edit.offset,
                width,
                len: bytes.len(),
            })?;

        let encoded: Vec<u8> = match &edit.value {
            HackValue::U8(value) => vec![*value],
            HackValue::U16(value) => value.to_be_bytes().to_vec(),
            HackValue::U32(value) => value.to_be_bytes().to_vec(),
            HackValue::Strref16(strref) => {
                let resolved = ctx.memory.resolve(strref)?;
                let narrow = u16::try_from(resolved).map_err(|_| {
                    Error::Other(format!(
                        "string reference {} does not fit in a 16-bit hack at offset {}",
                        resolved, edit.offset
                    ))
                })?;
                narrow.to_be_bytes().to_vec()
            }
            HackValue::Strref32(strref) => ctx.memory.resolve(strref)?.to_be_bytes().to_vec(),
        };

        tracing::trace!("Hack at offset {}: {:02x?}", edit.offset, encoded);
        bytes[range].copy_from_slice(&encoded);
    }

    Ok(bytes)
}
