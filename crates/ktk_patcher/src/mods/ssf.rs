//! Sound-set edits.

use super::PatchContext;
use crate::error::Result;
use crate::memory::StrRefValue;
use ktk_formats::{SoundEvent, SoundSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsfEdit {
    pub event: SoundEvent,
    pub strref: StrRefValue,
}

pub(crate) fn apply(source: &[u8], edits: &[SsfEdit], ctx: &mut PatchContext<'_>) -> Result<Vec<u8>> {
    let mut sounds = SoundSet::from_bytes(source)?;
    for edit in edits {
        let strref = ctx.memory.resolve(&edit.strref)?;
        tracing::debug!("Sound event {:?} -> {}", edit.event, strref);
        sounds.set(edit.event, strref);
    }
    Ok(sounds.to_bytes()?)
}
