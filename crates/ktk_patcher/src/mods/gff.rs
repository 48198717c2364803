//! Structured-record (GFF) field edits.
//!
//! The engine only resolves tokens; the edit itself is performed by the host's
//! [`StructuredRecordEditor`](crate::codecs::StructuredRecordEditor).

use super::PatchContext;
use crate::error::Result;
use crate::memory::{PatcherMemory, StrRefValue};
use serde::{Deserialize, Serialize};

/// One field assignment. `path` addresses the field, e.g. `ClassList\0\Class`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub path: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Byte(u8),
    Char(i8),
    Word(u16),
    Short(i16),
    Dword(u32),
    Int(i32),
    Dword64(u64),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    ResRef(String),
    /// String reference of a localized string field.
    StrRef(StrRefValue),
}

impl FieldEdit {
    /// Copy of this edit with any `StrRefN` token replaced by its value.
    pub fn resolve(&self, memory: &PatcherMemory) -> Result<FieldEdit> {
        let value = match &self.value {
            FieldValue::StrRef(strref) => FieldValue::StrRef(StrRefValue::Literal(memory.resolve(strref)?)),
            other => other.clone(),
        };
        Ok(FieldEdit {
            path: self.path.clone(),
            value,
        })
    }
}

pub(crate) fn apply(source: &[u8], edits: &[FieldEdit], ctx: &mut PatchContext<'_>) -> Result<Vec<u8>> {
    let editor = ctx.codecs.record_editor()?;
    let memory = &*ctx.memory;
    let resolved = edits
        .iter()
        .map(|edit| edit.resolve(memory))
        .collect::<Result<Vec<_>>>()?;
    editor.apply(source, &resolved)
}
