//! String-table edits against `dialog.tlk`.

use super::PatchContext;
use crate::error::Result;
use crate::memory::parse_strref_token;
use ktk_formats::{TalkTable, TlkEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TlkEdit {
    /// Add an entry at the end of the table, optionally remembering its index.
    Append {
        text: String,
        #[serde(default)]
        sound: Option<String>,
        /// `StrRefN` token that receives the new index.
        #[serde(default)]
        token: Option<String>,
    },
    /// Overwrite the text and/or sound of an existing entry.
    Replace {
        strref: u32,
        #[serde(default)]
        text: Option<String>,
        /// An empty string clears the sound.
        #[serde(default)]
        sound: Option<String>,
    },
}

pub(crate) fn apply(source: &[u8], edits: &[TlkEdit], ctx: &mut PatchContext<'_>) -> Result<Vec<u8>> {
    let mut table = TalkTable::from_bytes(source)?;

    for edit in edits {
        match edit {
            TlkEdit::Append { text, sound, token } => {
                let slot = token.as_deref().map(parse_strref_token).transpose()?;
                let index = table.append(TlkEntry::new(text.clone(), sound.clone()));
                tracing::debug!("Appended string table entry {}", index);
                if let Some(slot) = slot {
                    ctx.memory.store_strref(slot, index);
                }
            }
            TlkEdit::Replace { strref, text, sound } => {
                table.replace(*strref, text.clone(), sound.clone())?;
                tracing::debug!("Replaced string table entry {}", strref);
            }
        }
    }

    Ok(table.to_bytes()?)
}
