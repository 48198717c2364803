//! Talk table (`TLK V3.0`) codec.
//!
//! A talk table is the game's global string store: every localized line of text
//! is addressed by its index (a *string reference*, or strref). Mods append new
//! lines and occasionally replace existing ones.
//!
//! ```text
//! header (20 bytes: "TLK ", "V3.0", language_id u32, count u32, strings_offset u32)
//! entry table (40 bytes per entry)
//! string data
//! ```
//!
//! Text is stored as single-byte Windows-1252. It is decoded here as Latin-1,
//! which agrees with Windows-1252 for every character the game's fonts render;
//! characters above U+00FF are written as `?`.

use crate::error::{FormatError, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, Read, Write};

const SIGNATURE: [u8; 4] = *b"TLK ";
const VERSION: [u8; 4] = *b"V3.0";
const HEADER_SIZE: u32 = 20;
const ENTRY_SIZE: u32 = 40;

const FLAG_TEXT: u32 = 0x1;
const FLAG_SOUND: u32 = 0x2;
const FLAG_SOUND_LENGTH: u32 = 0x4;

/// One line of the talk table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TlkEntry {
    pub text: String,
    /// Voice-over resref, if any.
    pub sound: Option<String>,
    pub volume_variance: u32,
    pub pitch_variance: u32,
    pub sound_length: f32,
}

impl TlkEntry {
    pub fn new(text: impl Into<String>, sound: Option<String>) -> Self {
        Self {
            text: text.into(),
            sound,
            ..Self::default()
        }
    }

    fn flags(&self) -> u32 {
        let mut flags = 0;
        if !self.text.is_empty() {
            flags |= FLAG_TEXT;
        }
        if self.sound.is_some() {
            flags |= FLAG_SOUND;
        }
        if self.sound_length != 0.0 {
            flags |= FLAG_SOUND_LENGTH;
        }
        flags
    }
}

/// A decoded talk table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TalkTable {
    pub language_id: u32,
    entries: Vec<TlkEntry>,
}

impl TalkTable {
    pub fn new(language_id: u32) -> Self {
        Self {
            language_id,
            entries: Vec::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(bytes);

        let mut signature = [0u8; 4];
        reader
            .read_exact(&mut signature)
            .map_err(|_| FormatError::Truncated("TLK"))?;
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature {
                format: "TLK",
                found: signature,
            });
        }

        let mut version = [0u8; 4];
        reader
            .read_exact(&mut version)
            .map_err(|_| FormatError::Truncated("TLK"))?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion {
                format: "TLK",
                found: version,
            });
        }

        let language_id = reader.read_u32::<LE>()?;
        let count = reader.read_u32::<LE>()?;
        let strings_offset = reader.read_u32::<LE>()? as usize;

        let table_end = HEADER_SIZE as usize + (count as usize) * ENTRY_SIZE as usize;
        if bytes.len() < table_end {
            return Err(FormatError::Truncated("TLK"));
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let flags = reader.read_u32::<LE>()?;
            let mut raw_sound = [0u8; 16];
            reader.read_exact(&mut raw_sound)?;
            let volume_variance = reader.read_u32::<LE>()?;
            let pitch_variance = reader.read_u32::<LE>()?;
            let offset = reader.read_u32::<LE>()? as usize;
            let size = reader.read_u32::<LE>()? as usize;
            let sound_length = reader.read_f32::<LE>()?;

            let text = if flags & FLAG_TEXT != 0 || size > 0 {
                let start = strings_offset + offset;
                let raw = bytes
                    .get(start..start + size)
                    .ok_or(FormatError::Truncated("TLK"))?;
                decode_text(raw)
            } else {
                String::new()
            };

            let sound_end = raw_sound.iter().position(|&b| b == 0).unwrap_or(16);
            let sound = (flags & FLAG_SOUND != 0 && sound_end > 0)
                .then(|| String::from_utf8_lossy(&raw_sound[..sound_end]).into_owned());

            entries.push(TlkEntry {
                text,
                sound,
                volume_variance,
                pitch_variance,
                sound_length: if flags & FLAG_SOUND_LENGTH != 0 {
                    sound_length
                } else {
                    0.0
                },
            });
        }

        Ok(Self {
            language_id,
            entries,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = self.entries.len() as u32;
        let strings_offset = HEADER_SIZE + count * ENTRY_SIZE;

        let mut out = Vec::with_capacity(strings_offset as usize);
        out.write_all(&SIGNATURE)?;
        out.write_all(&VERSION)?;
        out.write_u32::<LE>(self.language_id)?;
        out.write_u32::<LE>(count)?;
        out.write_u32::<LE>(strings_offset)?;

        let mut strings = Vec::new();
        for entry in &self.entries {
            let encoded = encode_text(&entry.text);

            let mut raw_sound = [0u8; 16];
            if let Some(sound) = &entry.sound {
                if sound.len() > 16 {
                    return Err(FormatError::SoundResRefTooLong(sound.clone()));
                }
                raw_sound[..sound.len()].copy_from_slice(sound.as_bytes());
            }

            out.write_u32::<LE>(entry.flags())?;
            out.write_all(&raw_sound)?;
            out.write_u32::<LE>(entry.volume_variance)?;
            out.write_u32::<LE>(entry.pitch_variance)?;
            out.write_u32::<LE>(strings.len() as u32)?;
            out.write_u32::<LE>(encoded.len() as u32)?;
            out.write_f32::<LE>(entry.sound_length)?;

            strings.extend_from_slice(&encoded);
        }

        out.extend_from_slice(&strings);
        Ok(out)
    }

    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&TlkEntry> {
        self.entries.get(index as usize)
    }

    pub fn entries(&self) -> &[TlkEntry] {
        &self.entries
    }

    /// Append an entry and return its string reference.
    pub fn append(&mut self, entry: TlkEntry) -> u32 {
        self.entries.push(entry);
        self.len() - 1
    }

    /// Replace the text and/or sound of an existing entry.
    ///
    /// `None` leaves the corresponding field untouched.
    pub fn replace(&mut self, index: u32, text: Option<String>, sound: Option<String>) -> Result<()> {
        let count = self.len();
        let entry = self
            .entries
            .get_mut(index as usize)
            .ok_or(FormatError::EntryOutOfRange { index, count })?;

        if let Some(text) = text {
            entry.text = text;
        }
        if let Some(sound) = sound {
            entry.sound = (!sound.is_empty()).then_some(sound);
        }
        Ok(())
    }
}

fn decode_text(raw: &[u8]) -> String {
    raw.iter().map(|&b| b as char).collect()
}

/// Encode as Latin-1. Characters outside it are written as `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let encoded = text
        .chars()
        .map(|c| match u8::try_from(c as u32) {
            Ok(byte) => byte,
            Err(_) => {
                replaced += 1;
                b'?'
            }
        })
        .collect();
    if replaced > 0 {
        tracing::warn!(
            "{} character(s) in '{}' cannot be stored in a talk table and were replaced with '?'",
            replaced,
            text
        );
    }
    encoded
}
