//! Sound set (`SSF V1.1`) codec.
//!
//! A sound set maps each of 28 creature sound events (battle cries, selection
//! barks, pain grunts...) to a string reference in the talk table, whose sound
//! field names the actual audio. An unused slot holds `0xFFFFFFFF`.

use crate::error::{FormatError, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};

const SIGNATURE: [u8; 4] = *b"SSF ";
const VERSION: [u8; 4] = *b"V1.1";
const HEADER_SIZE: u32 = 12;
/// The game's own tools pad the table with 12 unused slots after the 28 events.
const PADDING_SLOTS: usize = 12;

/// Value stored in a slot with no sound.
pub const NO_SOUND: u32 = u32::MAX;

/// The 28 sound events, in on-disk slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEvent {
    BattleCry1,
    BattleCry2,
    BattleCry3,
    BattleCry4,
    BattleCry5,
    BattleCry6,
    Select1,
    Select2,
    Select3,
    AttackGrunt1,
    AttackGrunt2,
    AttackGrunt3,
    PainGrunt1,
    PainGrunt2,
    LowHealth,
    Dead,
    CriticalHit,
    TargetImmune,
    LayMine,
    DisarmMine,
    BeginStealth,
    BeginSearch,
    BeginUnlock,
    UnlockFailed,
    UnlockSuccess,
    SeparatedFromParty,
    RejoinedParty,
    Poisoned,
}

impl SoundEvent {
    pub const COUNT: usize = 28;

    pub fn slot(self) -> usize {
        self as usize
    }
}

/// A decoded sound set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundSet {
    sounds: [u32; SoundEvent::COUNT],
}

impl Default for SoundSet {
    fn default() -> Self {
        Self {
            sounds: [NO_SOUND; SoundEvent::COUNT],
        }
    }
}

impl SoundSet {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(bytes);

        let mut signature = [0u8; 4];
        reader
            .read_exact(&mut signature)
            .map_err(|_| FormatError::Truncated("SSF"))?;
        if signature != SIGNATURE {
            return Err(FormatError::InvalidSignature {
                format: "SSF",
                found: signature,
            });
        }

        let mut version = [0u8; 4];
        reader
            .read_exact(&mut version)
            .map_err(|_| FormatError::Truncated("SSF"))?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion {
                format: "SSF",
                found: version,
            });
        }

        let table_offset = reader
            .read_u32::<LE>()
            .map_err(|_| FormatError::Truncated("SSF"))?;
        reader.set_position(table_offset as u64);

        let mut sounds = [NO_SOUND; SoundEvent::COUNT];
        for slot in sounds.iter_mut() {
            *slot = reader
                .read_u32::<LE>()
                .map_err(|_| FormatError::Truncated("SSF"))?;
        }

        Ok(Self { sounds })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(
            HEADER_SIZE as usize + (SoundEvent::COUNT + PADDING_SLOTS) * 4,
        );
        out.write_all(&SIGNATURE)?;
        out.write_all(&VERSION)?;
        out.write_u32::<LE>(HEADER_SIZE)?;
        for sound in &self.sounds {
            out.write_u32::<LE>(*sound)?;
        }
        for _ in 0..PADDING_SLOTS {
            out.write_u32::<LE>(NO_SOUND)?;
        }
        Ok(out)
    }

    /// The strref for an event, or `None` for an empty slot.
    pub fn get(&self, event: SoundEvent) -> Option<u32> {
        let value = self.sounds[event.slot()];
        (value != NO_SOUND).then_some(value)
    }

    pub fn set(&mut self, event: SoundEvent, strref: u32) {
        self.sounds[event.slot()] = strref;
    }

    pub fn clear(&mut self, event: SoundEvent) {
        self.sounds[event.slot()] = NO_SOUND;
    }
}
