//! Parser for the binary sound bank encoding (`.xsb`).
//!
//! All integers are little-endian. Strings are stored as a `u8` length
//! followed by UTF-8 bytes.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, FieldMut};
use crate::types::{Cue, Sound, SoundBankFile, Track, Variation, WaveVariation};

/// Magic bytes of a binary sound bank.
pub const SOUND_BANK_MAGIC: &[u8; 4] = b"SDBK";

/// The only supported binary sound bank version.
pub const SOUND_BANK_VERSION: u16 = 1;

/// Wave bank table index meaning "no wave".
pub const NO_WAVE_BANK: u16 = 0xFFFF;

/// Parse a binary sound bank.
pub fn parse_sound_bank_binary<R: Read>(reader: &mut R) -> Result<SoundBankFile> {
    read_header(reader, SOUND_BANK_MAGIC, SOUND_BANK_VERSION)?;

    let name = read_pstring(reader)?;

    let wave_bank_count = reader.read_u16::<LittleEndian>()?;
    let mut wave_banks = Vec::new();
    for _ in 0..wave_bank_count {
        wave_banks.push(read_pstring(reader)?);
    }

    let sound_count = reader.read_u32::<LittleEndian>()?;
    let mut sounds = Vec::new();
    for _ in 0..sound_count {
        sounds.push(read_sound(reader, &wave_banks)?);
    }

    let cue_count = reader.read_u32::<LittleEndian>()?;
    let mut cues = Vec::new();
    for _ in 0..cue_count {
        cues.push(read_cue(reader)?);
    }

    SoundBankFile::new(name, wave_banks, sounds, cues)
}

/// Check the magic bytes and version of a binary resource.
pub(crate) fn read_header<R: Read>(reader: &mut R, magic: &[u8; 4], version: u16) -> Result<()> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;
    if &found != magic {
        return Err(Error::Parse(format!(
            "Bad magic {:?}, expected {:?}",
            String::from_utf8_lossy(&found),
            String::from_utf8_lossy(magic)
        )));
    }

    let found_version = reader.read_u16::<LittleEndian>()?;
    if found_version != version {
        return Err(Error::Parse(format!(
            "Unsupported version {}",
            found_version
        )));
    }

    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub(crate) fn read_pstring<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u8()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| Error::Parse(format!("Invalid UTF-8 string: {}", e)))
}

fn read_sound<R: Read>(reader: &mut R, wave_banks: &[String]) -> Result<Sound> {
    let name = read_pstring(reader)?;
    let loop_count = reader.read_u8()?;

    let track_count = reader.read_u16::<LittleEndian>()?;
    let mut tracks = Vec::new();
    for _ in 0..track_count {
        tracks.push(read_track(reader, wave_banks)?);
    }

    Ok(Sound {
        name,
        loop_count,
        tracks,
    })
}

fn read_track<R: Read>(reader: &mut R, wave_banks: &[String]) -> Result<Track> {
    let mut track = Track::default();

    let wave_count = reader.read_u16::<LittleEndian>()?;
    for _ in 0..wave_count {
        let bank_index = reader.read_u16::<LittleEndian>()?;
        let index = reader.read_u32::<LittleEndian>()? as usize;

        let bank = if bank_index == NO_WAVE_BANK {
            String::new()
        } else {
            wave_banks
                .get(bank_index as usize)
                .cloned()
                .ok_or_else(|| {
                    Error::Parse(format!(
                        "Wave bank index {} out of range ({} wave banks)",
                        bank_index,
                        wave_banks.len()
                    ))
                })?
        };

        track.waves.push(WaveVariation { bank, index });
    }

    let event_count = reader.read_u16::<LittleEndian>()?;
    for _ in 0..event_count {
        track.events.push(read_event(reader)?);
    }

    Ok(track)
}

fn read_event<R: Read>(reader: &mut R) -> Result<Event> {
    let tag = reader.read_u8()?;
    let kind = EventKind::from_tag(tag)
        .ok_or_else(|| Error::Parse(format!("Unknown event type {}", tag)))?;

    let mut event = Event::new(kind);
    for (_, field) in event.fields_mut() {
        match field {
            FieldMut::Bool(value) => *value = reader.read_u8()? != 0,
            FieldMut::Int(value) => *value = reader.read_u32::<LittleEndian>()?,
            FieldMut::Float(value) => *value = reader.read_f32::<LittleEndian>()?,
        }
    }

    Ok(event)
}

fn read_cue<R: Read>(reader: &mut R) -> Result<Cue> {
    let name = read_pstring(reader)?;

    let variation_count = reader.read_u16::<LittleEndian>()?;
    let mut variations = Vec::new();
    for _ in 0..variation_count {
        variations.push(Variation {
            weight_min: reader.read_u32::<LittleEndian>()?,
            weight_max: reader.read_u32::<LittleEndian>()?,
            sound_index: reader.read_u32::<LittleEndian>()? as usize,
        });
    }

    Ok(Cue { name, variations })
}
