//! Binary encoders for sound banks and wave banks.
//!
//! These write the encodings read by [`crate::parser::parse_sound_bank_binary`]
//! and the binary wave bank loader.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::events::{Event, FieldValue};
use crate::parser::{NO_WAVE_BANK, SOUND_BANK_MAGIC, SOUND_BANK_VERSION};
use crate::types::{Cue, Sound, SoundBankFile, Track};
use crate::wavebank::{WaveData, WAVE_BANK_MAGIC, WAVE_BANK_VERSION};

/// Encode a sound bank into the binary encoding.
pub fn encode_sound_bank(file: &SoundBankFile) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    buf.write_all(SOUND_BANK_MAGIC)?;
    buf.write_u16::<LittleEndian>(SOUND_BANK_VERSION)?;
    write_pstring(&mut buf, file.name())?;

    buf.write_u16::<LittleEndian>(count_u16(file.wave_banks().len(), "wave banks")?)?;
    for bank in file.wave_banks() {
        write_pstring(&mut buf, bank)?;
    }

    buf.write_u32::<LittleEndian>(count_u32(file.sounds().len(), "sounds")?)?;
    for sound in file.sounds() {
        encode_sound(&mut buf, file, sound)?;
    }

    buf.write_u32::<LittleEndian>(count_u32(file.cues().len(), "cues")?)?;
    for cue in file.cues() {
        encode_cue(&mut buf, cue)?;
    }

    Ok(buf)
}

/// Encode waves into the binary wave bank encoding, as 16-bit PCM.
pub fn encode_wave_bank(name: &str, waves: &[WaveData]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    buf.write_all(WAVE_BANK_MAGIC)?;
    buf.write_u16::<LittleEndian>(WAVE_BANK_VERSION)?;
    write_pstring(&mut buf, name)?;

    buf.write_u32::<LittleEndian>(count_u32(waves.len(), "waves")?)?;
    for wave in waves {
        buf.write_u16::<LittleEndian>(wave.channels)?;
        buf.write_u32::<LittleEndian>(wave.sample_rate)?;
        buf.write_u16::<LittleEndian>(16)?;

        let byte_len = wave.samples.len() * 2;
        buf.write_u32::<LittleEndian>(count_u32(byte_len, "wave data bytes")?)?;
        for &sample in wave.samples.iter() {
            buf.write_i16::<LittleEndian>(sample)?;
        }
    }

    Ok(buf)
}

fn encode_sound(buf: &mut Vec<u8>, file: &SoundBankFile, sound: &Sound) -> Result<()> {
    write_pstring(buf, &sound.name)?;
    buf.write_u8(sound.loop_count)?;

    buf.write_u16::<LittleEndian>(count_u16(sound.tracks.len(), "tracks")?)?;
    for track in &sound.tracks {
        encode_track(buf, file, track)?;
    }

    Ok(())
}

fn encode_track(buf: &mut Vec<u8>, file: &SoundBankFile, track: &Track) -> Result<()> {
    buf.write_u16::<LittleEndian>(count_u16(track.waves.len(), "waves")?)?;
    for wave in &track.waves {
        let bank_index = if wave.bank.is_empty() {
            NO_WAVE_BANK
        } else {
            let index = file
                .wave_bank_index(&wave.bank)
                .ok_or_else(|| Error::UnknownWaveBank(wave.bank.clone()))?;
            u16::try_from(index)
                .ok()
                .filter(|&index| index != NO_WAVE_BANK)
                .ok_or_else(|| Error::Parse("Too many wave banks".to_string()))?
        };

        buf.write_u16::<LittleEndian>(bank_index)?;
        buf.write_u32::<LittleEndian>(index_u32(wave.index, "Wave index")?)?;
    }

    buf.write_u16::<LittleEndian>(count_u16(track.events.len(), "events")?)?;
    for event in &track.events {
        encode_event(buf, event)?;
    }

    Ok(())
}

fn encode_event(buf: &mut Vec<u8>, event: &Event) -> Result<()> {
    buf.write_u8(event.kind().tag())?;

    for (_, value) in event.fields() {
        match value {
            FieldValue::Bool(value) => buf.write_u8(u8::from(value))?,
            FieldValue::Int(value) => buf.write_u32::<LittleEndian>(value)?,
            FieldValue::Float(value) => buf.write_f32::<LittleEndian>(value)?,
        }
    }

    Ok(())
}

fn encode_cue(buf: &mut Vec<u8>, cue: &Cue) -> Result<()> {
    write_pstring(buf, &cue.name)?;

    buf.write_u16::<LittleEndian>(count_u16(cue.variations.len(), "variations")?)?;
    for variation in &cue.variations {
        buf.write_u32::<LittleEndian>(variation.weight_min)?;
        buf.write_u32::<LittleEndian>(variation.weight_max)?;
        buf.write_u32::<LittleEndian>(index_u32(variation.sound_index, "Sound index")?)?;
    }

    Ok(())
}

/// Write a string as pstring (length as u8, then bytes).
fn write_pstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > 255 {
        return Err(Error::Parse(format!(
            "String too long for pstring: {} bytes",
            bytes.len()
        )));
    }
    buf.write_u8(bytes.len() as u8)?;
    buf.write_all(bytes)?;
    Ok(())
}

fn count_u16(value: usize, what: &str) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::Parse(format!("Too many {}: {}", what, value)))
}

fn count_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Parse(format!("Too many {}: {}", what, value)))
}

fn index_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Parse(format!("{} {} out of range", what, value)))
}
