//! Binary wave bank encoding (`.xwb`).

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::parser::{read_header, read_pstring};

use super::{WaveBank, WaveData};

/// Magic bytes of a binary wave bank.
pub const WAVE_BANK_MAGIC: &[u8; 4] = b"WBND";

/// The only supported binary wave bank version.
pub const WAVE_BANK_VERSION: u16 = 1;

const MAX_CHANNELS: u16 = 8;

/// Parse a binary wave bank.
pub fn parse_wave_bank_binary<R: Read>(reader: &mut R) -> Result<WaveBank> {
    read_header(reader, WAVE_BANK_MAGIC, WAVE_BANK_VERSION)?;

    let name = read_pstring(reader)?;
    let count = reader.read_u32::<LittleEndian>()?;

    let mut waves = Vec::new();
    for index in 0..count {
        waves.push(read_wave(reader, index)?);
    }

    Ok(WaveBank::new(name, waves))
}

fn read_wave<R: Read>(reader: &mut R, index: u32) -> Result<WaveData> {
    let channels = reader.read_u16::<LittleEndian>()?;
    let sample_rate = reader.read_u32::<LittleEndian>()?;
    let bits = reader.read_u16::<LittleEndian>()?;
    let length = reader.read_u32::<LittleEndian>()? as usize;

    if channels == 0 || channels > MAX_CHANNELS {
        return Err(Error::Parse(format!(
            "Wave {}: unsupported channel count {}",
            index, channels
        )));
    }
    if sample_rate == 0 {
        return Err(Error::Parse(format!("Wave {}: sample rate is zero", index)));
    }

    let mut data = Vec::new();
    reader.by_ref().take(length as u64).read_to_end(&mut data)?;
    if data.len() != length {
        return Err(Error::Parse(format!(
            "Wave {}: expected {} bytes of data, found {}",
            index,
            length,
            data.len()
        )));
    }

    let samples: Vec<i16> = match bits {
        // 8-bit PCM is unsigned.
        8 => data.iter().map(|&b| (i16::from(b) - 128) << 8).collect(),
        16 => {
            if length % 2 != 0 {
                return Err(Error::Parse(format!(
                    "Wave {}: odd data length {} for 16-bit samples",
                    index, length
                )));
            }
            data.chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect()
        }
        other => {
            return Err(Error::Parse(format!(
                "Wave {}: unsupported bits per sample {}",
                index, other
            )))
        }
    };

    Ok(WaveData::new(channels, sample_rate, samples))
}
