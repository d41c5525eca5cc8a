//! Text wave bank encoding (`<name>_xwb`).
//!
//! ```text
//! <wavebank> name=footsteps
//! <wave> file=step_grass_01
//! <wave> file=step_grass_02
//! ```
//!
//! Every `file` is opened as a [`ResourceKind::Wave`] and decoded as WAV.

use std::io::Read;

use log::debug;

use crate::error::{Error, Result, ResultExt};
use crate::parser::{read_sections, read_text};
use crate::resource::{ResourceKind, ResourceProvider};

use super::{WaveBank, WaveData};

/// Parse a text wave bank, loading its WAV files through `provider`.
pub fn parse_wave_bank_text<R: Read + ?Sized>(
    provider: &dyn ResourceProvider,
    reader: &mut R,
) -> Result<WaveBank> {
    let content = read_text(reader)?;

    let mut name: Option<String> = None;
    let mut waves = Vec::new();

    for section in read_sections(&content)? {
        match section.header.as_str() {
            "wavebank" => {
                section.ignore_unknown(&["name"]);
                name = Some(section.require("name")?);
            }
            "wave" => {
                section.ignore_unknown(&["file"]);
                let file: String = section.require("file")?;
                let wave = load_wave(provider, &file)
                    .with_context(|| format!("Wave at line {}", section.line))?;
                waves.push(wave);
            }
            other => return Err(section.error(format!("Unknown section <{}>", other))),
        }
    }

    let name = name.ok_or_else(|| Error::Parse("Missing <wavebank> section".to_string()))?;
    Ok(WaveBank::new(name, waves))
}

fn load_wave(provider: &dyn ResourceProvider, file: &str) -> Result<WaveData> {
    let reader = provider
        .open(file, ResourceKind::Wave)?
        .ok_or_else(|| Error::NotFound {
            what: "wave",
            name: file.to_string(),
        })?;

    decode_wav(reader)
}

/// Decode a WAV stream to 16-bit PCM.
pub fn decode_wav<R: Read>(reader: R) -> Result<WaveData> {
    let wav_reader = hound::WavReader::new(reader)?;
    let spec = wav_reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Float => wav_reader
            .into_samples::<f32>()
            .map(|s| s.map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let bits = u32::from(spec.bits_per_sample);
            wav_reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| widen_to_16_bits(s, bits)))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    debug!(
        "Decoded WAV: {} channels, {} Hz, {}-bit, {} samples",
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        samples.len()
    );

    Ok(WaveData::new(spec.channels, spec.sample_rate, samples))
}

fn widen_to_16_bits(sample: i32, bits: u32) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}
