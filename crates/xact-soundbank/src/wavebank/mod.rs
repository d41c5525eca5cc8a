//! Wave banks: containers of raw PCM waves addressed by index.
//!
//! A wave bank is stored either in the binary encoding (`<name>.xwb`, PCM
//! embedded) or as a text listing (`<name>_xwb`) of WAV resources.

use std::sync::Arc;

use log::info;

use crate::error::{Error, Result, ResultExt, Table};
use crate::resource::{ResourceKind, ResourceProvider};
use crate::stream::{AudioStream, PcmStream};

mod binary;
mod registry;
mod text;

pub use binary::{parse_wave_bank_binary, WAVE_BANK_MAGIC, WAVE_BANK_VERSION};
pub use registry::WaveBankRegistry;
pub use text::parse_wave_bank_text;

/// One decoded wave: interleaved 16-bit PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveData {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<[i16]>,
}

impl WaveData {
    pub fn new(channels: u16, sample_rate: u32, samples: impl Into<Arc<[i16]>>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }
}

/// How a wave bank was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveBankFormat {
    Binary,
    Text,
}

/// A loaded wave bank.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveBank {
    name: String,
    waves: Vec<WaveData>,
}

impl WaveBank {
    pub fn new(name: impl Into<String>, waves: Vec<WaveData>) -> Self {
        Self {
            name: name.into(),
            waves,
        }
    }

    /// Load a wave bank, preferring the binary encoding.
    pub fn load(provider: &dyn ResourceProvider, name: &str) -> Result<Self> {
        Self::load_inner(provider, name)
            .with_context(|| format!("Failed loading XACT wave bank \"{}\"", name))
    }

    fn load_inner(provider: &dyn ResourceProvider, name: &str) -> Result<Self> {
        let (bank, format) =
            if let Some(mut reader) = provider.open(name, ResourceKind::WaveBank)? {
                (parse_wave_bank_binary(&mut reader)?, WaveBankFormat::Binary)
            } else if let Some(mut reader) =
                provider.open(&format!("{}_xwb", name), ResourceKind::WaveBankText)?
            {
                (
                    parse_wave_bank_text(provider, &mut reader)?,
                    WaveBankFormat::Text,
                )
            } else {
                return Err(Error::NotFound {
                    what: "wave bank",
                    name: name.to_string(),
                });
            };

        info!(
            "Loaded wave bank '{}' ({:?}, {} waves)",
            name,
            format,
            bank.len()
        );
        Ok(bank)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waves(&self) -> &[WaveData] {
        &self.waves
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// A fresh stream over wave `index`.
    ///
    /// Every call returns a new stream with its own read position.
    pub fn wave(&self, index: usize) -> Result<Box<dyn AudioStream>> {
        let wave = self.waves.get(index).ok_or(Error::IndexOutOfRange {
            table: Table::Wave,
            index,
            len: self.waves.len(),
        })?;

        Ok(Box::new(PcmStream::new(
            Arc::clone(&wave.samples),
            wave.channels,
            wave.sample_rate,
        )))
    }
}
