//! XACT sound bank support.
//!
//! This crate loads XACT sound banks and turns cue requests into audio
//! streams:
//! - Binary (`.xsb`) and text (`_xsb`) sound bank parsing into one model
//! - Lazily loaded, cached wave banks (`.xwb` or `_xwb` listing WAV files)
//! - Cue → variation → sound → track → wave resolution with loop handling
//! - A binary encoder for sound banks and wave banks
//!
//! # Architecture
//!
//! The crate is independent of any audio backend. Resources are opened
//! through a [`ResourceProvider`] and finished streams are handed to an
//! [`AudioSink`]; both are supplied by the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xact_soundbank::{DirectoryProvider, SoundBank, SoundType};
//!
//! let provider = Arc::new(DirectoryProvider::new(vec!["data/sound".into()]));
//! let bank = SoundBank::load(provider, "menu")?;
//!
//! // `sink` is your audio backend
//! let handle = bank.play_cue_named("click", 0, SoundType::Sfx, &sink)?;
//! ```

pub mod audio;
pub mod bank;
pub mod config;
pub mod encode;
pub mod error;
pub mod events;
pub mod parser;
pub mod player;
pub mod resource;
pub mod stream;
pub mod types;
pub mod wavebank;

#[cfg(test)]
mod testing;

pub use audio::{AudioSink, ChannelHandle, SoundType};
pub use bank::{BankFormat, SoundBank};
pub use config::{Extensions, ResourceConfig};
pub use encode::{encode_sound_bank, encode_wave_bank};
pub use error::{Error, ErrorKind, Result, ResultExt, Table};
pub use events::{Event, EventKind, MIX_BIN_COUNT};
pub use player::{effective_loops, CueRef, PlaybackPlan};
pub use resource::{
    DirectoryProvider, MemoryProvider, ResourceKind, ResourceProvider, ResourceReader,
};
pub use stream::{AudioStream, LoopingStream, PcmStream};
pub use types::{
    Cue, Loops, Sound, SoundBankFile, Track, Variation, WaveVariation, LOOP_COUNT_INFINITE,
};
pub use wavebank::{WaveBank, WaveBankRegistry, WaveData};
