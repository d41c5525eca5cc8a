//! Sound bank type definitions.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::events::Event;

/// Sound loop count meaning "loop forever".
pub const LOOP_COUNT_INFINITE: u8 = 255;

/// How many times a wave is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Loops {
    /// Play `n` times in total (`n >= 1`).
    Times(u32),
    /// Repeat indefinitely.
    Forever,
}

impl Loops {
    /// Effective loops for a sound-level loop count.
    pub fn from_sound_count(count: u8) -> Self {
        if count == LOOP_COUNT_INFINITE {
            Loops::Forever
        } else {
            Loops::Times(u32::from(count) + 1)
        }
    }

    /// Effective loops for a loop event count, where `0` loops forever.
    pub fn from_event_count(count: u32) -> Self {
        if count == 0 {
            Loops::Forever
        } else {
            Loops::Times(count.saturating_add(1))
        }
    }

    /// Whether the wave plays exactly once.
    pub fn is_single(&self) -> bool {
        *self == Loops::Times(1)
    }
}

impl fmt::Display for Loops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loops::Times(n) => write!(f, "{}x", n),
            Loops::Forever => f.write_str("forever"),
        }
    }
}

/// Reference to one wave inside a named wave bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveVariation {
    /// Wave bank name. Empty when the track plays nothing.
    pub bank: String,
    /// Index of the wave within the bank.
    pub index: usize,
}

/// A playable layer of a sound.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Track {
    /// Candidate waves. Only the first one is played.
    pub waves: Vec<WaveVariation>,
    /// Events modifying playback of this track.
    pub events: Vec<Event>,
}

/// A sound: tracks plus a bank-level loop count.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Sound {
    /// Sound name, may be empty.
    pub name: String,
    /// Number of additional plays, or [`LOOP_COUNT_INFINITE`].
    pub loop_count: u8,
    /// Tracks of this sound. Only the first one is played.
    pub tracks: Vec<Track>,
}

impl Sound {
    /// Effective loops of this sound, before track overrides.
    pub fn loops(&self) -> Loops {
        Loops::from_sound_count(self.loop_count)
    }
}

/// A weight range of a cue pointing at one sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Variation {
    /// Lower bound of the weight range (inclusive).
    pub weight_min: u32,
    /// Upper bound of the weight range (inclusive).
    pub weight_max: u32,
    /// Index into the sound table.
    pub sound_index: usize,
}

impl Variation {
    /// Whether the weight range contains `value`.
    pub fn contains(&self, value: u32) -> bool {
        value >= self.weight_min && value <= self.weight_max
    }
}

/// A named entry point selecting among weighted variations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cue {
    /// Cue name, unique within its bank.
    pub name: String,
    /// Variations in declared order.
    pub variations: Vec<Variation>,
}

impl Cue {
    /// The first variation, in declared order, whose range contains `value`.
    pub fn select(&self, value: u32) -> Option<&Variation> {
        self.variations.iter().find(|variation| variation.contains(value))
    }
}

/// The logical contents of a sound bank, as produced by either parser.
///
/// The tables are read-only once assembled; the name indices are built in
/// [`SoundBankFile::new`] and stay in step with them. Use
/// [`SoundBankFile::into_parts`] to edit a bank and assemble it again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundBankFile {
    name: String,
    wave_banks: Vec<String>,
    sounds: Vec<Sound>,
    cues: Vec<Cue>,
    #[serde(skip)]
    cue_map: HashMap<String, usize>,
    #[serde(skip)]
    wave_bank_map: HashMap<String, usize>,
}

impl SoundBankFile {
    /// Assemble a bank from its tables.
    ///
    /// Fails if two cues or two wave banks share a name.
    pub fn new(
        name: String,
        wave_banks: Vec<String>,
        sounds: Vec<Sound>,
        cues: Vec<Cue>,
    ) -> Result<Self> {
        let mut cue_map = HashMap::with_capacity(cues.len());
        for (index, cue) in cues.iter().enumerate() {
            if cue_map.insert(cue.name.clone(), index).is_some() {
                return Err(Error::Parse(format!("Duplicate cue \"{}\"", cue.name)));
            }
        }

        let mut wave_bank_map = HashMap::with_capacity(wave_banks.len());
        for (index, bank) in wave_banks.iter().enumerate() {
            if wave_bank_map.insert(bank.clone(), index).is_some() {
                return Err(Error::Parse(format!("Duplicate wave bank \"{}\"", bank)));
            }
        }

        Ok(Self {
            name,
            wave_banks,
            sounds,
            cues,
            cue_map,
            wave_bank_map,
        })
    }

    /// Bank name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wave banks referenced by this bank, in declaration order.
    pub fn wave_banks(&self) -> &[String] {
        &self.wave_banks
    }

    /// Sound table.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// Cue table.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Split into name, wave bank names, sounds and cues.
    pub fn into_parts(self) -> (String, Vec<String>, Vec<Sound>, Vec<Cue>) {
        (self.name, self.wave_banks, self.sounds, self.cues)
    }

    /// Look up a cue index by name.
    pub fn cue_index(&self, name: &str) -> Option<usize> {
        self.cue_map.get(name).copied()
    }

    /// Look up a cue by name.
    pub fn cue_by_name(&self, name: &str) -> Option<&Cue> {
        self.cue_index(name).and_then(|index| self.cues.get(index))
    }

    /// Look up a wave bank's position in the name table.
    pub fn wave_bank_index(&self, name: &str) -> Option<usize> {
        self.wave_bank_map.get(name).copied()
    }

    /// Get a human-readable info string.
    pub fn info(&self) -> String {
        format!(
            "XACT sound bank '{}': {} cues, {} sounds, {} wave banks",
            self.name,
            self.cues.len(),
            self.sounds.len(),
            self.wave_banks.len()
        )
    }
}
