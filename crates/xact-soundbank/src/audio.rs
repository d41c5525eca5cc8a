//! Boundary to the audio output subsystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stream::AudioStream;

/// Mixer category a sound is played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Music,
    #[default]
    Sfx,
    Voice,
    Video,
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SoundType::Music => "music",
            SoundType::Sfx => "sfx",
            SoundType::Voice => "voice",
            SoundType::Video => "video",
        })
    }
}

impl FromStr for SoundType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "music" => Ok(SoundType::Music),
            "sfx" => Ok(SoundType::Sfx),
            "voice" => Ok(SoundType::Voice),
            "video" => Ok(SoundType::Video),
            _ => Err(Error::Config(format!(
                "Unknown sound type '{}' (expected music, sfx, voice or video)",
                s
            ))),
        }
    }
}

/// Token for a playing sound, issued by an [`AudioSink`].
///
/// [`ChannelHandle::none`] stands for "nothing was played".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelHandle(u64);

impl ChannelHandle {
    /// A handle for channel `id`. Id `0` is reserved for [`ChannelHandle::none`].
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The "no playback" handle.
    pub const fn none() -> Self {
        Self(0)
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Receives streams to play.
pub trait AudioSink {
    /// Start playing `stream`, taking ownership of it.
    fn submit(&self, stream: Box<dyn AudioStream>, sound_type: SoundType) -> Result<ChannelHandle>;
}

impl<S: AudioSink + ?Sized> AudioSink for &S {
    fn submit(&self, stream: Box<dyn AudioStream>, sound_type: SoundType) -> Result<ChannelHandle> {
        (**self).submit(stream, sound_type)
    }
}
