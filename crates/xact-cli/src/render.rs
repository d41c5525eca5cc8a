//! Offline rendering of cues to WAV files.
//!
//! [`WavSink`] plays the role of the audio backend: it drains whatever
//! stream the sound bank submits into a 16-bit WAV file, stopping after a
//! configurable length so that looping cues terminate.

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use xact_soundbank::{AudioSink, AudioStream, ChannelHandle, Error, Result, SoundType};

/// Summary of a rendered stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub channels: u16,
    pub sample_rate: u32,
    pub frames: u64,
    /// Whether the stream ran out before the length limit.
    pub complete: bool,
}

impl RenderStats {
    pub fn seconds(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// An audio sink writing the submitted stream to a WAV file.
pub struct WavSink {
    path: PathBuf,
    max_seconds: f64,
    rendered: Cell<Option<RenderStats>>,
}

impl WavSink {
    pub fn new(path: impl Into<PathBuf>, max_seconds: f64) -> Self {
        Self {
            path: path.into(),
            max_seconds,
            rendered: Cell::new(None),
        }
    }

    /// Statistics of the last rendered stream, if any.
    pub fn rendered(&self) -> Option<RenderStats> {
        self.rendered.get()
    }

    fn write(&self, stream: &mut dyn AudioStream) -> Result<RenderStats> {
        let channels = stream.channels();
        let sample_rate = stream.sample_rate();
        if channels == 0 || sample_rate == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Stream has {} channels at {} Hz", channels, sample_rate),
            )));
        }

        let max_frames = (self.max_seconds * sample_rate as f64) as u64;
        let max_samples = max_frames.saturating_mul(u64::from(channels));
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&self.path, spec)?;

        let mut buffer = vec![0i16; 4096 * channels as usize];
        let mut written = 0u64;
        while written < max_samples && !stream.end_of_data() {
            let left = usize::try_from(max_samples - written).unwrap_or(usize::MAX);
            let want = buffer.len().min(left);
            let read = stream.read_samples(&mut buffer[..want]);
            for &sample in &buffer[..read] {
                writer.write_sample(sample)?;
            }
            written += read as u64;
            if read < want {
                break;
            }
        }
        writer.finalize()?;

        Ok(RenderStats {
            channels,
            sample_rate,
            frames: written / u64::from(channels),
            complete: stream.end_of_data(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSink for WavSink {
    fn submit(
        &self,
        mut stream: Box<dyn AudioStream>,
        sound_type: SoundType,
    ) -> Result<ChannelHandle> {
        log::debug!("Rendering {} stream to {}", sound_type, self.path.display());
        let stats = self.write(stream.as_mut())?;
        self.rendered.set(Some(stats));
        Ok(ChannelHandle::new(1))
    }
}
