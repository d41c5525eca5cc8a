//! Raw audio streams handed to the audio backend.

use std::sync::Arc;

use crate::types::Loops;

/// A readable, rewindable stream of interleaved 16-bit PCM samples.
pub trait AudioStream: Send {
    /// Fill `buffer` with interleaved samples, returning how many were written.
    ///
    /// Returns less than `buffer.len()` only when the end of the data is reached.
    fn read_samples(&mut self, buffer: &mut [i16]) -> usize;

    /// Number of interleaved channels.
    fn channels(&self) -> u16;

    /// Sampling rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Whether all samples have been read.
    fn end_of_data(&self) -> bool;

    /// Seek back to the first sample. Returns `false` if that is not possible.
    fn rewind(&mut self) -> bool;
}

/// A stream over PCM data held in memory.
///
/// The sample data is shared between streams of the same wave, the read
/// position is not.
#[derive(Debug, Clone)]
pub struct PcmStream {
    samples: Arc<[i16]>,
    channels: u16,
    sample_rate: u32,
    position: usize,
}

impl PcmStream {
    /// Create a stream positioned at the first sample.
    pub fn new(samples: Arc<[i16]>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
            position: 0,
        }
    }

    /// Total number of interleaved samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the stream holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioStream for PcmStream {
    fn read_samples(&mut self, buffer: &mut [i16]) -> usize {
        let remaining = &self.samples[self.position..];
        let count = remaining.len().min(buffer.len());
        buffer[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        count
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn end_of_data(&self) -> bool {
        self.position >= self.samples.len()
    }

    fn rewind(&mut self) -> bool {
        self.position = 0;
        true
    }
}

/// Decorator replaying another stream a number of times, or forever.
pub struct LoopingStream {
    inner: Box<dyn AudioStream>,
    loops: Loops,
    completed: u32,
    finished: bool,
}

impl LoopingStream {
    /// Wrap `inner`, playing it according to `loops`.
    pub fn new(inner: Box<dyn AudioStream>, loops: Loops) -> Self {
        Self {
            inner,
            loops,
            completed: 0,
            finished: false,
        }
    }

    /// The loop setting of this stream.
    pub fn loops(&self) -> Loops {
        self.loops
    }

    /// Number of passes through the inner stream completed so far.
    pub fn completed_loops(&self) -> u32 {
        self.completed
    }

    fn has_pass_left(&self) -> bool {
        match self.loops {
            Loops::Forever => true,
            Loops::Times(n) => self.completed < n,
        }
    }
}

impl AudioStream for LoopingStream {
    fn read_samples(&mut self, buffer: &mut [i16]) -> usize {
        let mut written = 0;
        // Passes that produced nothing; an empty inner stream must not spin.
        let mut empty_passes = 0;

        while written < buffer.len() && !self.finished {
            let read = self.inner.read_samples(&mut buffer[written..]);
            written += read;

            if read > 0 {
                empty_passes = 0;
            }

            if !self.inner.end_of_data() {
                continue;
            }

            self.completed = self.completed.saturating_add(1);
            if read == 0 {
                empty_passes += 1;
            }

            if !self.has_pass_left() || empty_passes > 1 || !self.inner.rewind() {
                self.finished = true;
            }
        }

        written
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn end_of_data(&self) -> bool {
        self.finished
    }

    fn rewind(&mut self) -> bool {
        if !self.inner.rewind() {
            return false;
        }
        self.completed = 0;
        self.finished = false;
        true
    }
}
