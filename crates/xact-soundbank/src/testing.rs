//! Test doubles for resource providers and audio sinks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::audio::{AudioSink, ChannelHandle, SoundType};
use crate::encode::{encode_sound_bank, encode_wave_bank};
use crate::error::Result;
use crate::resource::{MemoryProvider, ResourceKind, ResourceProvider, ResourceReader};
use crate::stream::AudioStream;
use crate::types::SoundBankFile;
use crate::wavebank::WaveData;

/// Wraps a [`MemoryProvider`] and counts every `open` call.
#[derive(Debug, Default)]
pub struct CountingProvider {
    inner: MemoryProvider,
    opens: Mutex<HashMap<(String, ResourceKind), usize>>,
}

impl CountingProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            opens: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &MemoryProvider {
        &self.inner
    }

    /// How often `(name, kind)` was opened, found or not.
    pub fn opens(&self, name: &str, kind: ResourceKind) -> usize {
        self.opens
            .lock()
            .get(&(name.to_string(), kind))
            .copied()
            .unwrap_or(0)
    }
}

impl ResourceProvider for CountingProvider {
    fn open(&self, name: &str, kind: ResourceKind) -> Result<Option<ResourceReader>> {
        *self.opens.lock().entry((name.to_string(), kind)).or_insert(0) += 1;
        self.inner.open(name, kind)
    }
}

/// What a [`RecordingSink`] received.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub handle: ChannelHandle,
    pub sound_type: SoundType,
    pub channels: u16,
    pub sample_rate: u32,
    /// Samples drained from the stream, up to the sink's cap.
    pub samples: Vec<i16>,
    /// Whether the stream ended before the cap was reached.
    pub ended: bool,
}

/// An audio sink that drains and records every submitted stream.
#[derive(Debug)]
pub struct RecordingSink {
    cap: usize,
    next: AtomicU64,
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingSink {
    /// A sink reading at most `cap` samples per stream.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next: AtomicU64::new(1),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl AudioSink for RecordingSink {
    fn submit(&self, mut stream: Box<dyn AudioStream>, sound_type: SoundType) -> Result<ChannelHandle> {
        let mut samples = Vec::new();
        let mut buffer = [0i16; 64];
        while samples.len() < self.cap && !stream.end_of_data() {
            let want = buffer.len().min(self.cap - samples.len());
            let read = stream.read_samples(&mut buffer[..want]);
            samples.extend_from_slice(&buffer[..read]);
            if read < want {
                break;
            }
        }

        let handle = ChannelHandle::new(self.next.fetch_add(1, Ordering::Relaxed));
        self.submissions.lock().push(Submission {
            handle,
            sound_type,
            channels: stream.channels(),
            sample_rate: stream.sample_rate(),
            samples,
            ended: stream.end_of_data(),
        });
        Ok(handle)
    }
}

/// A provider holding `bank` in the binary encoding plus the given wave banks.
pub fn provider_with(bank: &SoundBankFile, wave_banks: &[(&str, Vec<WaveData>)]) -> MemoryProvider {
    let provider = MemoryProvider::new();
    provider.insert(
        bank.name().to_string(),
        ResourceKind::SoundBank,
        encode_sound_bank(bank).unwrap(),
    );
    for (name, waves) in wave_banks {
        provider.insert(*name, ResourceKind::WaveBank, encode_wave_bank(name, waves).unwrap());
    }
    provider
}
