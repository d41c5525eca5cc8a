//! Cue resolution and playback dispatch.
//!
//! Playing a cue walks cue → variation → sound → track → wave: the first
//! variation whose weight range contains the query picks a sound, the first
//! track of that sound picks a wave, and the wave is streamed from its wave
//! bank. The walk never backtracks; the first failure aborts it.
//!
//! Sounds with several tracks and tracks with several waves are played with
//! only the first one and a warning. A sound without tracks, a track without
//! waves and a wave without a bank play nothing and return
//! [`ChannelHandle::none`].

use std::fmt;

use log::{debug, warn};
use serde::Serialize;

use crate::audio::{AudioSink, ChannelHandle, SoundType};
use crate::bank::SoundBank;
use crate::error::{Error, Result, ResultExt, Table};
use crate::events::Event;
use crate::stream::{AudioStream, LoopingStream};
use crate::types::{Cue, Loops, Sound, Track, WaveVariation};

/// A cue addressed by index or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for CueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CueRef::Index(index) => write!(f, "{}", index),
            CueRef::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

impl From<usize> for CueRef {
    fn from(index: usize) -> Self {
        CueRef::Index(index)
    }
}

impl From<&str> for CueRef {
    fn from(name: &str) -> Self {
        CueRef::Name(name.to_string())
    }
}

impl From<String> for CueRef {
    fn from(name: String) -> Self {
        CueRef::Name(name)
    }
}

/// The outcome of resolving a cue without playing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackPlan {
    /// Index into the sound table.
    pub sound_index: usize,
    pub wave_bank: String,
    pub wave_index: usize,
    pub loops: Loops,
}

/// Effective loops of a track: the sound's loop count, overridden by the
/// track's last loop event.
pub fn effective_loops(sound: &Sound, track: &Track) -> Loops {
    track
        .events
        .iter()
        .filter_map(|event| match event {
            Event::Loop(params) => Some(Loops::from_event_count(params.count)),
            _ => None,
        })
        .last()
        .unwrap_or_else(|| sound.loops())
}

impl SoundBank {
    /// Play the cue at `index`.
    pub fn play_cue_at(
        &self,
        index: usize,
        variation: u32,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        self.play_cue(&CueRef::Index(index), variation, sound_type, sink)
    }

    /// Play the cue called `name`.
    pub fn play_cue_named(
        &self,
        name: &str,
        variation: u32,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        self.play_cue(&CueRef::from(name), variation, sound_type, sink)
    }

    /// Play a cue, selecting the variation whose weight range contains
    /// `variation`.
    pub fn play_cue(
        &self,
        cue: &CueRef,
        variation: u32,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        self.lookup_cue(cue)
            .and_then(|found| self.play_variation(found, variation, sound_type, sink))
            .with_context(|| self.cue_context(cue))
    }

    /// Resolve a cue down to its wave without loading or playing anything.
    ///
    /// Returns `None` where playback would return [`ChannelHandle::none`].
    /// Wave indices are not checked, since that needs the wave bank.
    pub fn resolve_cue(&self, cue: &CueRef, variation: u32) -> Result<Option<PlaybackPlan>> {
        self.resolve_inner(cue, variation)
            .with_context(|| self.cue_context(cue))
    }

    fn resolve_inner(&self, cue: &CueRef, variation: u32) -> Result<Option<PlaybackPlan>> {
        let found = self.lookup_cue(cue)?;
        let (sound_index, sound) = self.select_sound(found, variation)?;

        let Some(track) = first_track(sound) else {
            return Ok(None);
        };
        let Some(wave) = first_wave(track) else {
            return Ok(None);
        };

        if !self.registry().contains(&wave.bank) {
            return Err(Error::UnknownWaveBank(wave.bank.clone()));
        }

        Ok(Some(PlaybackPlan {
            sound_index,
            wave_bank: wave.bank.clone(),
            wave_index: wave.index,
            loops: effective_loops(sound, track),
        }))
    }

    /// Play the variation of `cue` whose weight range contains `variation`.
    pub fn play_variation(
        &self,
        cue: &Cue,
        variation: u32,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        let (_, sound) = self.select_sound(cue, variation)?;
        self.play_sound(sound, sound_type, sink)
    }

    /// Play the first track of `sound`.
    pub fn play_sound(
        &self,
        sound: &Sound,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        match first_track(sound) {
            Some(track) => self.play_track(track, sound, sound_type, sink),
            None => Ok(ChannelHandle::none()),
        }
    }

    /// Play the first wave of `track`, looped as `sound` and the track's
    /// loop events dictate.
    pub fn play_track(
        &self,
        track: &Track,
        sound: &Sound,
        sound_type: SoundType,
        sink: &dyn AudioSink,
    ) -> Result<ChannelHandle> {
        let Some(wave) = first_wave(track) else {
            return Ok(ChannelHandle::none());
        };

        let bank = self.wave_bank(&wave.bank)?;
        let stream = bank.wave(wave.index)?;

        let loops = effective_loops(sound, track);
        let stream: Box<dyn AudioStream> = if loops.is_single() {
            stream
        } else {
            Box::new(LoopingStream::new(stream, loops))
        };

        let handle = sink.submit(stream, sound_type)?;
        debug!(
            "Playing wave {} of '{}' ({}, {}) on channel {}",
            wave.index, wave.bank, sound_type, loops, handle
        );
        Ok(handle)
    }

    fn lookup_cue(&self, cue: &CueRef) -> Result<&Cue> {
        match cue {
            CueRef::Index(index) => self.cue(*index).ok_or(Error::IndexOutOfRange {
                table: Table::Cue,
                index: *index,
                len: self.cues().len(),
            }),
            CueRef::Name(name) => self
                .cue_by_name(name)
                .ok_or_else(|| Error::UnknownCue(name.clone())),
        }
    }

    fn select_sound(&self, cue: &Cue, variation: u32) -> Result<(usize, &Sound)> {
        let selected = cue
            .select(variation)
            .ok_or(Error::NoMatchingVariation(variation))?;

        let sounds = self.sounds();
        let sound = sounds
            .get(selected.sound_index)
            .ok_or(Error::IndexOutOfRange {
                table: Table::Sound,
                index: selected.sound_index,
                len: sounds.len(),
            })?;

        Ok((selected.sound_index, sound))
    }

    fn cue_context(&self, cue: &CueRef) -> String {
        format!("Failed playing cue {} of sound bank \"{}\"", cue, self.name())
    }
}

fn first_track(sound: &Sound) -> Option<&Track> {
    if sound.tracks.len() > 1 {
        warn!(
            "Sound '{}' has {} tracks; only the first one is played",
            sound.name,
            sound.tracks.len()
        );
    }
    sound.tracks.first()
}

fn first_wave(track: &Track) -> Option<&WaveVariation> {
    if track.waves.len() > 1 {
        warn!(
            "Track has {} wave variations; only the first one is played",
            track.waves.len()
        );
    }

    let wave = track.waves.first()?;
    if wave.bank.is_empty() {
        debug!("Wave variation without a wave bank, nothing to play");
        return None;
    }
    Some(wave)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::ErrorKind;
    use crate::parser::parse_sound_bank_text;
    use crate::resource::{MemoryProvider, ResourceKind};
    use crate::testing::{provider_with, CountingProvider, RecordingSink};
    use crate::types::{SoundBankFile, Variation};
    use crate::wavebank::WaveData;

    const BANK: &str = "\
<soundbank> name=game
<wavebank> name=sfx
<wavebank> name=music

// 0: plays once
<sound> name=click
<track>
<wave> bank=sfx index=0

// 1: sound loop count 3, no loop event
<sound> name=alarm loop_count=3
<track>
<wave> bank=sfx index=1

// 2: loop event 0 overrides
<sound> name=theme loop_count=1
<track>
<wave> bank=music index=0
<event> type=volume volume_start=-6
<event> type=loop count=0

// 3: no tracks
<sound> name=silence

// 4: empty bank name
<sound> name=placeholder
<track>
<wave> bank= index=0

// 5: several tracks and waves
<sound> name=layered
<track>
<wave> bank=sfx index=1
<wave> bank=sfx index=0
<track>
<wave> bank=music index=0

// 6: wave index out of range
<sound> name=broken
<track>
<wave> bank=sfx index=9

// 7: last loop event wins
<sound> name=steps loop_count=infinite
<track>
<wave> bank=sfx index=0
<event> type=loop count=0
<event> type=loop count=1

<cue> name=click
<variation> weight_min=0 weight_max=4 sound=0
<variation> weight_min=5 weight_max=9 sound=1
<cue> name=alarm
<variation> weight_min=0 weight_max=0 sound=1
<cue> name=theme
<variation> weight_min=0 weight_max=0 sound=2
<cue> name=silence
<variation> weight_min=0 weight_max=0 sound=3
<cue> name=placeholder
<variation> weight_min=0 weight_max=0 sound=4
<cue> name=layered
<variation> weight_min=0 weight_max=0 sound=5
<cue> name=broken
<variation> weight_min=0 weight_max=0 sound=6
<cue> name=steps
<variation> weight_min=0 weight_max=0 sound=7
<cue> name=dangling
<variation> weight_min=0 weight_max=0 sound=42
";

    fn waves() -> Vec<(&'static str, Vec<WaveData>)> {
        vec![
            (
                "sfx",
                vec![
                    WaveData::new(1, 8000, vec![1i16, 2, 3]),
                    WaveData::new(1, 8000, vec![10i16, 20]),
                ],
            ),
            ("music", vec![WaveData::new(2, 44100, vec![7i16, -7])]),
        ]
    }

    fn setup() -> (SoundBank, Arc<CountingProvider>) {
        let file = parse_sound_bank_text(BANK).unwrap();
        let provider = Arc::new(CountingProvider::new(provider_with(&file, &waves())));
        let bank = SoundBank::load(provider.clone(), "game").unwrap();
        (bank, provider)
    }

    #[test]
    fn test_variation_selection() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        bank.play_cue_named("click", 3, SoundType::Sfx, &sink).unwrap();
        bank.play_cue_named("click", 7, SoundType::Sfx, &sink).unwrap();

        let submissions = sink.submissions();
        assert_eq!(submissions[0].samples, [1, 2, 3]);
        assert_eq!(submissions[1].samples.len(), 2 * 4);

        let err = bank
            .play_cue_named("click", 12, SoundType::Sfx, &sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVariation);
        assert_eq!(sink.submissions().len(), 2);
    }

    #[test]
    fn test_single_play_is_not_wrapped() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        let handle = bank.play_cue_at(0, 0, SoundType::Voice, &sink).unwrap();

        let submission = &sink.submissions()[0];
        assert_eq!(submission.handle, handle);
        assert!(!handle.is_none());
        assert_eq!(submission.sound_type, SoundType::Voice);
        assert_eq!(submission.samples, [1, 2, 3]);
        assert!(submission.ended);
    }

    #[test]
    fn test_sound_loop_count() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        bank.play_cue_named("alarm", 0, SoundType::Sfx, &sink).unwrap();

        let submission = &sink.submissions()[0];
        assert_eq!(submission.samples, [10, 20, 10, 20, 10, 20, 10, 20]);
        assert!(submission.ended);

        let plan = bank.resolve_cue(&"alarm".into(), 0).unwrap().unwrap();
        assert_eq!(plan.loops, Loops::Times(4));
    }

    #[test]
    fn test_loop_event_forever() {
        let (bank, _) = setup();
        let sink = RecordingSink::new(1000);

        bank.play_cue_named("theme", 0, SoundType::Music, &sink).unwrap();

        let submission = &sink.submissions()[0];
        assert_eq!(submission.samples.len(), 1000);
        assert!(!submission.ended);
        assert_eq!(submission.channels, 2);
        assert_eq!(submission.sample_rate, 44100);

        let plan = bank.resolve_cue(&"theme".into(), 0).unwrap().unwrap();
        assert_eq!(
            plan,
            PlaybackPlan {
                sound_index: 2,
                wave_bank: "music".to_string(),
                wave_index: 0,
                loops: Loops::Forever,
            }
        );
    }

    #[test]
    fn test_last_loop_event_wins() {
        let (bank, _) = setup();
        let plan = bank.resolve_cue(&"steps".into(), 0).unwrap().unwrap();
        assert_eq!(plan.loops, Loops::Times(2));
    }

    #[test]
    fn test_nothing_to_play() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        for name in ["silence", "placeholder"] {
            let handle = bank.play_cue_named(name, 0, SoundType::Sfx, &sink).unwrap();
            assert!(handle.is_none(), "{}", name);
            assert!(bank.resolve_cue(&name.into(), 0).unwrap().is_none());
        }
        assert!(sink.submissions().is_empty());

        let sound = &bank.sounds()[3];
        assert!(bank.play_sound(sound, SoundType::Sfx, &sink).unwrap().is_none());
    }

    #[test]
    fn test_first_track_and_wave_are_used() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        bank.play_cue_named("layered", 0, SoundType::Sfx, &sink).unwrap();
        assert_eq!(sink.submissions()[0].samples, [10, 20]);
    }

    #[test]
    fn test_index_errors() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        let err = bank.play_cue_at(99, 0, SoundType::Sfx, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(
            err.to_string(),
            "Failed playing cue 99 of sound bank \"game\": cue index out of range (99 >= 9)"
        );

        let err = bank
            .play_cue_named("dangling", 0, SoundType::Sfx, &sink)
            .unwrap_err();
        assert!(matches!(
            err.root(),
            Error::IndexOutOfRange {
                table: Table::Sound,
                index: 42,
                ..
            }
        ));

        let err = bank
            .play_cue_named("broken", 0, SoundType::Sfx, &sink)
            .unwrap_err();
        assert!(matches!(
            err.root(),
            Error::IndexOutOfRange {
                table: Table::Wave,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_cue() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();

        let err = bank
            .play_cue_named("fanfare", 0, SoundType::Sfx, &sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCue);
        assert_eq!(
            err.contexts(),
            vec!["Failed playing cue \"fanfare\" of sound bank \"game\""]
        );

        let err = bank.resolve_cue(&"fanfare".into(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCue);
    }

    #[test]
    fn test_wave_bank_loaded_once() {
        let (bank, provider) = setup();
        let sink = RecordingSink::default();

        bank.play_cue_named("click", 0, SoundType::Sfx, &sink).unwrap();
        bank.play_cue_named("click", 5, SoundType::Sfx, &sink).unwrap();

        assert_eq!(provider.opens("sfx", ResourceKind::WaveBank), 1);
        assert_eq!(provider.opens("music", ResourceKind::WaveBank), 0);
    }

    #[test]
    fn test_resolve_does_not_load() {
        let (bank, provider) = setup();

        let plan = bank.resolve_cue(&CueRef::Index(0), 6).unwrap().unwrap();
        assert_eq!(plan.sound_index, 1);
        assert_eq!(plan.wave_bank, "sfx");
        assert_eq!(plan.wave_index, 1);

        assert_eq!(provider.opens("sfx", ResourceKind::WaveBank), 0);
        assert!(!bank.registry().is_loaded("sfx"));
    }

    #[test]
    fn test_failed_wave_bank_load_is_retried() {
        let file = parse_sound_bank_text(BANK).unwrap();
        let provider = Arc::new(CountingProvider::new(provider_with(&file, &[])));
        let bank = SoundBank::load(provider.clone(), "game").unwrap();
        let sink = RecordingSink::default();

        let err = bank.play_cue_named("click", 0, SoundType::Sfx, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.contexts(),
            vec![
                "Failed playing cue \"click\" of sound bank \"game\"",
                "Failed loading XACT wave bank \"sfx\"",
            ]
        );

        let (name, waves) = waves().remove(0);
        provider.inner().insert(
            name,
            ResourceKind::WaveBank,
            crate::encode::encode_wave_bank(name, &waves).unwrap(),
        );

        bank.play_cue_named("click", 0, SoundType::Sfx, &sink).unwrap();
        assert_eq!(provider.opens("sfx", ResourceKind::WaveBank), 2);
    }

    #[test]
    fn test_undeclared_wave_bank() {
        let (name, wave_banks, mut sounds, cues) =
            parse_sound_bank_text(BANK).unwrap().into_parts();
        sounds[0].tracks[0].waves[0].bank = "voices".to_string();
        let file = SoundBankFile::new(name, wave_banks, sounds, cues).unwrap();
        let bank = SoundBank::from_file(
            file,
            crate::bank::BankFormat::Text,
            Arc::new(MemoryProvider::new()),
        );
        let sink = RecordingSink::default();

        let err = bank.play_cue_named("click", 0, SoundType::Sfx, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownWaveBank);
        let err = bank.resolve_cue(&"click".into(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownWaveBank);
    }

    #[test]
    fn test_cue_removed_from_rebuilt_bank() {
        let (name, wave_banks, sounds, mut cues) =
            parse_sound_bank_text(BANK).unwrap().into_parts();
        cues.retain(|cue| cue.name != "click");
        let file = SoundBankFile::new(name, wave_banks, sounds, cues).unwrap();
        let bank = SoundBank::from_file(
            file,
            crate::bank::BankFormat::Text,
            Arc::new(MemoryProvider::new()),
        );
        let sink = RecordingSink::default();

        let err = bank.play_cue_named("click", 0, SoundType::Sfx, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCue);
        assert!(bank.cue_by_name("alarm").is_some());
        assert!(sink.submissions().is_empty());
    }

    #[test]
    fn test_play_variation_directly() {
        let (bank, _) = setup();
        let sink = RecordingSink::default();
        let cue = Cue {
            name: "adhoc".to_string(),
            variations: vec![Variation {
                weight_min: 10,
                weight_max: 20,
                sound_index: 0,
            }],
        };

        bank.play_variation(&cue, 15, SoundType::Sfx, &sink).unwrap();
        assert_eq!(sink.submissions().len(), 1);

        let err = bank.play_variation(&cue, 9, SoundType::Sfx, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVariation);
    }
}
