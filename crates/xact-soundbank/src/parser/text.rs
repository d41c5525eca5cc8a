//! Parser for the text sound bank encoding (`<name>_xsb`).
//!
//! ```text
//! <soundbank> name=menu
//! <wavebank>  name=menu_waves
//!
//! <sound> name=click loop_count=0
//! <track>
//! <wave>  bank=menu_waves index=0
//! <event> type=volume volume_start=-3.0
//!
//! <cue> name=click
//! <variation> weight_min=0 weight_max=255 sound=0
//! ```

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, FieldMut};
use crate::types::{
    Cue, Sound, SoundBankFile, Track, Variation, WaveVariation, LOOP_COUNT_INFINITE,
};

use super::sections::{read_sections, OpcodeValue, Section};

/// Parse a text sound bank.
pub fn parse_sound_bank_text(content: &str) -> Result<SoundBankFile> {
    let mut name: Option<String> = None;
    let mut wave_banks: Vec<String> = Vec::new();
    let mut sounds: Vec<Sound> = Vec::new();
    let mut cues: Vec<Cue> = Vec::new();

    for section in read_sections(content)? {
        match section.header.as_str() {
            "soundbank" => {
                section.ignore_unknown(&["name"]);
                if name.is_some() {
                    return Err(section.error("Duplicate <soundbank> section"));
                }
                name = Some(section.require("name")?);
            }
            "wavebank" => {
                section.ignore_unknown(&["name"]);
                let bank: String = section.require("name")?;
                if wave_banks.contains(&bank) {
                    return Err(section.error(format!("Duplicate wave bank \"{}\"", bank)));
                }
                wave_banks.push(bank);
            }
            "sound" => {
                section.ignore_unknown(&["name", "loop_count"]);
                sounds.push(Sound {
                    name: section.value("name")?.unwrap_or_default(),
                    loop_count: parse_loop_count(&section)?,
                    tracks: Vec::new(),
                });
            }
            "track" => {
                section.ignore_unknown(&[]);
                let sound = sounds.last_mut().ok_or_else(|| section.orphan("sound"))?;
                sound.tracks.push(Track::default());
            }
            "wave" => {
                section.ignore_unknown(&["bank", "index"]);
                let wave = WaveVariation {
                    bank: section.value("bank")?.unwrap_or_default(),
                    index: section.require("index")?,
                };
                last_track(&mut sounds, &section)?.waves.push(wave);
            }
            "event" => {
                let event = parse_event(&section)?;
                last_track(&mut sounds, &section)?.events.push(event);
            }
            "cue" => {
                section.ignore_unknown(&["name"]);
                cues.push(Cue {
                    name: section.require("name")?,
                    variations: Vec::new(),
                });
            }
            "variation" => {
                section.ignore_unknown(&["weight_min", "weight_max", "sound"]);
                let variation = Variation {
                    weight_min: section.require("weight_min")?,
                    weight_max: section.require("weight_max")?,
                    sound_index: section.require("sound")?,
                };
                let cue = cues.last_mut().ok_or_else(|| section.orphan("cue"))?;
                cue.variations.push(variation);
            }
            other => return Err(section.error(format!("Unknown section <{}>", other))),
        }
    }

    let name = name.ok_or_else(|| Error::Parse("Missing <soundbank> section".to_string()))?;
    SoundBankFile::new(name, wave_banks, sounds, cues)
}

fn last_track<'a>(sounds: &'a mut [Sound], section: &Section) -> Result<&'a mut Track> {
    sounds
        .last_mut()
        .and_then(|sound| sound.tracks.last_mut())
        .ok_or_else(|| section.orphan("track"))
}

fn parse_loop_count(section: &Section) -> Result<u8> {
    match section.get("loop_count") {
        None => Ok(0),
        Some(raw) if raw.eq_ignore_ascii_case("infinite") => Ok(LOOP_COUNT_INFINITE),
        Some(raw) => match raw.parse::<u8>() {
            Ok(count) if count != LOOP_COUNT_INFINITE => Ok(count),
            _ => Err(section.error(format!(
                "Invalid loop_count '{}': expected 0-254 or 'infinite'",
                raw
            ))),
        },
    }
}

fn parse_event(section: &Section) -> Result<Event> {
    let type_name: String = section.require("type")?;
    let kind = EventKind::from_name(&type_name)
        .ok_or_else(|| section.error(format!("Unknown event type '{}'", type_name)))?;

    let mut event = Event::new(kind);
    let mut known = vec!["type"];

    for (name, field) in event.fields_mut() {
        known.push(name);
        match field {
            FieldMut::Bool(value) => assign(section, name, value)?,
            FieldMut::Int(value) => assign(section, name, value)?,
            FieldMut::Float(value) => assign(section, name, value)?,
        }
    }

    section.ignore_unknown(&known);
    Ok(event)
}

fn assign<T: OpcodeValue>(section: &Section, name: &str, slot: &mut T) -> Result<()> {
    if let Some(value) = section.value(name)? {
        *slot = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::{MixBin, MIX_BIN_SILENT};

    const BANK: &str = "\
<soundbank> name=menu
<wavebank> name=menu_waves
<wavebank> name=music

<sound> name=click
<track>
<wave> bank=menu_waves index=2
<event> type=volume enable_fade=yes volume_start=-3.5 fade_duration=120

<sound> name=theme loop_count=infinite
<track>
<wave> bank=music index=0
<event> type=loop count=3

<cue> name=click
<variation> weight_min=0 weight_max=255 sound=0
<cue> name=theme
<variation> weight_min=0 weight_max=4 sound=1
<variation> weight_min=5 weight_max=9 sound=0
";

    #[test]
    fn test_parse_bank() {
        let bank = parse_sound_bank_text(BANK).unwrap();

        assert_eq!(bank.name(), "menu");
        assert_eq!(bank.wave_banks(), ["menu_waves", "music"]);
        assert_eq!(bank.sounds().len(), 2);
        assert_eq!(bank.cues().len(), 2);

        let click = &bank.sounds()[0];
        assert_eq!(click.loop_count, 0);
        assert_eq!(click.tracks[0].waves[0].bank, "menu_waves");
        assert_eq!(click.tracks[0].waves[0].index, 2);

        let Event::Volume(volume) = click.tracks[0].events[0] else {
            panic!("expected a volume event");
        };
        assert!(volume.enable_fade);
        assert_eq!(volume.volume_start, -3.5);
        assert_eq!(volume.fade_duration, 120);
        assert_eq!(volume.volume_end, 0.0);

        assert_eq!(bank.sounds()[1].loop_count, LOOP_COUNT_INFINITE);
        assert_eq!(bank.sounds()[1].tracks[0].events[0], Event::looping(3));

        let theme = bank.cue_by_name("theme").unwrap();
        assert_eq!(theme.variations.len(), 2);
        assert_eq!(theme.variations[1].sound_index, 0);
    }

    #[test]
    fn test_mix_bins_opcodes() {
        let text = "\
<soundbank> name=b
<sound>
<track>
<event> type=mixbins bin1_channel=2 bin1_volume=-6
";
        let bank = parse_sound_bank_text(text).unwrap();
        let Event::MixBins(mix) = bank.sounds()[0].tracks[0].events[0] else {
            panic!("expected a mix bin event");
        };

        assert_eq!(mix.bins[0], MixBin::default());
        assert_eq!(mix.bins[1].channel, 2);
        assert_eq!(mix.bins[1].volume, -6.0);
        assert_eq!(mix.bins[2].volume, MIX_BIN_SILENT);
    }

    #[test]
    fn test_unknown_opcodes_are_ignored() {
        let text = "<soundbank> name=b colour=blue\n<sound> name=s pan=3";
        let bank = parse_sound_bank_text(text).unwrap();
        assert_eq!(bank.sounds()[0].name, "s");
    }

    #[test]
    fn test_structural_errors_carry_the_line() {
        let cases = [
            ("<soundbank> name=b\n<track>", 2),
            ("<soundbank> name=b\n<sound>\n<wave> index=0", 3),
            ("<soundbank> name=b\n<variation> weight_min=0 weight_max=1 sound=0", 2),
            ("<soundbank> name=b\n<sound>\n<track>\n<event> type=chorus", 4),
            ("<soundbank> name=b\n<sound> loop_count=255", 2),
            ("<soundbank> name=b\n<cue>", 2),
            ("<soundbank> name=b\n\n<region>", 3),
            ("<soundbank> name=a\n<soundbank> name=b", 2),
            ("<soundbank> name=b\n<wavebank> name=w\n<wavebank> name=w", 3),
        ];

        for (text, expected) in cases {
            let err = parse_sound_bank_text(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResourceLoadFailure, "{}", text);
            match err {
                Error::ParseAt { line, .. } => assert_eq!(line, expected, "{}", text),
                other => panic!("unexpected error for {:?}: {}", text, other),
            }
        }
    }

    #[test]
    fn test_missing_bank_name_and_duplicate_cues() {
        assert!(parse_sound_bank_text("<sound> name=s").is_err());

        let err = parse_sound_bank_text("<soundbank> name=b\n<cue> name=a\n<cue> name=a")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLoadFailure);
    }
}
