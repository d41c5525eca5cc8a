//! Track event parameters.
//!
//! Every track of a sound carries a list of events that modify its playback:
//! pitch and volume changes, filter sweeps, LFOs, envelopes, loop overrides,
//! markers, mix bin routing and environmental reverb. Only the loop override
//! affects cue resolution; the other parameter blocks are passed through as
//! typed data for the audio backend.
//!
//! Each event kind owns exactly one payload struct. [`Event::new`] builds an
//! event whose payload carries the defaults of its kind, so a field of another
//! kind can never be read by accident.

use std::fmt;

use serde::Serialize;

/// Number of slots in a mix bin table.
pub const MIX_BIN_COUNT: usize = 8;

/// Volume of an unused mix bin slot.
pub const MIX_BIN_SILENT: f32 = -64.0;

/// The kind of a track event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventKind {
    Pitch = 0,
    Volume,
    LowPass,
    LfoPitch,
    LfoMulti,
    EnvelopeAmplitude,
    EnvelopePitch,
    Loop,
    Marker,
    MixBins,
    EnvironmentReverb,
    MixBinsPan,
}

impl EventKind {
    /// All kinds, ordered by their binary tag.
    pub const ALL: [EventKind; 12] = [
        EventKind::Pitch,
        EventKind::Volume,
        EventKind::LowPass,
        EventKind::LfoPitch,
        EventKind::LfoMulti,
        EventKind::EnvelopeAmplitude,
        EventKind::EnvelopePitch,
        EventKind::Loop,
        EventKind::Marker,
        EventKind::MixBins,
        EventKind::EnvironmentReverb,
        EventKind::MixBinsPan,
    ];

    /// Parse a kind from its name in the text encoding.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// The name of this kind in the text encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pitch => "pitch",
            Self::Volume => "volume",
            Self::LowPass => "lowpass",
            Self::LfoPitch => "lfo_pitch",
            Self::LfoMulti => "lfo_multi",
            Self::EnvelopeAmplitude => "envelope_amplitude",
            Self::EnvelopePitch => "envelope_pitch",
            Self::Loop => "loop",
            Self::Marker => "marker",
            Self::MixBins => "mixbins",
            Self::EnvironmentReverb => "environment_reverb",
            Self::MixBinsPan => "mixbins_pan",
        }
    }

    /// The tag of this kind in the binary encoding.
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Look up a kind by its binary tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }
}

/// Pitch change, optionally faded or randomized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PitchParams {
    pub is_relative: bool,
    pub enable_fade: bool,
    pub enable_variation: bool,
    pub fade_step_count: u32,
    /// Fade duration in milliseconds.
    pub fade_duration: u32,
    pub pitch_start: f32,
    pub pitch_end: f32,
}

/// Volume change, optionally faded or randomized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VolumeParams {
    pub is_relative: bool,
    pub enable_fade: bool,
    pub enable_variation: bool,
    pub fade_step_count: u32,
    /// Fade duration in milliseconds.
    pub fade_duration: u32,
    pub volume_start: f32,
    pub volume_end: f32,
}

/// Low-pass filter settings, optionally swept.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LowPassParams {
    pub is_relative: bool,
    pub random: bool,
    pub sweep_cutoff: bool,
    pub sweep_step_count: u32,
    /// Sweep duration in milliseconds.
    pub sweep_duration: u32,
    pub resonance_start: f32,
    pub resonance_end: f32,
    /// Cutoff frequency in Hz.
    pub cutoff_start: u32,
    /// Cutoff frequency in Hz.
    pub cutoff_end: u32,
}

/// LFO modulating pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LfoPitchParams {
    pub delta: f32,
    pub pitch: f32,
}

/// LFO modulating pitch, filter and amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LfoMultiParams {
    pub delta: f32,
    pub pitch: f32,
    pub filter: f32,
    pub amplitude: f32,
}

/// DAHDSR amplitude envelope. Times are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnvelopeAmplitudeParams {
    pub delay: u32,
    pub attack: u32,
    pub hold: u32,
    pub decay: u32,
    pub release: u32,
    pub sustain: f32,
}

/// DAHDSR envelope applied to pitch and filter. Times are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnvelopePitchParams {
    pub delay: u32,
    pub attack: u32,
    pub hold: u32,
    pub decay: u32,
    pub release: u32,
    pub sustain: f32,
    pub pitch: f32,
    pub filter: f32,
}

/// Per-track loop override.
///
/// A count of `0` means the track loops forever; any other count `n` plays
/// the wave `n + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoopParams {
    pub count: u32,
}

/// Marker notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MarkerParams {
    pub repeat: bool,
    pub repeat_count: u32,
    pub repeat_duration: u32,
    pub value: u32,
}

/// One slot of a mix bin table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixBin {
    pub channel: u32,
    /// Volume in dB.
    pub volume: f32,
}

impl Default for MixBin {
    fn default() -> Self {
        Self {
            channel: 0,
            volume: MIX_BIN_SILENT,
        }
    }
}

/// Static routing of the track into the mix bins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MixBinsParams {
    pub bins: [MixBin; MIX_BIN_COUNT],
}

/// I3DL2-style environmental reverb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentReverbParams {
    pub room: f32,
    pub room_hf: f32,
    pub room_rolloff_factor: f32,
    /// Decay time in milliseconds.
    pub decay: u32,
    pub decay_hf_ratio: f32,
    pub reflection: f32,
    /// Reflection delay in milliseconds.
    pub reflection_delay: u32,
    pub reverb: f32,
    /// Reverb delay in milliseconds.
    pub reverb_delay: u32,
    pub diffusion: f32,
    pub density: f32,
    /// Reference high frequency in Hz.
    pub reference_hf: u32,
}

impl Default for EnvironmentReverbParams {
    fn default() -> Self {
        Self {
            room: -100.0,
            room_hf: 0.0,
            room_rolloff_factor: 0.0,
            decay: 1000,
            decay_hf_ratio: 0.5,
            reflection: -100.0,
            reflection_delay: 20,
            reverb: -100.0,
            reverb_delay: 40,
            diffusion: 1.0,
            density: 1.0,
            reference_hf: 5000,
        }
    }
}

/// Panned routing of the track into the mix bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixBinsPanParams {
    pub use_3d: bool,
    /// Pan angle in degrees.
    pub angle_start: u32,
    /// Pan angle in degrees.
    pub angle_end: u32,
    pub speaker_channel_count: u32,
    pub bins: [MixBin; MIX_BIN_COUNT],
}

impl Default for MixBinsPanParams {
    fn default() -> Self {
        Self {
            use_3d: false,
            angle_start: 0,
            angle_end: 0,
            speaker_channel_count: 5,
            bins: [MixBin::default(); MIX_BIN_COUNT],
        }
    }
}

/// A track event: one parameter block per kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Pitch(PitchParams),
    Volume(VolumeParams),
    LowPass(LowPassParams),
    LfoPitch(LfoPitchParams),
    LfoMulti(LfoMultiParams),
    EnvelopeAmplitude(EnvelopeAmplitudeParams),
    EnvelopePitch(EnvelopePitchParams),
    Loop(LoopParams),
    Marker(MarkerParams),
    MixBins(MixBinsParams),
    EnvironmentReverb(EnvironmentReverbParams),
    MixBinsPan(MixBinsPanParams),
}

impl Event {
    /// Create an event of `kind` with the default parameters of that kind.
    pub fn new(kind: EventKind) -> Self {
        match kind {
            EventKind::Pitch => Event::Pitch(PitchParams::default()),
            EventKind::Volume => Event::Volume(VolumeParams::default()),
            EventKind::LowPass => Event::LowPass(LowPassParams::default()),
            EventKind::LfoPitch => Event::LfoPitch(LfoPitchParams::default()),
            EventKind::LfoMulti => Event::LfoMulti(LfoMultiParams::default()),
            EventKind::EnvelopeAmplitude => {
                Event::EnvelopeAmplitude(EnvelopeAmplitudeParams::default())
            }
            EventKind::EnvelopePitch => Event::EnvelopePitch(EnvelopePitchParams::default()),
            EventKind::Loop => Event::Loop(LoopParams::default()),
            EventKind::Marker => Event::Marker(MarkerParams::default()),
            EventKind::MixBins => Event::MixBins(MixBinsParams::default()),
            EventKind::EnvironmentReverb => {
                Event::EnvironmentReverb(EnvironmentReverbParams::default())
            }
            EventKind::MixBinsPan => Event::MixBinsPan(MixBinsPanParams::default()),
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Pitch(_) => EventKind::Pitch,
            Event::Volume(_) => EventKind::Volume,
            Event::LowPass(_) => EventKind::LowPass,
            Event::LfoPitch(_) => EventKind::LfoPitch,
            Event::LfoMulti(_) => EventKind::LfoMulti,
            Event::EnvelopeAmplitude(_) => EventKind::EnvelopeAmplitude,
            Event::EnvelopePitch(_) => EventKind::EnvelopePitch,
            Event::Loop(_) => EventKind::Loop,
            Event::Marker(_) => EventKind::Marker,
            Event::MixBins(_) => EventKind::MixBins,
            Event::EnvironmentReverb(_) => EventKind::EnvironmentReverb,
            Event::MixBinsPan(_) => EventKind::MixBinsPan,
        }
    }

    /// Shorthand for a loop override event.
    pub fn looping(count: u32) -> Self {
        Event::Loop(LoopParams { count })
    }

    /// The parameters of this event, in encoding order.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let mut copy = *self;
        let mut fields = Vec::new();
        for (name, field) in copy.fields_mut() {
            fields.push((name, field.get()));
        }
        fields
    }

    /// Mutable access to the parameters of this event, in encoding order.
    ///
    /// The names are the opcode names of the text encoding. Both encodings
    /// read and write event payloads through this list.
    pub fn fields_mut(&mut self) -> Vec<(&'static str, FieldMut<'_>)> {
        use FieldMut::{Bool, Float, Int};

        match self {
            Event::Pitch(p) => vec![
                ("is_relative", Bool(&mut p.is_relative)),
                ("enable_fade", Bool(&mut p.enable_fade)),
                ("enable_variation", Bool(&mut p.enable_variation)),
                ("fade_step_count", Int(&mut p.fade_step_count)),
                ("fade_duration", Int(&mut p.fade_duration)),
                ("pitch_start", Float(&mut p.pitch_start)),
                ("pitch_end", Float(&mut p.pitch_end)),
            ],
            Event::Volume(p) => vec![
                ("is_relative", Bool(&mut p.is_relative)),
                ("enable_fade", Bool(&mut p.enable_fade)),
                ("enable_variation", Bool(&mut p.enable_variation)),
                ("fade_step_count", Int(&mut p.fade_step_count)),
                ("fade_duration", Int(&mut p.fade_duration)),
                ("volume_start", Float(&mut p.volume_start)),
                ("volume_end", Float(&mut p.volume_end)),
            ],
            Event::LowPass(p) => vec![
                ("is_relative", Bool(&mut p.is_relative)),
                ("random", Bool(&mut p.random)),
                ("sweep_cutoff", Bool(&mut p.sweep_cutoff)),
                ("sweep_step_count", Int(&mut p.sweep_step_count)),
                ("sweep_duration", Int(&mut p.sweep_duration)),
                ("resonance_start", Float(&mut p.resonance_start)),
                ("resonance_end", Float(&mut p.resonance_end)),
                ("cutoff_start", Int(&mut p.cutoff_start)),
                ("cutoff_end", Int(&mut p.cutoff_end)),
            ],
            Event::LfoPitch(p) => vec![
                ("delta", Float(&mut p.delta)),
                ("pitch", Float(&mut p.pitch)),
            ],
            Event::LfoMulti(p) => vec![
                ("delta", Float(&mut p.delta)),
                ("pitch", Float(&mut p.pitch)),
                ("filter", Float(&mut p.filter)),
                ("amplitude", Float(&mut p.amplitude)),
            ],
            Event::EnvelopeAmplitude(p) => vec![
                ("delay", Int(&mut p.delay)),
                ("attack", Int(&mut p.attack)),
                ("hold", Int(&mut p.hold)),
                ("decay", Int(&mut p.decay)),
                ("release", Int(&mut p.release)),
                ("sustain", Float(&mut p.sustain)),
            ],
            Event::EnvelopePitch(p) => vec![
                ("delay", Int(&mut p.delay)),
                ("attack", Int(&mut p.attack)),
                ("hold", Int(&mut p.hold)),
                ("decay", Int(&mut p.decay)),
                ("release", Int(&mut p.release)),
                ("sustain", Float(&mut p.sustain)),
                ("pitch", Float(&mut p.pitch)),
                ("filter", Float(&mut p.filter)),
            ],
            Event::Loop(p) => vec![("count", Int(&mut p.count))],
            Event::Marker(p) => vec![
                ("repeat", Bool(&mut p.repeat)),
                ("repeat_count", Int(&mut p.repeat_count)),
                ("repeat_duration", Int(&mut p.repeat_duration)),
                ("value", Int(&mut p.value)),
            ],
            Event::MixBins(p) => {
                let mut fields = Vec::with_capacity(2 * MIX_BIN_COUNT);
                push_mix_bins(&mut p.bins, &mut fields);
                fields
            }
            Event::EnvironmentReverb(p) => vec![
                ("room", Float(&mut p.room)),
                ("room_hf", Float(&mut p.room_hf)),
                ("room_rolloff_factor", Float(&mut p.room_rolloff_factor)),
                ("decay", Int(&mut p.decay)),
                ("decay_hf_ratio", Float(&mut p.decay_hf_ratio)),
                ("reflection", Float(&mut p.reflection)),
                ("reflection_delay", Int(&mut p.reflection_delay)),
                ("reverb", Float(&mut p.reverb)),
                ("reverb_delay", Int(&mut p.reverb_delay)),
                ("diffusion", Float(&mut p.diffusion)),
                ("density", Float(&mut p.density)),
                ("reference_hf", Int(&mut p.reference_hf)),
            ],
            Event::MixBinsPan(p) => {
                let mut fields = vec![
                    ("use_3d", Bool(&mut p.use_3d)),
                    ("angle_start", Int(&mut p.angle_start)),
                    ("angle_end", Int(&mut p.angle_end)),
                    ("speaker_channel_count", Int(&mut p.speaker_channel_count)),
                ];
                push_mix_bins(&mut p.bins, &mut fields);
                fields
            }
        }
    }
}

const BIN_CHANNEL_NAMES: [&str; MIX_BIN_COUNT] = [
    "bin0_channel",
    "bin1_channel",
    "bin2_channel",
    "bin3_channel",
    "bin4_channel",
    "bin5_channel",
    "bin6_channel",
    "bin7_channel",
];

const BIN_VOLUME_NAMES: [&str; MIX_BIN_COUNT] = [
    "bin0_volume",
    "bin1_volume",
    "bin2_volume",
    "bin3_volume",
    "bin4_volume",
    "bin5_volume",
    "bin6_volume",
    "bin7_volume",
];

fn push_mix_bins<'a>(
    bins: &'a mut [MixBin; MIX_BIN_COUNT],
    fields: &mut Vec<(&'static str, FieldMut<'a>)>,
) {
    for (i, bin) in bins.iter_mut().enumerate() {
        fields.push((BIN_CHANNEL_NAMES[i], FieldMut::Int(&mut bin.channel)));
        fields.push((BIN_VOLUME_NAMES[i], FieldMut::Float(&mut bin.volume)));
    }
}

/// The value of one event parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(u32),
    Float(f32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::Float(value) => write!(f, "{}", value),
        }
    }
}

/// Mutable reference to one event parameter.
#[derive(Debug)]
pub enum FieldMut<'a> {
    Bool(&'a mut bool),
    Int(&'a mut u32),
    Float(&'a mut f32),
}

impl FieldMut<'_> {
    /// The current value.
    pub fn get(&self) -> FieldValue {
        match self {
            FieldMut::Bool(value) => FieldValue::Bool(**value),
            FieldMut::Int(value) => FieldValue::Int(**value),
            FieldMut::Float(value) => FieldValue::Float(**value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_defaults() {
        let Event::Volume(volume) = Event::new(EventKind::Volume) else {
            panic!("expected a volume event");
        };

        assert!(!volume.is_relative);
        assert!(!volume.enable_fade);
        assert!(!volume.enable_variation);
        assert_eq!(volume.fade_step_count, 0);
        assert_eq!(volume.fade_duration, 0);
        assert_eq!(volume.volume_start, 0.0);
        assert_eq!(volume.volume_end, 0.0);
    }

    #[test]
    fn test_kind_round_trips_through_new() {
        for kind in EventKind::ALL {
            assert_eq!(Event::new(kind).kind(), kind);
        }
    }

    #[test]
    fn test_environment_reverb_defaults() {
        let Event::EnvironmentReverb(reverb) = Event::new(EventKind::EnvironmentReverb) else {
            panic!("expected a reverb event");
        };

        assert_eq!(reverb.room, -100.0);
        assert_eq!(reverb.decay, 1000);
        assert_eq!(reverb.decay_hf_ratio, 0.5);
        assert_eq!(reverb.reflection_delay, 20);
        assert_eq!(reverb.reverb_delay, 40);
        assert_eq!(reverb.reference_hf, 5000);
    }

    #[test]
    fn test_mix_bin_tables_start_silent() {
        let Event::MixBinsPan(pan) = Event::new(EventKind::MixBinsPan) else {
            panic!("expected a mix bin pan event");
        };
        assert_eq!(pan.speaker_channel_count, 5);
        assert!(!pan.use_3d);
        assert!(pan
            .bins
            .iter()
            .all(|bin| bin.channel == 0 && bin.volume == MIX_BIN_SILENT));

        let Event::MixBins(mix) = Event::new(EventKind::MixBins) else {
            panic!("expected a mix bin event");
        };
        assert_eq!(mix.bins, [MixBin::default(); MIX_BIN_COUNT]);
    }

    #[test]
    fn test_loop_defaults_to_forever_count() {
        assert_eq!(Event::new(EventKind::Loop), Event::looping(0));
    }

    #[test]
    fn test_fields_follow_payload() {
        let mut event = Event::new(EventKind::EnvelopePitch);
        for (name, field) in event.fields_mut() {
            match (name, field) {
                ("attack", FieldMut::Int(value)) => *value = 30,
                ("filter", FieldMut::Float(value)) => *value = 0.25,
                _ => {}
            }
        }

        let Event::EnvelopePitch(envelope) = event else {
            panic!("expected a pitch envelope event");
        };
        assert_eq!(envelope.attack, 30);
        assert_eq!(envelope.filter, 0.25);

        let names: Vec<_> = event.fields().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["delay", "attack", "hold", "decay", "release", "sustain", "pitch", "filter"]
        );
    }

    #[test]
    fn test_mix_bin_fields() {
        let event = Event::new(EventKind::MixBinsPan);
        let fields = event.fields();

        assert_eq!(fields.len(), 4 + 2 * MIX_BIN_COUNT);
        assert_eq!(fields[3], ("speaker_channel_count", FieldValue::Int(5)));
        assert_eq!(fields[4], ("bin0_channel", FieldValue::Int(0)));
        assert_eq!(fields[5], ("bin0_volume", FieldValue::Float(MIX_BIN_SILENT)));
    }

    #[test]
    fn test_kind_names_and_tags() {
        assert_eq!(EventKind::from_name("LowPass"), Some(EventKind::LowPass));
        assert_eq!(EventKind::from_name("mixbins_pan"), Some(EventKind::MixBinsPan));
        assert_eq!(EventKind::from_name("play"), None);
        assert_eq!(EventKind::Loop.tag(), 7);
        assert_eq!(EventKind::from_tag(11), Some(EventKind::MixBinsPan));
        assert_eq!(EventKind::from_tag(12), None);
    }
}
