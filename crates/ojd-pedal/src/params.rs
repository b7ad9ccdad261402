//! The pedal's five parameters and their raw-value conversions.
//!
//! Hosts store parameters as raw values: the three knobs use the familiar
//! 0 to 10 guitar-equipment scale, the two switches use 0.0/1.0. The DSP never
//! sees raw values directly; it goes through the conversions in this module
//! (normalised knob position, Volume in dB, tone mode, bypass predicate).
//!
//! Two [`ParameterSource`] implementations are provided:
//!
//! - [`PedalParams`]: lock-free atomic storage shared between the control
//!   and audio threads
//! - [`ParamSnapshot`]: an immutable copy, taken once per processing call

use std::sync::atomic::{AtomicU32, Ordering};

use ojd_core::{ParamDescriptor, ParamFlags, ParamId, map_range};

use crate::ToneMode;

/// Upper end of the knob display range.
pub const KNOB_MAX: f32 = 10.0;

/// Volume dB at the knob's minimum.
pub const VOLUME_MIN_DB: f32 = -60.0;

/// Volume dB at the knob's maximum.
pub const VOLUME_MAX_DB: f32 = -20.0;

/// Identifies one of the pedal's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OjdParam {
    /// Distortion intensity knob.
    Drive,
    /// Tone stack blend knob.
    Tone,
    /// Output level knob.
    Volume,
    /// Tone stack mode switch (on = HP).
    HpLp,
    /// Bypass switch (on = bypassed).
    Bypass,
}

static DESCRIPTORS: [ParamDescriptor; OjdParam::COUNT] = [
    ParamDescriptor::rotary("Drive", "Drive", 0.0, KNOB_MAX, 1.65, 0.01).with_id(ParamId(0), "Drive"),
    ParamDescriptor::rotary("Tone", "Tone", 0.0, KNOB_MAX, 5.0, 0.01).with_id(ParamId(1), "Tone"),
    ParamDescriptor::rotary("Volume", "Volume", 0.0, KNOB_MAX, 8.35, 0.01).with_id(ParamId(2), "Volume"),
    ParamDescriptor::switch("HP / LP", "HP/LP", false).with_id(ParamId(3), "HpLp"),
    ParamDescriptor::switch("Bypass", "Bypass", false)
        .with_id(ParamId(4), "Bypass")
        .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED).union(ParamFlags::BYPASS)),
];

impl OjdParam {
    /// Number of parameters.
    pub const COUNT: usize = 5;

    /// All parameters in host registration order.
    pub const ALL: [OjdParam; Self::COUNT] = [
        OjdParam::Drive,
        OjdParam::Tone,
        OjdParam::Volume,
        OjdParam::HpLp,
        OjdParam::Bypass,
    ];

    /// Position in [`ALL`](Self::ALL).
    pub const fn index(self) -> usize {
        match self {
            OjdParam::Drive => 0,
            OjdParam::Tone => 1,
            OjdParam::Volume => 2,
            OjdParam::HpLp => 3,
            OjdParam::Bypass => 4,
        }
    }

    /// Host-facing metadata.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Stable string id (`"Drive"`, `"HpLp"`, ...).
    pub fn id(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Looks a parameter up by its string id, ignoring ASCII case.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id().eq_ignore_ascii_case(id))
    }

    /// Whether a change requires the drive coefficients to be recomputed.
    ///
    /// Tone and Volume are read per block and need no callback.
    pub const fn affects_coefficients(self) -> bool {
        matches!(self, OjdParam::Drive | OjdParam::HpLp)
    }

    /// Display text for a raw value.
    ///
    /// Knobs print two decimals. Switches print `"HP"`/`"LP"` and
    /// `"Off"`/`"On"` (a bypassed pedal is off). A non-zero
    /// `maximum_length` truncates the text to that many characters.
    pub fn value_to_text(self, raw: f32, maximum_length: usize) -> String {
        let mut text = match self {
            OjdParam::Drive | OjdParam::Tone | OjdParam::Volume => format!("{raw:.2}"),
            OjdParam::HpLp => (if is_hp(raw) { "HP" } else { "LP" }).to_owned(),
            OjdParam::Bypass => (if is_bypass_active(raw) { "Off" } else { "On" }).to_owned(),
        };
        if maximum_length > 0
            && let Some((cut, _)) = text.char_indices().nth(maximum_length)
        {
            text.truncate(cut);
        }
        text
    }

    /// Parses display text back into a raw value.
    ///
    /// Switch text is matched case-insensitively: `"hp"` selects HP mode and
    /// `"off"` engages bypass; anything else maps to the switch's off state.
    /// Bypass parses `"off"` (not `"on"`) as bypassed so that it round-trips
    /// with [`value_to_text`](Self::value_to_text), which prints `"Off"` when bypassed.
    /// Knob text must parse as a number and is clamped to the range.
    pub fn text_to_value(self, text: &str) -> Option<f32> {
        let text = text.trim();
        match self {
            OjdParam::Drive | OjdParam::Tone | OjdParam::Volume => {
                text.parse::<f32>().ok().map(|v| self.descriptor().clamp(v))
            }
            OjdParam::HpLp => Some(switch_raw(text.eq_ignore_ascii_case("hp"))),
            OjdParam::Bypass => Some(switch_raw(text.eq_ignore_ascii_case("off"))),
        }
    }
}

impl std::fmt::Display for OjdParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// Knob position on the 0 to 1 scale.
#[inline]
pub fn normalise(raw: f32) -> f32 {
    raw / KNOB_MAX
}

/// Volume knob position mapped linearly onto -60..-20 dB.
#[inline]
pub fn volume_db(raw: f32) -> f32 {
    map_range(raw, 0.0, KNOB_MAX, VOLUME_MIN_DB, VOLUME_MAX_DB)
}

/// HP mode iff the raw switch value is above one half.
#[inline]
pub fn is_hp(raw: f32) -> bool {
    raw > 0.5
}

/// Tone stack mode for a raw HpLp value.
#[inline]
pub fn tone_mode(raw: f32) -> ToneMode {
    if is_hp(raw) { ToneMode::Hp } else { ToneMode::Lp }
}

/// Bypass active iff the raw switch value is above one half.
#[inline]
pub fn is_bypass_active(raw: f32) -> bool {
    raw > 0.5
}

/// Raw value for a switch state.
#[inline]
pub fn switch_raw(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

/// Read access to current raw parameter values.
///
/// The processor only ever reads through this interface, so any host
/// parameter store can sit behind it.
pub trait ParameterSource: Send + Sync {
    /// Current raw value of `param`.
    fn raw_value(&self, param: OjdParam) -> f32;
}

/// Lock-free parameter storage.
///
/// Values are stored as `f32` bit-cast to `u32`; writes clamp to the
/// descriptor range.
#[derive(Debug)]
pub struct PedalParams {
    values: [AtomicU32; OjdParam::COUNT],
}

impl PedalParams {
    /// All parameters at their defaults.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(DESCRIPTORS[i].default.to_bits())),
        }
    }

    /// Read the current value of a parameter.
    pub fn get(&self, param: OjdParam) -> f32 {
        f32::from_bits(self.values[param.index()].load(Ordering::Acquire))
    }

    /// Write a parameter value. Clamps to descriptor bounds.
    pub fn set(&self, param: OjdParam, raw: f32) -> f32 {
        let clamped = param.descriptor().clamp(raw);
        self.values[param.index()].store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    /// Copy every value out of `source`.
    pub fn load_from(&self, source: &dyn ParameterSource) {
        for param in OjdParam::ALL {
            self.set(param, source.raw_value(param));
        }
    }
}

impl Default for PedalParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for PedalParams {
    fn raw_value(&self, param: OjdParam) -> f32 {
        self.get(param)
    }
}

/// Immutable copy of all raw parameter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Drive knob, 0..10.
    pub drive: f32,
    /// Tone knob, 0..10.
    pub tone: f32,
    /// Volume knob, 0..10.
    pub volume: f32,
    /// HP/LP switch, 0 or 1.
    pub hp_lp: f32,
    /// Bypass switch, 0 or 1.
    pub bypass: f32,
}

impl ParamSnapshot {
    /// Reads every parameter once.
    pub fn capture(source: &dyn ParameterSource) -> Self {
        Self {
            drive: source.raw_value(OjdParam::Drive),
            tone: source.raw_value(OjdParam::Tone),
            volume: source.raw_value(OjdParam::Volume),
            hp_lp: source.raw_value(OjdParam::HpLp),
            bypass: source.raw_value(OjdParam::Bypass),
        }
    }

    /// Builder-style setter, clamped to the descriptor range.
    pub fn with(mut self, param: OjdParam, raw: f32) -> Self {
        let raw = param.descriptor().clamp(raw);
        match param {
            OjdParam::Drive => self.drive = raw,
            OjdParam::Tone => self.tone = raw,
            OjdParam::Volume => self.volume = raw,
            OjdParam::HpLp => self.hp_lp = raw,
            OjdParam::Bypass => self.bypass = raw,
        }
        self
    }

    /// Tone stack mode.
    pub fn tone_mode(&self) -> ToneMode {
        tone_mode(self.hp_lp)
    }

    /// Whether the pedal is bypassed.
    pub fn is_bypassed(&self) -> bool {
        is_bypass_active(self.bypass)
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            drive: DESCRIPTORS[0].default,
            tone: DESCRIPTORS[1].default,
            volume: DESCRIPTORS[2].default,
            hp_lp: DESCRIPTORS[3].default,
            bypass: DESCRIPTORS[4].default,
        }
    }
}

impl ParameterSource for ParamSnapshot {
    fn raw_value(&self, param: OjdParam) -> f32 {
        match param {
            OjdParam::Drive => self.drive,
            OjdParam::Tone => self.tone,
            OjdParam::Volume => self.volume,
            OjdParam::HpLp => self.hp_lp,
            OjdParam::Bypass => self.bypass,
        }
    }
}
