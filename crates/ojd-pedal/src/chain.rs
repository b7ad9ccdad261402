//! The fixed signal path.
//!
//! ```text
//!  1  30 Hz highpass         first order
//!  2  pre-drive boost        peaking, drive dependent
//!  3  pre-drive notch        peaking, drive dependent
//!  4  pre-waveshaper gain    ×11
//!  5  waveshaper             16× oversampled soft clipper
//!  6  post-drive boost 1     peaking, mode dependent
//!  7  post-drive boost 2     peaking, drive dependent
//!  8  post-drive boost 3     peaking, mode dependent
//!  9  6.3 kHz lowpass        first order
//! 10  tone stack             HP/LP split and blend
//! 11  volume                 -60..-20 dB
//! ```
//!
//! The order models the circuit and never changes, so the stages are plain
//! fields processed one after another over the whole block.

use ojd_core::{Biquad, Effect, Gain, ProcessSpec};

use crate::coefficients::{DriveCoefficients, input_highpass, output_lowpass};
use crate::tone_stack::{ToneMode, ToneStack};
use crate::waveshaper::Waveshaper;

/// Fixed linear gain into the clipper.
pub const PRE_WAVESHAPER_GAIN: f32 = 11.0;

/// Stage names in processing order.
pub const STAGE_NAMES: [&str; 11] = [
    "30 Hz highpass",
    "pre-drive boost",
    "pre-drive notch",
    "pre-waveshaper gain",
    "waveshaper",
    "post-drive boost 1",
    "post-drive boost 2",
    "post-drive boost 3",
    "6.3 kHz lowpass",
    "tone stack",
    "volume",
];

/// All eleven stages and their state.
#[derive(Debug, Clone)]
pub struct SignalChain {
    input_highpass: Biquad,
    pre_drive_boost: Biquad,
    pre_drive_notch: Biquad,
    pre_gain: Gain,
    waveshaper: Waveshaper,
    post_drive_boost1: Biquad,
    post_drive_boost2: Biquad,
    post_drive_boost3: Biquad,
    output_lowpass: Biquad,
    tone_stack: ToneStack,
    volume: Gain,
    sample_rate: f32,
}

impl SignalChain {
    /// Creates an unprepared chain. Every filter passes through until
    /// [`prepare`](Self::prepare) and
    /// [`set_drive_coefficients`](Self::set_drive_coefficients) run.
    pub fn new() -> Self {
        Self {
            input_highpass: Biquad::new(),
            pre_drive_boost: Biquad::new(),
            pre_drive_notch: Biquad::new(),
            pre_gain: Gain::with_linear(PRE_WAVESHAPER_GAIN),
            waveshaper: Waveshaper::default(),
            post_drive_boost1: Biquad::new(),
            post_drive_boost2: Biquad::new(),
            post_drive_boost3: Biquad::new(),
            output_lowpass: Biquad::new(),
            tone_stack: ToneStack::new(),
            volume: Gain::new(),
            sample_rate: 0.0,
        }
    }

    /// Propagates a validated spec to every stage.
    ///
    /// Computes the fixed filters, designs the tone stack for both modes,
    /// sizes its scratch buffer and clears all state. The drive-dependent
    /// peaking sets are left for the caller to supply.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        let sample_rate = spec.sample_rate as f32;
        self.sample_rate = sample_rate;

        self.input_highpass.set(&input_highpass(sample_rate));
        self.output_lowpass.set(&output_lowpass(sample_rate));
        self.tone_stack.prepare(sample_rate, spec.maximum_block_size);
        self.waveshaper.set_sample_rate(sample_rate);
        self.pre_gain.set_sample_rate(sample_rate);
        self.volume.set_sample_rate(sample_rate);

        self.reset();
    }

    /// Installs a new set of drive-dependent peaking coefficients.
    ///
    /// Filter history is kept; the swap happens between blocks.
    pub fn set_drive_coefficients(&mut self, coeffs: &DriveCoefficients) {
        self.pre_drive_boost.set(&coeffs.pre_drive_boost);
        self.pre_drive_notch.set(&coeffs.pre_drive_notch);
        self.post_drive_boost1.set(&coeffs.post_drive_boost1);
        self.post_drive_boost2.set(&coeffs.post_drive_boost2);
        self.post_drive_boost3.set(&coeffs.post_drive_boost3);
    }

    /// Peaking coefficients currently in use.
    pub fn drive_coefficients(&self) -> DriveCoefficients {
        DriveCoefficients {
            pre_drive_boost: *self.pre_drive_boost.coefficients(),
            pre_drive_notch: *self.pre_drive_notch.coefficients(),
            post_drive_boost1: *self.post_drive_boost1.coefficients(),
            post_drive_boost2: *self.post_drive_boost2.coefficients(),
            post_drive_boost3: *self.post_drive_boost3.coefficients(),
        }
    }

    /// Sets the tone stack mode and normalised Tone.
    pub fn set_tone(&mut self, mode: ToneMode, tone: f32) {
        self.tone_stack.set_mode(mode);
        self.tone_stack.set_tone(tone);
    }

    /// Sets the output level in dB.
    pub fn set_volume_db(&mut self, db: f32) {
        self.volume.set_gain_decibels(db);
    }

    /// Output level in dB.
    pub fn volume_db(&self) -> f32 {
        self.volume.gain_decibels()
    }

    /// The tone stack, for inspection.
    pub fn tone_stack(&self) -> &ToneStack {
        &self.tone_stack
    }

    /// The clipper, for inspection.
    pub fn waveshaper(&self) -> &Waveshaper {
        &self.waveshaper
    }

    /// Sample rate the chain was prepared for, or 0 before the first prepare.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Fractional latency of the whole chain in samples.
    ///
    /// Only the oversampler delays the signal.
    pub fn latency(&self) -> f32 {
        self.waveshaper.latency()
    }

    /// Runs every stage over `buffer` in place, in fixed order.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        self.input_highpass.process_block_inplace(buffer);
        self.pre_drive_boost.process_block_inplace(buffer);
        self.pre_drive_notch.process_block_inplace(buffer);
        self.pre_gain.process_block_inplace(buffer);
        self.waveshaper.process_block_inplace(buffer);
        self.post_drive_boost1.process_block_inplace(buffer);
        self.post_drive_boost2.process_block_inplace(buffer);
        self.post_drive_boost3.process_block_inplace(buffer);
        self.output_lowpass.process_block_inplace(buffer);
        self.tone_stack.process_block_inplace(buffer);
        self.volume.process_block_inplace(buffer);
    }

    /// Clears every stage's history.
    pub fn reset(&mut self) {
        self.input_highpass.clear();
        self.pre_drive_boost.clear();
        self.pre_drive_notch.clear();
        self.pre_gain.reset();
        self.waveshaper.reset();
        self.post_drive_boost1.clear();
        self.post_drive_boost2.clear();
        self.post_drive_boost3.clear();
        self.output_lowpass.clear();
        self.tone_stack.reset();
        self.volume.reset();
    }

    /// Returns `true` if no filter holds any history.
    pub fn is_cleared(&self) -> bool {
        [
            &self.input_highpass,
            &self.pre_drive_boost,
            &self.pre_drive_notch,
            &self.post_drive_boost1,
            &self.post_drive_boost2,
            &self.post_drive_boost3,
            &self.output_lowpass,
        ]
        .iter()
        .all(|f| f.is_cleared())
            && self.tone_stack.is_cleared()
    }
}

impl Default for SignalChain {
    fn default() -> Self {
        Self::new()
    }
}
