//! Gain stage: `output[n] = input[n] * gain`.
//!
//! The gain can be set in linear units or in decibels (`gain = 10^(dB/20)`).
//! Changes are stepped unless a ramp duration is configured, in which case
//! the multiplier moves linearly to the new value over that duration.
//!
//! # Usage
//!
//! ```rust
//! use ojd_core::{Effect, Gain};
//!
//! let mut gain = Gain::new();
//! gain.set_gain_decibels(-6.0206);
//!
//! let mut block = [1.0f32; 4];
//! gain.process_block_inplace(&mut block);
//! assert!((block[0] - 0.5).abs() < 1e-4);
//! ```

use crate::{Effect, LinearRamp, db_to_linear, linear_to_db};

/// Per-sample multiplier with optional linear ramping.
#[derive(Debug, Clone)]
pub struct Gain {
    gain: LinearRamp,
}

impl Gain {
    /// Unity gain, stepped changes.
    pub fn new() -> Self {
        Self {
            gain: LinearRamp::new(1.0),
        }
    }

    /// Fixed linear gain, stepped changes.
    pub fn with_linear(gain: f32) -> Self {
        Self {
            gain: LinearRamp::new(gain),
        }
    }

    /// Set the multiplier in linear units.
    #[inline]
    pub fn set_gain_linear(&mut self, gain: f32) {
        self.gain.set_target(gain);
    }

    /// Set the multiplier in decibels.
    #[inline]
    pub fn set_gain_decibels(&mut self, db: f32) {
        self.gain.set_target(db_to_linear(db));
    }

    /// Target multiplier in linear units.
    #[inline]
    pub fn gain_linear(&self) -> f32 {
        self.gain.target()
    }

    /// Target multiplier in decibels.
    #[inline]
    pub fn gain_decibels(&self) -> f32 {
        linear_to_db(self.gain.target())
    }

    /// Ramp duration for subsequent changes. Zero means stepped.
    pub fn set_ramp_duration_ms(&mut self, ms: f32) {
        self.gain.set_duration_ms(ms.max(0.0));
    }

    /// Returns `true` while a ramp is in progress.
    pub fn is_ramping(&self) -> bool {
        !self.gain.is_settled()
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Gain {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain.tick()
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        if self.gain.is_settled() {
            let g = self.gain.value();
            for sample in buffer.iter_mut() {
                *sample *= g;
            }
        } else {
            for sample in buffer.iter_mut() {
                *sample *= self.gain.tick();
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.gain.finish();
    }
}
