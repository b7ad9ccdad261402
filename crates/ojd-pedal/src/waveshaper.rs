//! The clipping stage: a piecewise soft clipper run at 16× the host rate.
//!
//! The transfer curve is linear between -0.3 and 0.9 and bends into the
//! rails with parabolic knees whose slope matches at both joins:
//!
//! ```text
//!  in <= -1.7          -> -1
//!  -1.7 < in < -0.3    -> x + x² / (4 (1 - 0.3)) - 0.3,  x = in + 0.3
//!  -0.3 <= in <= 0.9   -> in
//!  0.9 < in < 1.1      -> x - x² / (4 (1 - 0.9)) + 0.9,  x = in - 0.9
//!  in >= 1.1           -> 1
//! ```
//!
//! The asymmetry (the negative knee is seven times wider than the positive
//! one) is what gives the pedal its even harmonics.

use ojd_core::{Effect, Oversampled};

/// Number of cascaded 2× stages around the clipper (16×).
pub const OVERSAMPLING_ORDER: usize = 4;

const NEGATIVE_KNEE: f32 = 0.3;
const POSITIVE_KNEE: f32 = 0.9;

/// Applies the transfer curve to one sample.
///
/// ```rust
/// use ojd_pedal::waveshaper::shape;
///
/// assert_eq!(shape(0.5), 0.5);
/// assert_eq!(shape(2.0), 1.0);
/// assert_eq!(shape(-2.0), -1.0);
/// ```
#[inline]
pub fn shape(input: f32) -> f32 {
    if input <= -1.7 {
        -1.0
    } else if input < -NEGATIVE_KNEE {
        let x = input + NEGATIVE_KNEE;
        x + x * x / (4.0 * (1.0 - NEGATIVE_KNEE)) - NEGATIVE_KNEE
    } else if input > POSITIVE_KNEE && input < 1.1 {
        let x = input - POSITIVE_KNEE;
        x - x * x / (4.0 * (1.0 - POSITIVE_KNEE)) + POSITIVE_KNEE
    } else if input >= 1.1 {
        1.0
    } else {
        input
    }
}

/// The transfer curve as a stateless [`Effect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Shaper;

impl Effect for Shaper {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        shape(input)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Oversampled clipper, chain stage 5.
#[derive(Debug, Clone)]
pub struct Waveshaper {
    inner: Oversampled<OVERSAMPLING_ORDER, Shaper>,
}

impl Waveshaper {
    /// Creates the clipper for a base rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            inner: Oversampled::new(Shaper, sample_rate),
        }
    }

    /// Oversampling factor.
    pub fn oversampling_factor(&self) -> usize {
        self.inner.factor()
    }

    /// Group delay of the oversampling filters in base-rate samples.
    ///
    /// Fractional and independent of the signal and of every parameter.
    pub fn latency(&self) -> f32 {
        self.inner.latency()
    }
}

impl Default for Waveshaper {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Effect for Waveshaper {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.inner.process(input)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.inner.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn latency_samples(&self) -> usize {
        self.inner.latency_samples()
    }
}
