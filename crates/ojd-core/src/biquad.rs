//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a generic second-order IIR section whose coefficients are held in a
//! separate [`BiquadCoefficients`] value, so a new set can be computed on a
//! control thread and swapped in between audio blocks. First-order sections
//! are represented as biquads with `b2 = a2 = 0`.
//!
//! Peaking coefficients use the RBJ Audio EQ Cookbook formulas; the first-order
//! sections use the bilinear transform with frequency prewarping.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, tanf};

use crate::{Effect, flush_denormal};

/// Normalized biquad coefficients (`a0` divided out).
///
/// ```text
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficients
    pub b0: f32,
    /// Feedforward coefficient for x[n-1]
    pub b1: f32,
    /// Feedforward coefficient for x[n-2]
    pub b2: f32,
    /// Feedback coefficient for y[n-1]
    pub a1: f32,
    /// Feedback coefficient for y[n-2]
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Passthrough coefficients: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Builds a coefficient set from unnormalized cookbook terms.
    ///
    /// Divides every term by `a0`.
    pub fn from_unnormalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Returns `true` if every coefficient is a finite number.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Returns `true` if both poles lie strictly inside the unit circle.
    ///
    /// Uses the stability triangle for `1 + a1*z^-1 + a2*z^-2`:
    /// `|a2| < 1` and `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        self.is_finite() && self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Magnitude response at `frequency` Hz, linear.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (c1, s1) = (cosf(w), sinf(w));
        let (c2, s2) = (cosf(2.0 * w), sinf(2.0 * w));

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        libm::sqrtf((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Generic biquad filter state plus its current coefficients.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// Replacing the coefficients with [`set`](Self::set) keeps the delay line,
/// so a swap between blocks produces only the transient inherent to the new
/// filter.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self::with_coefficients(BiquadCoefficients::IDENTITY)
    }

    /// Creates a biquad with the given coefficients and cleared state.
    pub fn with_coefficients(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the coefficient set. The delay line is left untouched.
    #[inline]
    pub fn set(&mut self, coeffs: &BiquadCoefficients) {
        self.coeffs = *coeffs;
    }

    /// Current coefficient set.
    #[inline]
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Processes a single sample through the biquad filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);

        output
    }

    /// Clears the filter state (delay lines).
    ///
    /// Useful for resetting the filter without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Returns `true` if the delay lines hold only zeros.
    pub fn is_cleared(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Biquad {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        Biquad::process(self, input)
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = Biquad::process(self, *sample);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {
        // Coefficients are computed by the owner for the new rate.
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Calculates peaking EQ filter coefficients using the RBJ cookbook formula.
///
/// A peaking EQ boosts or cuts around a center frequency with a specified bandwidth.
///
/// # Arguments
///
/// * `frequency` - Center frequency in Hz
/// * `q` - Q factor (bandwidth = frequency / Q)
/// * `gain_db` - Gain in decibels (positive = boost, negative = cut)
/// * `sample_rate` - Sample rate in Hz
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0); // sqrt(10^(dB/20))
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha / a;

    BiquadCoefficients::from_unnormalized(b0, b1, b2, a0, a1, a2)
}

/// First-order highpass via the bilinear transform.
///
/// With `n = tan(pi * f / fs)`: `H(z) = (1 - z^-1) / ((n + 1) + (n - 1) z^-1)`.
pub fn first_order_highpass_coefficients(frequency: f32, sample_rate: f32) -> BiquadCoefficients {
    let n = tanf(PI * frequency / sample_rate);
    BiquadCoefficients::from_unnormalized(1.0, -1.0, 0.0, n + 1.0, n - 1.0, 0.0)
}

/// First-order lowpass via the bilinear transform.
///
/// With `n = tan(pi * f / fs)`: `H(z) = (n + n z^-1) / ((n + 1) + (n - 1) z^-1)`.
pub fn first_order_lowpass_coefficients(frequency: f32, sample_rate: f32) -> BiquadCoefficients {
    let n = tanf(PI * frequency / sample_rate);
    BiquadCoefficients::from_unnormalized(n, n, 0.0, n + 1.0, n - 1.0, 0.0)
}
