//! Polyphase half-band IIR oversampling for anti-aliased nonlinear processing.
//!
//! Static nonlinearities (clippers, waveshapers) generate harmonics that can
//! exceed Nyquist and alias back into the audible range. Oversampling
//! mitigates this by:
//!
//! 1. **Upsampling**: A cascade of 2× half-band interpolators raises the rate by `2^ORDER`
//! 2. **Processing**: The wrapped effect runs at the raised rate
//! 3. **Downsampling**: The mirrored cascade of 2× half-band decimators returns to the base rate
//!
//! Each 2× stage is an elliptic half-band lowpass decomposed into two parallel
//! allpass branches (polyphase form), so every branch runs at the lower of the
//! two rates and only first-order allpass sections are evaluated. The
//! coefficients are designed at construction from a stopband attenuation and
//! a normalized transition bandwidth; the first stage is the sharpest and the
//! later ones are progressively relaxed, since their transition bands sit far
//! above the audio band.
//!
//! The filters are minimum-phase-ish IIRs, so the group delay is not constant.
//! [`Oversampled::latency`] reports the DC group delay of the whole cascade in
//! base-rate samples, which is what hosts compensate for.
//!
//! ## Usage
//!
//! ```rust
//! use ojd_core::{Effect, Oversampled};
//!
//! struct HardClip;
//!
//! impl Effect for HardClip {
//!     fn process(&mut self, input: f32) -> f32 {
//!         input.clamp(-1.0, 1.0)
//!     }
//!     fn set_sample_rate(&mut self, _sample_rate: f32) {}
//!     fn reset(&mut self) {}
//! }
//!
//! // 2^4 = 16x oversampling: the clipper runs at 768 kHz
//! let mut clipper = Oversampled::<4, _>::new(HardClip, 48000.0);
//! assert_eq!(clipper.factor(), 16);
//! let _ = clipper.process(0.5);
//! ```

use libm::{ceil, cos, log, pow, sin, sqrt, tan};

use crate::{Effect, flush_denormal};

/// Maximum number of cascaded 2× stages.
pub const MAX_OVERSAMPLE_ORDER: usize = 4;

/// Maximum supported oversampling factor (`2^MAX_OVERSAMPLE_ORDER`).
pub const MAX_OVERSAMPLE_FACTOR: usize = 1 << MAX_OVERSAMPLE_ORDER;

/// Maximum allpass coefficients per half-band design.
const MAX_HALFBAND_COEFFS: usize = 12;

/// Maximum allpass sections per polyphase branch.
const MAX_BRANCH_SECTIONS: usize = MAX_HALFBAND_COEFFS.div_ceil(2);

/// Upper bound on the terms evaluated in the elliptic series.
const MAX_SERIES_TERMS: usize = 64;

/// Allpass coefficients of one half-band lowpass design.
///
/// Coefficients are stored in design order; even indices belong to the first
/// polyphase branch and odd indices to the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfbandCoefficients {
    coeffs: [f32; MAX_HALFBAND_COEFFS],
    len: usize,
}

impl HalfbandCoefficients {
    /// The designed coefficients.
    pub fn as_slice(&self) -> &[f32] {
        &self.coeffs[..self.len]
    }

    /// Number of first-order allpass sections in the design.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the design has no sections.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// DC group delay of the half-band filter, in samples at the oversampled rate.
    ///
    /// Each section `(a + z^-2) / (1 + a z^-2)` delays DC by `2(1 - a)/(1 + a)`;
    /// the second branch carries one extra sample of delay, and the two branch
    /// outputs are averaged.
    pub fn group_delay(&self) -> f32 {
        let section_delay = |a: &f32| 2.0 * (1.0 - a) / (1.0 + a);
        let branch_a: f32 = self.as_slice().iter().step_by(2).map(section_delay).sum();
        let branch_b: f32 = self.as_slice().iter().skip(1).step_by(2).map(section_delay).sum();
        0.5 * (branch_a + 1.0 + branch_b)
    }
}

/// Designs an elliptic half-band lowpass as two parallel allpass chains.
///
/// # Arguments
/// * `attenuation_db` - Minimum stopband attenuation in dB
/// * `transition` - Transition bandwidth, normalized to the oversampled rate
///   (`0 < transition < 0.5`); the passband ends at `0.25 - transition`
///
/// The filter order is the smallest odd order meeting the attenuation,
/// at least 3, capped so that the design fits in a fixed-size array.
///
/// Reference: Valenzuela & Constantinides, "Digital signal processing schemes
/// for efficient interpolation and decimation" (1983).
pub fn design_halfband(attenuation_db: f32, transition: f32) -> HalfbandCoefficients {
    let transition = f64::from(transition).clamp(1e-4, 0.4999);
    let (k, q) = transition_param(transition);

    let order = filter_order(f64::from(attenuation_db), q).min(2 * MAX_HALFBAND_COEFFS + 1);
    let len = (order - 1) / 2;

    let mut coeffs = [0.0; MAX_HALFBAND_COEFFS];
    for (index, coeff) in coeffs.iter_mut().enumerate().take(len) {
        *coeff = allpass_coefficient(k, q, order, index) as f32;
    }

    HalfbandCoefficients { coeffs, len }
}

/// Selectivity `k` and nome `q` of the elliptic prototype.
fn transition_param(transition: f64) -> (f64, f64) {
    let k = tan((1.0 - transition * 2.0) * core::f64::consts::FRAC_PI_4);
    let k = k * k;
    let kk = sqrt(sqrt(1.0 - k * k));
    let e = 0.5 * (1.0 - kk) / (1.0 + kk);
    let e4 = e * e * e * e;
    let q = e * (1.0 + e4 * (2.0 + e4 * (15.0 + 150.0 * e4)));
    (k, q)
}

fn filter_order(attenuation_db: f64, q: f64) -> usize {
    let p = pow(10.0, -attenuation_db / 10.0);
    let a = p / (1.0 - p);
    let order = ceil(log(a * a / 16.0) / log(q)).max(3.0) as usize;
    if order % 2 == 0 { order + 1 } else { order }
}

fn allpass_coefficient(k: f64, q: f64, order: usize, index: usize) -> f64 {
    let c = (index + 1) as f64;
    let order = order as f64;

    let mut num = 0.0;
    let mut sign = 1.0;
    for i in 0..MAX_SERIES_TERMS {
        let i = i as f64;
        let term = pow(q, i * (i + 1.0)) * sin((i * 2.0 + 1.0) * c * core::f64::consts::PI / order) * sign;
        num += term;
        sign = -sign;
        if term.abs() <= 1e-100 {
            break;
        }
    }

    let mut den = 0.0;
    let mut sign = -1.0;
    for i in 1..=MAX_SERIES_TERMS {
        let i = i as f64;
        let term = pow(q, i * i) * cos(i * 2.0 * c * core::f64::consts::PI / order) * sign;
        den += term;
        sign = -sign;
        if term.abs() <= 1e-100 {
            break;
        }
    }

    let ww = num * sqrt(sqrt(q)) / (den + 0.5);
    let ww2 = ww * ww;
    let x = sqrt((1.0 - ww2 * k) * (1.0 - ww2 / k)) / (1.0 + ww2);
    (1.0 - x) / (1.0 + x)
}

/// Cascade of first-order allpass sections `y = (a + z^-1) / (1 + a z^-1)`.
#[derive(Debug, Clone, Copy)]
struct AllpassBranch {
    coeffs: [f32; MAX_BRANCH_SECTIONS],
    state: [f32; MAX_BRANCH_SECTIONS],
    len: usize,
}

impl AllpassBranch {
    fn new<'a>(coeffs: impl Iterator<Item = &'a f32>) -> Self {
        let mut branch = Self {
            coeffs: [0.0; MAX_BRANCH_SECTIONS],
            state: [0.0; MAX_BRANCH_SECTIONS],
            len: 0,
        };
        for (slot, &a) in branch.coeffs.iter_mut().zip(coeffs) {
            *slot = a;
            branch.len += 1;
        }
        branch
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let mut y = x;
        for (a, s) in self.coeffs[..self.len].iter().zip(self.state[..self.len].iter_mut()) {
            let input = y;
            y = a * input + *s;
            *s = flush_denormal(input - a * y);
        }
        y
    }

    fn reset(&mut self) {
        self.state = [0.0; MAX_BRANCH_SECTIONS];
    }
}

/// One 2× interpolation/decimation stage.
#[derive(Debug, Clone, Copy)]
struct HalfbandStage {
    up_a: AllpassBranch,
    up_b: AllpassBranch,
    down_a: AllpassBranch,
    down_b: AllpassBranch,
    /// Second-branch output held for one low-rate sample
    down_delay: f32,
    /// Combined up + down DC group delay at this stage's high rate
    group_delay: f32,
}

impl HalfbandStage {
    /// Stage `index` counts outward from the base rate.
    fn new(index: usize) -> Self {
        let relax = if index == 0 { 0.5 } else { 1.0 };
        let up = design_halfband(75.0 - 10.0 * index as f32, 0.10 * relax);
        let down = design_halfband(70.0 - 10.0 * index as f32, 0.12 * relax);

        Self {
            up_a: AllpassBranch::new(up.as_slice().iter().step_by(2)),
            up_b: AllpassBranch::new(up.as_slice().iter().skip(1).step_by(2)),
            down_a: AllpassBranch::new(down.as_slice().iter().step_by(2)),
            down_b: AllpassBranch::new(down.as_slice().iter().skip(1).step_by(2)),
            down_delay: 0.0,
            group_delay: up.group_delay() + down.group_delay(),
        }
    }

    #[inline]
    fn upsample(&mut self, x: f32) -> (f32, f32) {
        (self.up_a.process(x), self.up_b.process(x))
    }

    #[inline]
    fn downsample(&mut self, even: f32, odd: f32) -> f32 {
        let out = (self.down_a.process(even) + self.down_delay) * 0.5;
        self.down_delay = self.down_b.process(odd);
        out
    }

    fn reset(&mut self) {
        self.up_a.reset();
        self.up_b.reset();
        self.down_a.reset();
        self.down_b.reset();
        self.down_delay = 0.0;
    }
}

/// Oversampling wrapper for any effect.
///
/// Wraps an effect with `ORDER` cascaded 2× half-band stages, so the inner
/// effect runs at `2^ORDER` times the base sample rate.
///
/// # Signal Path
///
/// ```text
/// Input → [2× half-band up] × ORDER → Effect at 2^ORDER × fs → [2× half-band down] × ORDER → Output
/// ```
///
/// # Type Parameters
///
/// - `ORDER`: Number of 2× stages (1 to [`MAX_OVERSAMPLE_ORDER`])
/// - `E`: The effect type being wrapped
///
/// # Memory Usage
///
/// Fixed-size arrays only, suitable for `no_std`; nothing allocates after
/// construction.
#[derive(Debug, Clone)]
pub struct Oversampled<const ORDER: usize, E: Effect> {
    /// The wrapped effect
    effect: E,
    /// Base sample rate (before oversampling)
    sample_rate: f32,
    /// Stage 0 sits next to the base rate
    stages: [HalfbandStage; ORDER],
    /// Buffer for upsampled/processed signal
    work_buffer: [f32; MAX_OVERSAMPLE_FACTOR],
    /// Ping-pong partner of `work_buffer` while interpolating
    scratch: [f32; MAX_OVERSAMPLE_FACTOR],
}

impl<const ORDER: usize, E: Effect> Oversampled<ORDER, E> {
    /// Oversampling factor, `2^ORDER`.
    pub const FACTOR: usize = 1 << ORDER;

    /// Create a new oversampled effect wrapper.
    ///
    /// # Arguments
    /// * `effect` - The effect to wrap
    /// * `sample_rate` - Base sample rate in Hz
    ///
    /// # Panics
    /// Panics if `ORDER` is 0 or greater than [`MAX_OVERSAMPLE_ORDER`].
    pub fn new(mut effect: E, sample_rate: f32) -> Self {
        assert!(
            (1..=MAX_OVERSAMPLE_ORDER).contains(&ORDER),
            "Oversample order must be between 1 and 4"
        );

        effect.set_sample_rate(sample_rate * Self::FACTOR as f32);

        let oversampled = Self {
            effect,
            sample_rate,
            stages: core::array::from_fn(HalfbandStage::new),
            work_buffer: [0.0; MAX_OVERSAMPLE_FACTOR],
            scratch: [0.0; MAX_OVERSAMPLE_FACTOR],
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            factor = Self::FACTOR,
            latency = oversampled.latency(),
            "half-band oversampler designed"
        );

        oversampled
    }

    /// Get a reference to the inner effect.
    pub fn inner(&self) -> &E {
        &self.effect
    }

    /// Get the oversampling factor.
    pub fn factor(&self) -> usize {
        Self::FACTOR
    }

    /// Base sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Total DC group delay in base-rate samples, including the inner effect.
    ///
    /// A stage at index `n` runs its filters at `2^(n+1)` times the base rate,
    /// so its delay is scaled down accordingly.
    pub fn latency(&self) -> f32 {
        let filters: f32 = self
            .stages
            .iter()
            .enumerate()
            .map(|(n, stage)| stage.group_delay / (1u32 << (n + 1)) as f32)
            .sum();
        filters + self.effect.latency_samples() as f32 / Self::FACTOR as f32
    }

    #[inline]
    fn upsample(&mut self, input: f32) {
        self.work_buffer[0] = input;
        let mut len = 1;
        for stage in &mut self.stages {
            for i in 0..len {
                let (even, odd) = stage.upsample(self.work_buffer[i]);
                self.scratch[2 * i] = even;
                self.scratch[2 * i + 1] = odd;
            }
            len *= 2;
            self.work_buffer[..len].copy_from_slice(&self.scratch[..len]);
        }
    }

    #[inline]
    fn downsample(&mut self) -> f32 {
        let mut len = Self::FACTOR;
        for stage in self.stages.iter_mut().rev() {
            len /= 2;
            // In place: slot i is written only after slots 2i and 2i+1 are read.
            for i in 0..len {
                self.work_buffer[i] = stage.downsample(self.work_buffer[2 * i], self.work_buffer[2 * i + 1]);
            }
        }
        self.work_buffer[0]
    }
}

impl<const ORDER: usize, E: Effect> Effect for Oversampled<ORDER, E> {
    fn process(&mut self, input: f32) -> f32 {
        self.upsample(input);

        for sample in &mut self.work_buffer[..Self::FACTOR] {
            *sample = self.effect.process(*sample);
        }

        self.downsample()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        // The half-band designs are rate-independent.
        self.sample_rate = sample_rate;
        self.effect.set_sample_rate(sample_rate * Self::FACTOR as f32);
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.work_buffer = [0.0; MAX_OVERSAMPLE_FACTOR];
        self.scratch = [0.0; MAX_OVERSAMPLE_FACTOR];
        self.effect.reset();
    }

    fn latency_samples(&self) -> usize {
        self.latency() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    /// Simple pass-through effect for testing
    struct Passthrough;

    impl Effect for Passthrough {
        fn process(&mut self, input: f32) -> f32 {
            input
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    /// Gain effect for testing
    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    /// Records the rate it was configured with
    struct RateProbe(f32);

    impl Effect for RateProbe {
        fn process(&mut self, input: f32) -> f32 {
            input
        }
        fn set_sample_rate(&mut self, sample_rate: f32) {
            self.0 = sample_rate;
        }
        fn reset(&mut self) {}
    }

    /// |H(f)| of the polyphase half-band at normalized frequency `f`.
    fn halfband_magnitude(design: &HalfbandCoefficients, f: f64) -> f64 {
        let w = 2.0 * core::f64::consts::PI * f;
        let mul = |(ar, ai): (f64, f64), (br, bi): (f64, f64)| (ar * br - ai * bi, ar * bi + ai * br);
        let div = |(ar, ai): (f64, f64), (br, bi): (f64, f64)| {
            let d = br * br + bi * bi;
            ((ar * br + ai * bi) / d, (ai * br - ar * bi) / d)
        };
        let z2 = (cos(-2.0 * w), sin(-2.0 * w));
        let z1 = (cos(-w), sin(-w));

        let mut branches = [(1.0, 0.0), (1.0, 0.0)];
        for (i, &a) in design.as_slice().iter().enumerate() {
            let a = f64::from(a);
            let section = div((a + z2.0, z2.1), (1.0 + a * z2.0, a * z2.1));
            branches[i % 2] = mul(branches[i % 2], section);
        }
        let delayed = mul(z1, branches[1]);
        let (re, im) = (0.5 * (branches[0].0 + delayed.0), 0.5 * (branches[0].1 + delayed.1));
        sqrt(re * re + im * im)
    }

    #[test]
    fn design_section_counts() {
        let expected = [(6, 5), (4, 4), (4, 3), (3, 3)];
        for (n, &(up, down)) in expected.iter().enumerate() {
            let relax = if n == 0 { 0.5 } else { 1.0 };
            let up_design = design_halfband(75.0 - 10.0 * n as f32, 0.10 * relax);
            let down_design = design_halfband(70.0 - 10.0 * n as f32, 0.12 * relax);
            assert_eq!(up_design.len(), up, "stage {n} interpolator");
            assert_eq!(down_design.len(), down, "stage {n} decimator");
        }
    }

    #[test]
    fn design_coefficients_are_stable_allpasses() {
        let design = design_halfband(75.0, 0.05);
        for &a in design.as_slice() {
            assert!(a > 0.0 && a < 1.0, "allpass coefficient out of range: {a}");
        }
        let slice = design.as_slice();
        assert!(slice.windows(2).all(|w| w[0] < w[1]), "coefficients should ascend");
    }

    #[test]
    fn design_meets_attenuation() {
        let design = design_halfband(75.0, 0.05);
        let passband = halfband_magnitude(&design, 0.1);
        assert!((passband - 1.0).abs() < 1e-3, "passband gain {passband}");

        for f in [0.3, 0.35, 0.4, 0.45] {
            let db = 20.0 * libm::log10(halfband_magnitude(&design, f));
            assert!(db < -70.0, "stopband at {f} only {db} dB");
        }
    }

    #[test]
    fn latency_of_sixteen_times() {
        let oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);
        let latency = oversampled.latency();
        assert!((latency - 4.6046).abs() < 0.01, "latency {latency}");
        assert_eq!(oversampled.latency_samples(), 4);
    }

    #[test]
    fn inner_runs_at_oversampled_rate() {
        let mut oversampled = Oversampled::<4, _>::new(RateProbe(0.0), SAMPLE_RATE);
        assert_eq!(oversampled.inner().0, SAMPLE_RATE * 16.0);

        oversampled.set_sample_rate(44100.0);
        assert_eq!(oversampled.inner().0, 44100.0 * 16.0);
        assert_eq!(oversampled.sample_rate(), 44100.0);
    }

    #[test]
    fn passthrough_dc_unity() {
        let mut oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);

        for _ in 0..500 {
            oversampled.process(1.0);
        }

        let output = oversampled.process(1.0);
        assert!(
            (output - 1.0).abs() < 1e-3,
            "Passthrough should be near unity, got {}",
            output
        );
    }

    #[test]
    fn gain_preserved() {
        let mut oversampled = Oversampled::<2, _>::new(Gain(0.5), SAMPLE_RATE);

        for _ in 0..500 {
            oversampled.process(1.0);
        }

        let output = oversampled.process(1.0);
        assert!(
            (output - 0.5).abs() < 1e-3,
            "Gain should be ~0.5, got {}",
            output
        );
    }

    #[test]
    fn passband_sine_amplitude() {
        let mut oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);
        let freq = 1000.0;
        let mut peak: f32 = 0.0;
        for n in 0..9600 {
            let x = libm::sinf(2.0 * core::f32::consts::PI * freq * n as f32 / SAMPLE_RATE);
            let y = oversampled.process(x);
            if n > 4800 {
                peak = peak.max(y.abs());
            }
        }
        assert!((peak - 1.0).abs() < 0.01, "1 kHz peak {peak}");
    }

    #[test]
    fn silence_is_exact() {
        let mut oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);
        for _ in 0..64 {
            assert_eq!(oversampled.process(0.0), 0.0);
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);

        for _ in 0..100 {
            oversampled.process(1.0);
        }

        oversampled.reset();

        for _ in 0..16 {
            assert_eq!(oversampled.process(0.0), 0.0, "reset must clear every allpass state");
        }
    }

    #[test]
    fn factor_matches_order() {
        assert_eq!(Oversampled::<1, Passthrough>::FACTOR, 2);
        assert_eq!(Oversampled::<3, Passthrough>::FACTOR, 8);
        let oversampled = Oversampled::<4, _>::new(Passthrough, SAMPLE_RATE);
        assert_eq!(oversampled.factor(), MAX_OVERSAMPLE_FACTOR);
    }
}
