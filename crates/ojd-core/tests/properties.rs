//! Property-based tests for ojd-core DSP primitives.
//!
//! Tests filter stability, gain ramp behaviour and oversampler boundedness
//! using proptest for randomized input generation.

use proptest::prelude::*;
use ojd_core::{
    Biquad, Effect, Gain, Oversampled, first_order_highpass_coefficients,
    first_order_lowpass_coefficients, peaking_eq_coefficients,
};

/// Hard clipper used as a stand-in nonlinearity.
struct Clip;

impl Effect for Clip {
    fn process(&mut self, input: f32) -> f32 {
        input.clamp(-1.0, 1.0)
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {}
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Peaking sections over the audio band at typical rates keep their
    /// poles inside the unit circle for any Q and boost/cut.
    #[test]
    fn peaking_is_stable(
        freq in 20.0f32..16000.0f32,
        q in 0.05f32..10.0f32,
        gain_db in -40.0f32..40.0f32,
        sample_rate in prop::sample::select(vec![44100.0f32, 48000.0, 96000.0]),
    ) {
        let coeffs = peaking_eq_coefficients(freq, q, gain_db, sample_rate);
        prop_assert!(coeffs.is_finite(), "non-finite coefficients {:?}", coeffs);
        prop_assert!(coeffs.is_stable(), "unstable coefficients {:?}", coeffs);
    }

    /// First-order sections below Nyquist are stable and produce finite output.
    #[test]
    fn first_order_stability(
        freq in 10.0f32..20000.0f32,
        highpass in any::<bool>(),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let coeffs = if highpass {
            first_order_highpass_coefficients(freq, 48000.0)
        } else {
            first_order_lowpass_coefficients(freq, 48000.0)
        };
        prop_assert!(coeffs.is_stable());

        let mut biquad = Biquad::with_coefficients(coeffs);
        for &sample in &input {
            let out = biquad.process(sample);
            prop_assert!(out.is_finite());
            prop_assert!(out.abs() <= 2.0, "first-order output {} exceeds bound", out);
        }
    }

    /// A ramp never overshoots the segment between start and target.
    #[test]
    fn gain_ramp_stays_between_endpoints(
        start in 0.0f32..4.0f32,
        target in 0.0f32..4.0f32,
        ramp_ms in 0.0f32..50.0f32,
    ) {
        let mut gain = Gain::with_linear(start);
        gain.set_sample_rate(48000.0);
        gain.set_ramp_duration_ms(ramp_ms);
        gain.set_gain_linear(target);

        let (lo, hi) = if start < target { (start, target) } else { (target, start) };
        let samples = (ramp_ms / 1000.0 * 48000.0) as usize + 1;
        let mut last = 0.0;
        for _ in 0..samples {
            last = gain.process(1.0);
            prop_assert!(last >= lo - 1e-4 && last <= hi + 1e-4, "{} outside [{}, {}]", last, lo, hi);
        }
        prop_assert!((last - target).abs() < 1e-4);
    }

    /// Clipped signals leaving the 16x oversampler stay finite and within the
    /// L1 norm of the decimation cascade (about 3.02).
    #[test]
    fn oversampled_clipper_is_bounded(
        input in prop::collection::vec(-100.0f32..100.0f32, 64..256),
    ) {
        let mut clipper = Oversampled::<4, _>::new(Clip, 48000.0);
        for &sample in &input {
            let out = clipper.process(sample);
            prop_assert!(out.is_finite());
            prop_assert!(out.abs() < 3.1, "oversampled clipper output {} out of bounds", out);
        }
    }
}
