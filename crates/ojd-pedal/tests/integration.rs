//! End-to-end behavior of the pedal through its host-facing surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use ojd_core::ProcessSpec;
use ojd_pedal::params::switch_raw;
use ojd_pedal::{
    CoefficientExchange, DriveBands, DriveCoefficients, OjdParam, OjdProcessor, PedalParams,
    ToneMode, drive_coefficients,
};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 256;

fn prepared(params: &Arc<PedalParams>) -> OjdProcessor {
    let mut pedal = OjdProcessor::new(params.clone());
    pedal
        .prepare(&ProcessSpec::mono(SAMPLE_RATE, BLOCK), &mut |_: usize| {})
        .expect("valid spec");
    pedal
}

fn noise(len: usize, seed: u32) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

#[test]
fn zero_drive_lp_bands() {
    let bands = DriveBands::new(0.0, ToneMode::Lp);
    assert!((bands.pre_drive_boost.frequency - 1600.0).abs() < 1e-3);
    assert!((bands.pre_drive_boost.q - 0.15).abs() < 1e-6);
    assert!((bands.pre_drive_boost.gain_db - 4.0).abs() < 1e-6);
    assert!((bands.post_drive_boost3.gain_db - 16.9).abs() < 1e-6);

    let coeffs = bands.coefficients(SAMPLE_RATE as f32);
    let peak = coeffs.pre_drive_boost.magnitude_at(1600.0, SAMPLE_RATE as f32);
    assert!((20.0 * peak.log10() - 4.0).abs() < 0.05);
}

#[test]
fn full_drive_hp_bands() {
    let bands = DriveBands::new(1.0, ToneMode::Hp);
    assert!((bands.pre_drive_boost.frequency - 700.0).abs() < 1e-3);
    assert!((bands.pre_drive_boost.q - 0.05).abs() < 1e-6);
    assert!((bands.pre_drive_boost.gain_db - 36.0).abs() < 1e-6);
    assert!((bands.post_drive_boost1.frequency - 2052.0).abs() < 1e-3);
    assert!((bands.post_drive_boost1.gain_db - 4.6).abs() < 1e-6);
}

#[test]
fn silence_stays_silent() {
    let params = Arc::new(PedalParams::new());
    let mut pedal = prepared(&params);

    let mut block = vec![0.0f32; BLOCK];
    for _ in 0..8 {
        pedal.process(&mut block);
        assert!(block.iter().all(|&s| s == 0.0), "DC offset introduced");
    }
}

#[test]
fn mode_switch_between_blocks() {
    let params = Arc::new(PedalParams::new());
    let mut pedal = prepared(&params);
    let input = noise(BLOCK, 7);

    let mut block = input.clone();
    pedal.process(&mut block);
    assert_eq!(pedal.chain().tone_stack().crossover_hz(), 160.0);

    let raw = params.set(OjdParam::HpLp, switch_raw(true));
    pedal.bridge().parameter_changed(OjdParam::HpLp, raw);
    for _ in 0..4 {
        let mut block = input.clone();
        pedal.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }
    assert_eq!(pedal.chain().tone_stack().crossover_hz(), 358.0);

    let raw = params.set(OjdParam::HpLp, switch_raw(false));
    pedal.bridge().parameter_changed(OjdParam::HpLp, raw);
    let mut block = input;
    pedal.process(&mut block);
    assert!(block.iter().all(|s| s.is_finite()));
    assert_eq!(pedal.chain().tone_stack().crossover_hz(), 160.0);
}

#[test]
fn latency_ignores_parameters() {
    let reference = prepared(&Arc::new(PedalParams::new())).latency_samples();

    for (drive, tone, volume, hp) in [(0.0, 0.0, 0.0, false), (10.0, 10.0, 10.0, true), (3.3, 7.1, 5.0, true)] {
        let params = Arc::new(PedalParams::new());
        params.set(OjdParam::Drive, drive);
        params.set(OjdParam::Tone, tone);
        params.set(OjdParam::Volume, volume);
        params.set(OjdParam::HpLp, switch_raw(hp));

        let mut reported = usize::MAX;
        let mut pedal = OjdProcessor::new(params);
        pedal
            .prepare(&ProcessSpec::mono(SAMPLE_RATE, BLOCK), &mut |n: usize| reported = n)
            .expect("valid spec");
        assert_eq!(reported, reference);
    }
}

#[test]
fn prepare_is_idempotent() {
    let params = Arc::new(PedalParams::new());
    params.set(OjdParam::Drive, 6.0);
    let spec = ProcessSpec::mono(SAMPLE_RATE, BLOCK);
    let input = noise(BLOCK, 42);

    let mut pedal = OjdProcessor::new(params.clone());
    pedal.prepare(&spec, &mut |_: usize| {}).expect("valid spec");
    let first_coeffs = pedal.chain().drive_coefficients();
    let first_tone = pedal.chain().tone_stack().branch_coefficients();
    let mut first = input.clone();
    pedal.process(&mut first);

    pedal.prepare(&spec, &mut |_: usize| {}).expect("valid spec");
    assert!(pedal.chain().is_cleared());
    assert_eq!(pedal.chain().drive_coefficients(), first_coeffs);
    assert_eq!(pedal.chain().tone_stack().branch_coefficients(), first_tone);

    let mut second = input;
    pedal.process(&mut second);
    assert_eq!(first, second);
}

#[test]
fn reset_matches_fresh_prepare() {
    let params = Arc::new(PedalParams::new());
    let input = noise(BLOCK, 3);

    let mut fresh = prepared(&params);
    let mut expected = input.clone();
    fresh.process(&mut expected);

    let mut used = prepared(&params);
    let mut scratch = noise(BLOCK, 99);
    used.process(&mut scratch);
    used.reset();
    let mut actual = input;
    used.process(&mut actual);

    assert_eq!(actual, expected);
}

#[test]
fn drive_automation_reaches_audio_thread() {
    let params = Arc::new(PedalParams::new());
    let mut pedal = prepared(&params);
    let bridge = Arc::clone(pedal.bridge());

    let control = thread::spawn(move || {
        bridge.parameter_changed(OjdParam::Drive, 10.0);
    });
    control.join().expect("control thread");

    let mut block = vec![0.0f32; BLOCK];
    pedal.process(&mut block);
    let expected = drive_coefficients(SAMPLE_RATE, 1.0, ToneMode::Lp).expect("valid rate");
    assert_eq!(pedal.chain().drive_coefficients(), expected);
}

#[test]
fn concurrent_reads_never_tear() {
    let candidates: Vec<DriveCoefficients> = (0..=10)
        .map(|i| drive_coefficients(SAMPLE_RATE, i as f32 / 10.0, ToneMode::Hp).expect("valid rate"))
        .collect();

    let exchange = Arc::new(CoefficientExchange::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let exchange = Arc::clone(&exchange);
        let done = Arc::clone(&done);
        let candidates = candidates.clone();
        thread::spawn(move || {
            let mut i = 0;
            while !done.load(Ordering::Relaxed) {
                exchange.publish(&candidates[i % candidates.len()]);
                i += 1;
            }
        })
    };

    let mut last = 0;
    let mut reads = 0;
    for _ in 0..200_000 {
        if let Some((sequence, coeffs)) = exchange.read_if_newer(last) {
            assert!(sequence > last, "sequence went backwards");
            assert!(candidates.contains(&coeffs), "torn read: {coeffs:?}");
            last = sequence;
            reads += 1;
        }
    }
    done.store(true, Ordering::Relaxed);
    writer.join().expect("writer thread");

    // The writer had the whole loop to publish at least once.
    assert!(reads > 0 || exchange.sequence() > 0);
}

#[test]
fn rates_commonly_used_by_hosts() {
    for sample_rate in [44100.0, 48000.0, 88200.0, 96000.0, 192000.0] {
        let params = Arc::new(PedalParams::new());
        params.set(OjdParam::Drive, 10.0);
        let mut pedal = OjdProcessor::new(params);
        pedal
            .prepare(&ProcessSpec::mono(sample_rate, 512), &mut |_: usize| {})
            .expect("valid spec");
        assert!(pedal.chain().drive_coefficients().is_stable());

        let mut block = noise(512, 11);
        pedal.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()), "non-finite output at {sample_rate} Hz");
    }
}
