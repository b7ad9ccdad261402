//! Control-rate side of the pedal: turns parameter changes into published
//! coefficient sets.
//!
//! The bridge remembers the last Drive, HP/LP mode and sample rate it saw.
//! A change to any of them recomputes all five peaking sets and publishes
//! them on the [`CoefficientExchange`], where the processor picks them up at
//! the start of its next block. Tone and Volume never come through here;
//! the processor reads them directly every block.

use parking_lot::Mutex;

use crate::coefficients::{DriveCoefficients, drive_coefficients};
use crate::exchange::CoefficientExchange;
use crate::params::{OjdParam, ParameterSource, normalise, tone_mode};
use crate::tone_stack::ToneMode;

#[derive(Debug, Clone, Copy)]
struct BridgeState {
    sample_rate: f64,
    /// Normalised Drive, 0..1
    drive: f32,
    mode: ToneMode,
}

impl BridgeState {
    fn compute(&self) -> Option<DriveCoefficients> {
        drive_coefficients(self.sample_rate, self.drive, self.mode)
    }
}

/// Recomputes and publishes drive coefficients at control rate.
///
/// Shared between the host's parameter thread(s) and the processor through
/// an `Arc`. Every method may allocate or block briefly; none is called from
/// the audio path.
#[derive(Debug)]
pub struct ParameterBridge {
    state: Mutex<BridgeState>,
    exchange: CoefficientExchange,
}

impl ParameterBridge {
    /// A bridge with no sample rate yet. Nothing is published until
    /// [`prepare`](Self::prepare) or [`set_sample_rate`](Self::set_sample_rate).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BridgeState {
                sample_rate: 0.0,
                drive: normalise(OjdParam::Drive.descriptor().default),
                mode: ToneMode::default(),
            }),
            exchange: CoefficientExchange::new(),
        }
    }

    /// Parameter change notification.
    ///
    /// Recomputes for Drive and HpLp only; other ids are ignored. Returns the
    /// publication sequence, or `None` if nothing was published (ignored id
    /// or no valid sample rate yet).
    pub fn parameter_changed(&self, param: OjdParam, raw: f32) -> Option<u64> {
        if !param.affects_coefficients() {
            return None;
        }

        let mut state = self.state.lock();
        match param {
            OjdParam::Drive => state.drive = normalise(raw),
            OjdParam::HpLp => state.mode = tone_mode(raw),
            _ => {}
        }
        self.recompute(&state)
    }

    /// Records a new sample rate and republishes.
    ///
    /// A zero, negative or non-finite rate is ignored and the previous rate
    /// stays in effect.
    pub fn set_sample_rate(&self, sample_rate: f64) -> Option<u64> {
        if !is_usable_rate(sample_rate) {
            tracing::debug!(sample_rate, "ignoring unusable sample rate");
            return None;
        }
        let mut state = self.state.lock();
        state.sample_rate = sample_rate;
        self.recompute(&state)
    }

    /// Resynchronizes with `source` at a new sample rate and publishes.
    ///
    /// Returns the published sequence and set so the caller can install them
    /// directly, or `None` for an unusable sample rate, in which case the
    /// bridge state is left as it was.
    pub fn prepare(&self, sample_rate: f64, source: &dyn ParameterSource) -> Option<(u64, DriveCoefficients)> {
        if !is_usable_rate(sample_rate) {
            tracing::debug!(sample_rate, "ignoring unusable sample rate");
            return None;
        }
        let mut state = self.state.lock();
        state.sample_rate = sample_rate;
        state.drive = normalise(source.raw_value(OjdParam::Drive));
        state.mode = tone_mode(source.raw_value(OjdParam::HpLp));

        let coeffs = state.compute()?;
        let sequence = self.exchange.publish(&coeffs);
        Some((sequence, coeffs))
    }

    /// The mailbox the processor reads from.
    pub fn exchange(&self) -> &CoefficientExchange {
        &self.exchange
    }

    /// Normalised Drive and mode the bridge last computed for.
    pub fn current_settings(&self) -> (f32, ToneMode) {
        let state = self.state.lock();
        (state.drive, state.mode)
    }

    fn recompute(&self, state: &BridgeState) -> Option<u64> {
        let Some(coeffs) = state.compute() else {
            tracing::debug!(sample_rate = state.sample_rate, "no sample rate yet, coefficients deferred");
            return None;
        };
        let sequence = self.exchange.publish(&coeffs);
        tracing::debug!(
            drive = state.drive,
            mode = state.mode.label(),
            sequence,
            "published drive coefficients"
        );
        Some(sequence)
    }
}

fn is_usable_rate(sample_rate: f64) -> bool {
    sample_rate.is_finite() && sample_rate > 0.0
}

impl Default for ParameterBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamSnapshot, switch_raw};

    #[test]
    fn nothing_published_without_sample_rate() {
        let bridge = ParameterBridge::new();
        assert!(bridge.parameter_changed(OjdParam::Drive, 5.0).is_none());
        assert!(bridge.exchange().read_if_newer(0).is_none());
        assert!(bridge.set_sample_rate(0.0).is_none());
    }

    #[test]
    fn tone_and_volume_do_not_recompute() {
        let bridge = ParameterBridge::new();
        bridge.set_sample_rate(48000.0);
        let seq = bridge.exchange().sequence();
        assert!(bridge.parameter_changed(OjdParam::Tone, 3.0).is_none());
        assert!(bridge.parameter_changed(OjdParam::Volume, 3.0).is_none());
        assert!(bridge.parameter_changed(OjdParam::Bypass, 1.0).is_none());
        assert_eq!(bridge.exchange().sequence(), seq);
    }

    #[test]
    fn drive_change_publishes_matching_set() {
        let bridge = ParameterBridge::new();
        bridge.set_sample_rate(48000.0);
        let seq = bridge.parameter_changed(OjdParam::Drive, 10.0).unwrap();

        let (read_seq, coeffs) = bridge.exchange().read_if_newer(0).unwrap();
        assert_eq!(read_seq, seq);
        assert_eq!(coeffs, drive_coefficients(48000.0, 1.0, ToneMode::Lp).unwrap());
    }

    #[test]
    fn mode_change_publishes() {
        let bridge = ParameterBridge::new();
        bridge.set_sample_rate(44100.0);
        bridge.parameter_changed(OjdParam::HpLp, switch_raw(true));
        assert_eq!(bridge.current_settings().1, ToneMode::Hp);

        let (_, coeffs) = bridge.exchange().read_if_newer(0).unwrap();
        let expected = drive_coefficients(44100.0, normalise(1.65), ToneMode::Hp).unwrap();
        assert_eq!(coeffs, expected);
    }

    #[test]
    fn prepare_reads_source() {
        let bridge = ParameterBridge::new();
        let snapshot = ParamSnapshot::default()
            .with(OjdParam::Drive, 0.0)
            .with(OjdParam::HpLp, 1.0);
        let (seq, coeffs) = bridge.prepare(96000.0, &snapshot).unwrap();
        assert!(seq > 0);
        assert_eq!(coeffs, drive_coefficients(96000.0, 0.0, ToneMode::Hp).unwrap());
        assert!(bridge.prepare(-1.0, &snapshot).is_none());
    }

    #[test]
    fn invalid_rate_keeps_previous_rate() {
        let bridge = ParameterBridge::new();
        bridge.set_sample_rate(48000.0).unwrap();
        for bad in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(bridge.set_sample_rate(bad).is_none());
            assert!(bridge.prepare(bad, &ParamSnapshot::default()).is_none());
        }

        let seq = bridge.parameter_changed(OjdParam::Drive, 8.0).unwrap();
        let (read_seq, coeffs) = bridge.exchange().read_if_newer(0).unwrap();
        assert_eq!(read_seq, seq);
        assert_eq!(coeffs, drive_coefficients(48000.0, normalise(8.0), ToneMode::Lp).unwrap());
    }
}
