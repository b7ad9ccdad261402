//! Drive-dependent EQ: the five peaking bands around the waveshaper.
//!
//! The pedal's voicing comes from two peaking filters before the clipper and
//! three after it. Their centre frequency, Q and gain follow fixed empirical
//! curves of the normalised Drive knob `d` and the HP/LP switch:
//!
//! | band               | frequency (Hz)              | Q              | gain (dB)          |
//! |--------------------|-----------------------------|----------------|--------------------|
//! | pre-drive boost    | `-1400 d² + 500 d + 1600`    | `-0.1 d + 0.15` | `32 d + 4`         |
//! | pre-drive notch    | 8000                        | 0.8            | `-5 d²`            |
//! | post-drive boost 1 | 2052 (HP) / 2781 (LP)       | 0.5            | 4.6 (HP) / 4.38 (LP) |
//! | post-drive boost 2 | 74                          | 0.2            | `7.38 d + 8.12`    |
//! | post-drive boost 3 | 2935                        | 0.1            | 10 (HP) / 16.9 (LP) |
//!
//! Everything here is a pure function. Coefficient sets are computed at
//! control rate and handed to the audio thread through
//! [`CoefficientExchange`](crate::CoefficientExchange).

use ojd_core::{
    BiquadCoefficients, first_order_highpass_coefficients, first_order_lowpass_coefficients,
    peaking_eq_coefficients,
};

use crate::ToneMode;

/// Corner of the fixed first-order highpass at the chain input.
pub const INPUT_HIGHPASS_HZ: f32 = 30.0;

/// Corner of the fixed first-order lowpass after the post-drive EQ.
pub const OUTPUT_LOWPASS_HZ: f32 = 6300.0;

/// Number of drive-dependent peaking bands.
pub const DRIVE_BAND_COUNT: usize = 5;

/// Design parameters of one peaking band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakingBand {
    /// Centre frequency in Hz.
    pub frequency: f32,
    /// Quality factor.
    pub q: f32,
    /// Boost (positive) or cut (negative) in dB.
    pub gain_db: f32,
}

impl PeakingBand {
    /// RBJ peaking coefficients for this band at `sample_rate`.
    pub fn coefficients(&self, sample_rate: f32) -> BiquadCoefficients {
        peaking_eq_coefficients(self.frequency, self.q, self.gain_db, sample_rate)
    }
}

/// The five peaking bands for one Drive/mode setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveBands {
    /// Before the clipper: presence boost that narrows and drops in frequency with drive.
    pub pre_drive_boost: PeakingBand,
    /// Before the clipper: high cut that deepens with drive.
    pub pre_drive_notch: PeakingBand,
    /// After the clipper: upper-mid lift.
    pub post_drive_boost1: PeakingBand,
    /// After the clipper: low-end lift.
    pub post_drive_boost2: PeakingBand,
    /// After the clipper: broad mid lift.
    pub post_drive_boost3: PeakingBand,
}

impl DriveBands {
    /// Evaluates the band curves.
    ///
    /// # Arguments
    /// * `drive` - Normalised Drive knob, `0.0..=1.0`
    /// * `mode` - Tone stack mode
    pub fn new(drive: f32, mode: ToneMode) -> Self {
        let drive_squared = drive * drive;
        let hp = mode == ToneMode::Hp;

        Self {
            pre_drive_boost: PeakingBand {
                frequency: -1400.0 * drive_squared + 500.0 * drive + 1600.0,
                q: -0.1 * drive + 0.15,
                gain_db: 32.0 * drive + 4.0,
            },
            pre_drive_notch: PeakingBand {
                frequency: 8000.0,
                q: 0.8,
                gain_db: -5.0 * drive_squared,
            },
            post_drive_boost1: PeakingBand {
                frequency: if hp { 2052.0 } else { 2781.0 },
                q: 0.5,
                gain_db: if hp { 4.6 } else { 4.38 },
            },
            post_drive_boost2: PeakingBand {
                frequency: 74.0,
                q: 0.2,
                gain_db: 7.38 * drive + 8.12,
            },
            post_drive_boost3: PeakingBand {
                frequency: 2935.0,
                q: 0.1,
                gain_db: if hp { 10.0 } else { 16.9 },
            },
        }
    }

    /// Bands in signal-chain order.
    pub fn to_array(&self) -> [PeakingBand; DRIVE_BAND_COUNT] {
        [
            self.pre_drive_boost,
            self.pre_drive_notch,
            self.post_drive_boost1,
            self.post_drive_boost2,
            self.post_drive_boost3,
        ]
    }

    /// Peaking coefficients for every band at `sample_rate`.
    pub fn coefficients(&self, sample_rate: f32) -> DriveCoefficients {
        DriveCoefficients {
            pre_drive_boost: self.pre_drive_boost.coefficients(sample_rate),
            pre_drive_notch: self.pre_drive_notch.coefficients(sample_rate),
            post_drive_boost1: self.post_drive_boost1.coefficients(sample_rate),
            post_drive_boost2: self.post_drive_boost2.coefficients(sample_rate),
            post_drive_boost3: self.post_drive_boost3.coefficients(sample_rate),
        }
    }
}

/// The five peaking coefficient sets swapped into the chain as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCoefficients {
    /// Stage 2.
    pub pre_drive_boost: BiquadCoefficients,
    /// Stage 3.
    pub pre_drive_notch: BiquadCoefficients,
    /// Stage 6.
    pub post_drive_boost1: BiquadCoefficients,
    /// Stage 7.
    pub post_drive_boost2: BiquadCoefficients,
    /// Stage 8.
    pub post_drive_boost3: BiquadCoefficients,
}

impl DriveCoefficients {
    /// Coefficient sets in signal-chain order.
    pub fn to_array(&self) -> [BiquadCoefficients; DRIVE_BAND_COUNT] {
        [
            self.pre_drive_boost,
            self.pre_drive_notch,
            self.post_drive_boost1,
            self.post_drive_boost2,
            self.post_drive_boost3,
        ]
    }

    /// Inverse of [`to_array`](Self::to_array).
    pub fn from_array(sets: [BiquadCoefficients; DRIVE_BAND_COUNT]) -> Self {
        let [pre_drive_boost, pre_drive_notch, post_drive_boost1, post_drive_boost2, post_drive_boost3] =
            sets;
        Self {
            pre_drive_boost,
            pre_drive_notch,
            post_drive_boost1,
            post_drive_boost2,
            post_drive_boost3,
        }
    }

    /// Returns `true` if every set is finite and stable.
    pub fn is_stable(&self) -> bool {
        self.to_array().iter().all(BiquadCoefficients::is_stable)
    }
}

/// Computes the five drive-dependent coefficient sets.
///
/// Returns `None` for a sample rate that is not strictly positive and
/// finite, so a bad rate never reaches the coefficient math.
pub fn drive_coefficients(sample_rate: f64, drive: f32, mode: ToneMode) -> Option<DriveCoefficients> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return None;
    }
    Some(DriveBands::new(drive, mode).coefficients(sample_rate as f32))
}

/// Fixed 30 Hz first-order highpass.
pub fn input_highpass(sample_rate: f32) -> BiquadCoefficients {
    first_order_highpass_coefficients(INPUT_HIGHPASS_HZ, sample_rate)
}

/// Fixed 6.3 kHz first-order lowpass.
pub fn output_lowpass(sample_rate: f32) -> BiquadCoefficients {
    first_order_lowpass_coefficients(OUTPUT_LOWPASS_HZ, sample_rate)
}
