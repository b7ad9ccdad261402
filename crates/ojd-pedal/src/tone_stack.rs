//! Tone stack: parallel highpass/lowpass split with a blend on the high side.
//!
//! The input feeds a first-order highpass and a first-order lowpass that share
//! one corner frequency (358 Hz in HP mode, 160 Hz in LP mode). The lowpass
//! branch passes at unity; the highpass branch is scaled by
//! `(HP ? 0.7 : 0.2) * tone` and summed back in. With the Tone knob at zero
//! the stack is a plain lowpass; turned up, it restores the highs.

use ojd_core::{Biquad, BiquadCoefficients, Effect, first_order_highpass_coefficients, first_order_lowpass_coefficients};

/// Crossover in HP mode.
pub const HP_MODE_CROSSOVER_HZ: f32 = 358.0;

/// Crossover in LP mode.
pub const LP_MODE_CROSSOVER_HZ: f32 = 160.0;

/// Tone stack voicing selected by the HP/LP switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMode {
    /// Higher crossover and a stronger high-side blend.
    Hp,
    /// Lower crossover, darker voicing.
    #[default]
    Lp,
}

impl ToneMode {
    /// Shared corner frequency of both branches.
    pub const fn crossover_hz(self) -> f32 {
        match self {
            ToneMode::Hp => HP_MODE_CROSSOVER_HZ,
            ToneMode::Lp => LP_MODE_CROSSOVER_HZ,
        }
    }

    /// Highpass branch gain at full Tone.
    pub const fn blend_scale(self) -> f32 {
        match self {
            ToneMode::Hp => 0.7,
            ToneMode::Lp => 0.2,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            ToneMode::Hp => "HP",
            ToneMode::Lp => "LP",
        }
    }
}

/// Coefficients for both branches in one mode.
#[derive(Debug, Clone, Copy, Default)]
struct BranchCoefficients {
    highpass: BiquadCoefficients,
    lowpass: BiquadCoefficients,
}

impl BranchCoefficients {
    fn design(mode: ToneMode, sample_rate: f32) -> Self {
        Self {
            highpass: first_order_highpass_coefficients(mode.crossover_hz(), sample_rate),
            lowpass: first_order_lowpass_coefficients(mode.crossover_hz(), sample_rate),
        }
    }
}

/// Chain stage 10.
///
/// Both modes are designed at [`prepare`](Self::prepare), so a mode switch
/// is a plain coefficient assignment with no crossfade.
#[derive(Debug, Clone)]
pub struct ToneStack {
    highpass: Biquad,
    lowpass: Biquad,
    hp_mode: BranchCoefficients,
    lp_mode: BranchCoefficients,
    mode: ToneMode,
    /// Normalised Tone knob, 0..1
    tone: f32,
    /// Highpass branch output, sized to the maximum block at prepare
    scratch: Vec<f32>,
}

impl ToneStack {
    /// Creates an unprepared stack in LP mode with Tone at full.
    pub fn new() -> Self {
        Self {
            highpass: Biquad::new(),
            lowpass: Biquad::new(),
            hp_mode: BranchCoefficients::default(),
            lp_mode: BranchCoefficients::default(),
            mode: ToneMode::Lp,
            tone: 1.0,
            scratch: Vec::new(),
        }
    }

    /// Designs both modes for `sample_rate`, sizes the scratch buffer and
    /// clears the filter state. Allocates.
    pub fn prepare(&mut self, sample_rate: f32, maximum_block_size: usize) {
        self.hp_mode = BranchCoefficients::design(ToneMode::Hp, sample_rate);
        self.lp_mode = BranchCoefficients::design(ToneMode::Lp, sample_rate);
        self.apply_mode();

        self.scratch.clear();
        self.scratch.resize(maximum_block_size.max(1), 0.0);
        self.reset();
    }

    /// Switches mode. No-op when the mode is unchanged.
    pub fn set_mode(&mut self, mode: ToneMode) {
        if self.mode != mode {
            self.mode = mode;
            self.apply_mode();
        }
    }

    /// Sets the normalised Tone knob, `0.0..=1.0`.
    pub fn set_tone(&mut self, tone: f32) {
        self.tone = tone;
    }

    /// Current mode.
    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    /// Current crossover frequency in Hz.
    pub fn crossover_hz(&self) -> f32 {
        self.mode.crossover_hz()
    }

    /// Gain applied to the highpass branch.
    pub fn hpf_gain(&self) -> f32 {
        self.mode.blend_scale() * self.tone
    }

    /// Coefficients currently loaded into the (highpass, lowpass) branches.
    pub fn branch_coefficients(&self) -> (BiquadCoefficients, BiquadCoefficients) {
        (*self.highpass.coefficients(), *self.lowpass.coefficients())
    }

    /// Returns `true` if neither branch holds any history.
    pub fn is_cleared(&self) -> bool {
        self.highpass.is_cleared() && self.lowpass.is_cleared()
    }

    fn apply_mode(&mut self) {
        let coeffs = match self.mode {
            ToneMode::Hp => self.hp_mode,
            ToneMode::Lp => self.lp_mode,
        };
        self.highpass.set(&coeffs.highpass);
        self.lowpass.set(&coeffs.lowpass);
    }
}

impl Default for ToneStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ToneStack {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let high = self.highpass.process(input);
        self.lowpass.process(input) + high * self.hpf_gain()
    }

    /// Highpass into the scratch buffer, lowpass in place, then add the
    /// scaled scratch. Blocks longer than the prepared size are split.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        let gain = self.hpf_gain();
        let chunk_len = self.scratch.len().max(1);

        for chunk in buffer.chunks_mut(chunk_len) {
            if self.scratch.len() < chunk.len() {
                // Unprepared: no scratch to split into.
                for sample in chunk.iter_mut() {
                    *sample = self.process(*sample);
                }
                continue;
            }

            let scratch = &mut self.scratch[..chunk.len()];
            self.highpass.process_block(chunk, scratch);
            self.lowpass.process_block_inplace(chunk);
            for (out, high) in chunk.iter_mut().zip(scratch.iter()) {
                *out += high * gain;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let block = self.scratch.len();
        self.prepare(sample_rate, block);
    }

    fn reset(&mut self) {
        self.highpass.clear();
        self.lowpass.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn prepared() -> ToneStack {
        let mut stack = ToneStack::new();
        stack.prepare(SAMPLE_RATE, 64);
        stack
    }

    #[test]
    fn defaults() {
        let stack = ToneStack::new();
        assert_eq!(stack.mode(), ToneMode::Lp);
        assert_eq!(stack.crossover_hz(), 160.0);
        assert_eq!(stack.hpf_gain(), 0.2);
    }

    #[test]
    fn mode_switch_changes_corner() {
        let mut stack = prepared();
        let lp = stack.branch_coefficients();

        stack.set_mode(ToneMode::Hp);
        assert_eq!(stack.crossover_hz(), 358.0);
        let hp = stack.branch_coefficients();
        assert_ne!(lp, hp);
        assert_eq!(hp.0, first_order_highpass_coefficients(358.0, SAMPLE_RATE));
        assert_eq!(hp.1, first_order_lowpass_coefficients(358.0, SAMPLE_RATE));

        stack.set_mode(ToneMode::Lp);
        assert_eq!(stack.branch_coefficients(), lp);
    }

    #[test]
    fn blend_gain() {
        let mut stack = prepared();
        stack.set_tone(0.5);
        assert!((stack.hpf_gain() - 0.1).abs() < 1e-7);
        stack.set_mode(ToneMode::Hp);
        assert!((stack.hpf_gain() - 0.35).abs() < 1e-7);
    }

    #[test]
    fn zero_tone_is_pure_lowpass() {
        let mut stack = prepared();
        stack.set_tone(0.0);
        let mut reference = Biquad::with_coefficients(first_order_lowpass_coefficients(160.0, SAMPLE_RATE));

        let mut block: Vec<f32> = (0..64).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();
        let expected: Vec<f32> = block.iter().map(|&x| reference.process(x)).collect();
        stack.process_block_inplace(&mut block);
        for (a, b) in block.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn block_matches_per_sample() {
        let mut by_block = prepared();
        let mut by_sample = prepared();
        by_block.set_mode(ToneMode::Hp);
        by_sample.set_mode(ToneMode::Hp);
        by_block.set_tone(0.8);
        by_sample.set_tone(0.8);

        // 150 samples through a 64-sample scratch exercises the chunking.
        let input: Vec<f32> = (0..150).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut block = input.clone();
        by_block.process_block_inplace(&mut block);
        for (i, &x) in input.iter().enumerate() {
            let y = by_sample.process(x);
            assert!((block[i] - y).abs() < 1e-6, "sample {i}: {} vs {y}", block[i]);
        }
    }

    #[test]
    fn unity_blend_in_hp_mode_is_near_flat() {
        // HP + LP at the same corner sum to unity; 0.7 leaves a mild high cut.
        let mut stack = prepared();
        stack.set_mode(ToneMode::Hp);
        stack.set_tone(1.0);
        let mut block = vec![1.0f32; 64];
        for _ in 0..100 {
            block.fill(1.0);
            stack.process_block_inplace(&mut block);
        }
        assert!((block[63] - 1.0).abs() < 1e-3, "DC through lowpass branch, got {}", block[63]);
    }

    #[test]
    fn reset_clears_history() {
        let mut stack = prepared();
        let mut block = vec![0.5f32; 64];
        stack.process_block_inplace(&mut block);
        assert!(!stack.is_cleared());
        stack.reset();
        assert!(stack.is_cleared());
    }
}
