//! Core Effect trait and the playback specification handed to `prepare`.
//!
//! The [`Effect`] trait is the interface every stage of the pedal's signal
//! path implements, providing a consistent interface for single-sample and
//! block-based processing.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: Single `f32` input/output. The pedal is mono by
//!   construction, so there is no channel dimension anywhere in the trait.
//!
//! - **Object-safe**: `dyn Effect` works, but the signal chain composes its
//!   stages statically so the per-block path is monomorphized.
//!
//! - **No allocations**: All methods are designed to be called in real-time
//!   audio contexts with zero heap allocations.

/// Core trait for all processing stages.
///
/// Stages process audio samples, either one at a time or in blocks.
///
/// # Example
///
/// ```rust
/// use ojd_core::Effect;
///
/// struct Invert;
///
/// impl Effect for Invert {
///     fn process(&mut self, input: f32) -> f32 {
///         -input
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process a single sample.
    ///
    /// For stages with internal state (filters, oversamplers) this advances
    /// the state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process()` for each sample.
    ///
    /// # Panics
    /// Debug builds panic if `input.len() != output.len()`
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in-place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate.
    ///
    /// Stages that own rate-dependent coefficients recalculate them here.
    /// Stages whose coefficients are supplied from outside ignore it.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Reset internal state.
    ///
    /// Clears delay lines and filter history without changing parameters.
    fn reset(&mut self);

    /// Report processing latency in whole samples.
    ///
    /// Default returns 0 (no latency).
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Playback configuration established by a prepare-for-playback event.
///
/// Any change to one of these fields requires a fresh `prepare`, which
/// recomputes every rate-dependent coefficient and resizes scratch buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block the host will pass to a single `process` call.
    pub maximum_block_size: usize,
    /// Number of audio channels on the bus.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Mono spec with the given rate and maximum block size.
    pub fn mono(sample_rate: f64, maximum_block_size: usize) -> Self {
        Self {
            sample_rate,
            maximum_block_size,
            num_channels: 1,
        }
    }

    /// Returns `true` if the sample rate is finite and strictly positive.
    pub fn has_valid_sample_rate(&self) -> bool {
        self.sample_rate.is_finite() && self.sample_rate > 0.0
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::mono(48000.0, 512)
    }
}
