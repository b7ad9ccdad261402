//! Host-facing processor.
//!
//! [`OjdProcessor`] owns the [`SignalChain`] and runs on the audio thread.
//! It talks to the outside world through two narrow interfaces:
//!
//! - [`ParameterSource`]: read-only access to current raw values, sampled
//!   once per `process` call
//! - [`LatencyReporter`]: where `prepare` reports the output delay
//!
//! The control side holds a clone of [`bridge`](OjdProcessor::bridge) and
//! calls [`ParameterBridge::parameter_changed`] on Drive/HpLp automation.

use std::fmt;
use std::sync::Arc;

use ojd_core::ProcessSpec;

use crate::bridge::ParameterBridge;
use crate::chain::SignalChain;
use crate::error::{PedalError, Result};
use crate::params::{ParamSnapshot, ParameterSource, normalise, volume_db};

/// Receives the processor's output latency in whole samples.
pub trait LatencyReporter {
    /// Called once per successful `prepare`.
    fn report_latency(&mut self, samples: usize);
}

impl<F: FnMut(usize)> LatencyReporter for F {
    fn report_latency(&mut self, samples: usize) {
        self(samples);
    }
}

/// The complete pedal, ready to drop into a host callback.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ojd_core::ProcessSpec;
/// use ojd_pedal::{OjdParam, OjdProcessor, PedalParams};
///
/// let params = Arc::new(PedalParams::new());
/// let mut pedal = OjdProcessor::new(params.clone());
///
/// let mut latency = 0;
/// pedal.prepare(&ProcessSpec::mono(48000.0, 256), &mut |n: usize| latency = n).unwrap();
/// assert_eq!(latency, pedal.latency_samples());
///
/// // Control thread: store the value, then notify the bridge.
/// let raw = params.set(OjdParam::Drive, 7.5);
/// pedal.bridge().parameter_changed(OjdParam::Drive, raw);
///
/// let mut block = [0.0f32; 256];
/// pedal.process(&mut block);
/// ```
pub struct OjdProcessor {
    chain: SignalChain,
    params: Arc<dyn ParameterSource>,
    bridge: Arc<ParameterBridge>,
    /// Sequence of the coefficient set currently installed in the chain
    last_sequence: u64,
    spec: Option<ProcessSpec>,
}

impl OjdProcessor {
    /// Creates an unprepared processor reading from `params`.
    pub fn new(params: Arc<dyn ParameterSource>) -> Self {
        Self {
            chain: SignalChain::new(),
            params,
            bridge: Arc::new(ParameterBridge::new()),
            last_sequence: 0,
            spec: None,
        }
    }

    /// The control-rate bridge. Clone the `Arc` for the parameter thread.
    pub fn bridge(&self) -> &Arc<ParameterBridge> {
        &self.bridge
    }

    /// Prepares for playback.
    ///
    /// Validates the spec before any rate-dependent math runs. On error the
    /// processor keeps its previous state and nothing is reported. On
    /// success every coefficient is recomputed from the current parameter
    /// values, all state is cleared and the latency is reported.
    ///
    /// Must not run concurrently with [`process`](Self::process).
    pub fn prepare(&mut self, spec: &ProcessSpec, reporter: &mut dyn LatencyReporter) -> Result<()> {
        if let Err(err) = validate(spec) {
            tracing::warn!(%err, ?spec, "rejected process spec");
            return Err(err);
        }

        let Some((sequence, coeffs)) = self.bridge.prepare(spec.sample_rate, self.params.as_ref()) else {
            return Err(PedalError::InvalidSampleRate(spec.sample_rate));
        };

        self.chain.prepare(spec);
        self.chain.set_drive_coefficients(&coeffs);
        self.last_sequence = sequence;
        self.apply_snapshot(&ParamSnapshot::capture(self.params.as_ref()));
        self.spec = Some(*spec);

        let latency = self.latency_samples();
        reporter.report_latency(latency);
        tracing::info!(
            sample_rate = spec.sample_rate,
            maximum_block_size = spec.maximum_block_size,
            latency,
            "prepared"
        );
        Ok(())
    }

    /// Processes one mono block in place.
    ///
    /// Picks up newly published coefficients if a complete set is available,
    /// applies Tone, mode and Volume from one parameter snapshot, then runs
    /// the chain. Blocks longer than the prepared maximum are processed in
    /// maximum-size pieces. Before the first successful `prepare` the block
    /// passes through untouched.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let Some(spec) = self.spec else {
            return;
        };

        if let Some((sequence, coeffs)) = self.bridge.exchange().read_if_newer(self.last_sequence) {
            self.chain.set_drive_coefficients(&coeffs);
            self.last_sequence = sequence;
        }

        self.apply_snapshot(&ParamSnapshot::capture(self.params.as_ref()));

        for chunk in buffer.chunks_mut(spec.maximum_block_size) {
            self.chain.process_block(chunk);
        }
    }

    /// Clears all filter and oversampler state.
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    /// Whether the Bypass switch is engaged. The host skips `process` when
    /// this is true.
    pub fn is_bypassed(&self) -> bool {
        ParamSnapshot::capture(self.params.as_ref()).is_bypassed()
    }

    /// Output latency in whole samples (the fractional delay, truncated).
    pub fn latency_samples(&self) -> usize {
        self.chain.latency() as usize
    }

    /// Output latency in samples, fractional.
    pub fn latency(&self) -> f32 {
        self.chain.latency()
    }

    /// The spec of the last successful `prepare`.
    pub fn spec(&self) -> Option<&ProcessSpec> {
        self.spec.as_ref()
    }

    /// Read access to the signal chain.
    pub fn chain(&self) -> &SignalChain {
        &self.chain
    }

    fn apply_snapshot(&mut self, snapshot: &ParamSnapshot) {
        self.chain.set_tone(snapshot.tone_mode(), normalise(snapshot.tone));
        self.chain.set_volume_db(volume_db(snapshot.volume));
    }
}

impl fmt::Debug for OjdProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OjdProcessor")
            .field("spec", &self.spec)
            .field("last_sequence", &self.last_sequence)
            .field("latency", &self.latency())
            .finish_non_exhaustive()
    }
}

fn validate(spec: &ProcessSpec) -> Result<()> {
    if !spec.has_valid_sample_rate() {
        return Err(PedalError::InvalidSampleRate(spec.sample_rate));
    }
    if spec.maximum_block_size == 0 {
        return Err(PedalError::InvalidBlockSize);
    }
    if spec.num_channels != 1 {
        return Err(PedalError::UnsupportedChannelCount(spec.num_channels));
    }
    Ok(())
}
