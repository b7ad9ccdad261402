//! Errors reported by the pedal's control-rate entry points.

/// Error returned when a playback specification cannot be accepted.
///
/// Only `prepare` fails. The audio path has no error returns; a rejected
/// spec leaves the processor in whatever state it was in before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PedalError {
    /// Sample rate is zero, negative, or not a finite number.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// Maximum block size is zero.
    #[error("maximum block size must be at least one sample")]
    InvalidBlockSize,

    /// The pedal only supports a mono bus.
    #[error("unsupported channel count: {0} (the pedal is mono)")]
    UnsupportedChannelCount(usize),
}

/// Convenience result type for pedal operations.
pub type Result<T> = std::result::Result<T, PedalError>;
