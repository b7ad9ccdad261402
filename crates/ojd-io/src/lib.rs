//! WAV file I/O for the OJD offline renderer.
//!
//! The pedal is mono, so [`read_wav`] always returns one channel (averaging
//! multi-channel files) and [`write_wav`] always writes one.
//!
//! ```rust,ignore
//! use ojd_io::{read_wav, write_wav};
//!
//! let (samples, spec) = read_wav("di_guitar.wav")?;
//! write_wav("copy.wav", &samples, spec)?;
//! ```

mod wav;

pub use wav::{SUPPORTED_BIT_DEPTHS, WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file holds no sample frames.
    #[error("input file contains no audio")]
    EmptyInput,

    /// Output bit depth other than 16, 24 or 32.
    #[error("unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),
}

/// Convenience result type for audio file operations.
pub type Result<T> = std::result::Result<T, Error>;
