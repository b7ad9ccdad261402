//! Mono WAV reading and writing.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};

use crate::{Error, Result};

/// Bit depths [`write_wav`] accepts. 32 is written as IEEE float.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// Header details of a WAV file.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Channels stored in the file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Reads the header only.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
        format: match spec.sample_format {
            SampleFormat::Float => WavFormat::IeeeFloat,
            SampleFormat::Int => WavFormat::Pcm,
        },
    })
}

/// Sample rate and sample format of a mono stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Channels in the source file. Written files always have one.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Mono spec at `sample_rate` and `bits_per_sample`.
    pub fn mono(sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample,
        }
    }

    fn to_hound_mono(self) -> Result<hound::WavSpec> {
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(Error::UnsupportedBitDepth(self.bits_per_sample));
        }
        Ok(hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: if self.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        })
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::mono(48000, 32)
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

/// Reads a WAV file as mono `f32` in `-1.0..1.0`.
///
/// Multi-channel files are averaged down to one channel. The returned spec
/// keeps the file's channel count for reporting.
///
/// Fails with [`Error::EmptyInput`] if the file holds no frames.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = full_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    if interleaved.len() < channels {
        return Err(Error::EmptyInput);
    }

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    tracing::debug!(
        path = %path.display(),
        frames = samples.len(),
        channels,
        sample_rate = spec.sample_rate,
        "read wav"
    );
    Ok((samples, spec))
}

/// Writes mono samples. Integer depths are clamped to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let path = path.as_ref();
    let hound_spec = spec.to_hound_mono()?;
    let file = BufWriter::new(File::create(path)?);
    let mut writer = WavWriter::new(file, hound_spec)?;

    if hound_spec.sample_format == SampleFormat::Float {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let scale = full_scale(spec.bits_per_sample);
        for &sample in samples {
            writer.write_sample((sample * scale).clamp(-scale, scale - 1.0) as i32)?;
        }
    }
    writer.finalize()?;

    tracing::debug!(
        path = %path.display(),
        frames = samples.len(),
        bits = spec.bits_per_sample,
        "wrote wav"
    );
    Ok(())
}

fn full_scale(bits: u16) -> f32 {
    (1i64 << (bits.clamp(1, 32) - 1)) as f32
}
