//! Offline rendering through the pedal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ojd_core::{ProcessSpec, linear_to_db};
use ojd_io::{WavSpec, read_wav, write_wav};
use ojd_pedal::{OjdProcessor, PedalParams, ToneMode};

use crate::settings::{ModeSetting, Settings};

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file (mixed to mono)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (mono)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Drive knob, 0 to 10
    #[arg(long)]
    drive: Option<f32>,

    /// Tone knob, 0 to 10
    #[arg(long)]
    tone: Option<f32>,

    /// Volume knob, 0 to 10
    #[arg(long)]
    volume: Option<f32>,

    /// HP tone stack voicing
    #[arg(long, conflicts_with = "lp")]
    hp: bool,

    /// LP tone stack voicing
    #[arg(long)]
    lp: bool,

    /// Switch the pedal off (audio is copied through)
    #[arg(long)]
    bypass: bool,

    /// Settings file (TOML); flags override its values
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Processing block size
    #[arg(long)]
    block_size: Option<usize>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Remove the pedal's latency so output lines up with input
    #[arg(long)]
    compensate_latency: bool,
}

impl RenderArgs {
    fn resolve_settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(drive) = self.drive {
            settings.drive = drive;
        }
        if let Some(tone) = self.tone {
            settings.tone = tone;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume;
        }
        if self.hp {
            settings.mode = ModeSetting::Hp;
        } else if self.lp {
            settings.mode = ModeSetting::Lp;
        }
        if self.bypass {
            settings.bypass = true;
        }
        if let Some(block_size) = self.block_size {
            settings.block_size = block_size;
        }
        if let Some(bit_depth) = self.bit_depth {
            settings.bit_depth = bit_depth;
        }

        Ok(settings.clamped())
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let settings = args.resolve_settings()?;

    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav(&args.input)?;
    println!(
        "  {} samples, {} Hz, {} channel(s), {:.2}s",
        samples.len(),
        spec.sample_rate,
        spec.channels,
        samples.len() as f32 / spec.sample_rate as f32
    );

    let params = Arc::new(PedalParams::new());
    settings.apply(&params);

    let mut pedal = OjdProcessor::new(params);
    let mut latency = 0;
    pedal.prepare(
        &ProcessSpec::mono(f64::from(spec.sample_rate), settings.block_size),
        &mut |n: usize| latency = n,
    )?;

    let output = if pedal.is_bypassed() {
        println!("Bypassed: copying input through");
        samples.clone()
    } else {
        println!(
            "Rendering: drive {:.2}, tone {:.2}, volume {:.2}, {} mode, latency {} samples",
            settings.drive,
            settings.tone,
            settings.volume,
            ToneMode::from(settings.mode).label(),
            latency
        );
        let tail = if args.compensate_latency { latency } else { 0 };
        let mut rendered = render(&mut pedal, &samples, tail, settings.block_size)?;
        rendered.drain(..tail);
        rendered
    };

    let input_rms = rms(&samples);
    let output_rms = rms(&output);
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(input_rms),
        linear_to_db(peak(&samples))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(output_rms),
        linear_to_db(peak(&output))
    );

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, WavSpec::mono(spec.sample_rate, settings.bit_depth))?;
    println!("Done!");

    Ok(())
}

/// Runs `input` plus `tail` samples of silence through the pedal.
fn render(
    pedal: &mut OjdProcessor,
    input: &[f32],
    tail: usize,
    block_size: usize,
) -> anyhow::Result<Vec<f32>> {
    let mut buffer = Vec::with_capacity(input.len() + tail);
    buffer.extend_from_slice(input);
    buffer.resize(input.len() + tail, 0.0);

    let pb = ProgressBar::new(buffer.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut done = 0;
    for block in buffer.chunks_mut(block_size) {
        pedal.process(block);
        done += block.len();
        pb.set_position(done as u64);
    }
    pb.finish_with_message("done");

    Ok(buffer)
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> RenderArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            render: RenderArgs,
        }

        let argv = ["ojd", "in.wav", "out.wav"].into_iter().chain(extra.iter().copied());
        Wrapper::parse_from(argv).render
    }

    #[test]
    fn defaults_without_flags() {
        let settings = args(&[]).resolve_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_override_and_clamp() {
        let settings = args(&["--drive", "12", "--hp", "--bypass", "--block-size", "64"])
            .resolve_settings()
            .unwrap();
        assert_eq!(settings.drive, 10.0);
        assert_eq!(settings.mode, ModeSetting::Hp);
        assert!(settings.bypass);
        assert_eq!(settings.block_size, 64);
    }

    #[test]
    fn stats() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[1.0, -1.0]) - 1.0).abs() < 1e-6);
        assert_eq!(peak(&[0.2, -0.7, 0.5]), 0.7);
    }

    #[test]
    fn compensated_render_keeps_length() {
        let params = Arc::new(PedalParams::new());
        let mut pedal = OjdProcessor::new(params);
        let mut latency = 0;
        pedal
            .prepare(&ProcessSpec::mono(48000.0, 64), &mut |n: usize| latency = n)
            .unwrap();

        let input = vec![0.1f32; 1000];
        let mut rendered = render(&mut pedal, &input, latency, 64).unwrap();
        rendered.drain(..latency);
        assert_eq!(rendered.len(), input.len());
    }
}
