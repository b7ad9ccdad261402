//! Pedal information command.

use clap::Args;
use ojd_core::{ParamUnit, ProcessSpec};
use ojd_pedal::params::normalise;
use ojd_pedal::{DriveBands, OjdParam, OjdProcessor, PedalParams, STAGE_NAMES, ToneMode};
use std::sync::Arc;

#[derive(Args)]
pub struct InfoArgs {
    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Drive knob, 0 to 10
    #[arg(long)]
    drive: Option<f32>,

    /// HP tone stack voicing
    #[arg(long)]
    hp: bool,
}

pub fn run(args: &InfoArgs) -> anyhow::Result<()> {
    let drive = OjdParam::Drive.descriptor().clamp(args.drive.unwrap_or(OjdParam::Drive.descriptor().default));
    let mode = if args.hp { ToneMode::Hp } else { ToneMode::Lp };

    let params = Arc::new(PedalParams::new());
    let mut pedal = OjdProcessor::new(params);
    pedal.prepare(&ProcessSpec::mono(f64::from(args.sample_rate), 512), &mut |_: usize| {})?;

    println!("OJD Overdrive");
    println!("=============");
    println!();
    println!("  Sample rate:   {} Hz", args.sample_rate);
    println!("  Oversampling:  {}x", pedal.chain().waveshaper().oversampling_factor());
    println!(
        "  Latency:       {} samples ({:.3} fractional)",
        pedal.latency_samples(),
        pedal.latency()
    );
    println!();

    println!("Signal chain:");
    for (i, stage) in STAGE_NAMES.iter().enumerate() {
        println!("  {:2}. {}", i + 1, stage);
    }
    println!();

    println!("Peaking bands (drive {:.2}, {} mode):", drive, mode.label());
    println!();
    let bands = DriveBands::new(normalise(drive), mode);
    let names = ["pre-drive boost", "pre-drive notch", "post-drive boost 1", "post-drive boost 2", "post-drive boost 3"];
    for (name, band) in names.iter().zip(bands.to_array()) {
        println!(
            "  {:20}  {:>8.1}{}  Q {:<5.2}  {:>+6.2}{}",
            name,
            band.frequency,
            ParamUnit::Hertz.suffix(),
            band.q,
            band.gain_db,
            ParamUnit::Decibels.suffix()
        );
    }

    Ok(())
}
