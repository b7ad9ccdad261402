//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use ojd_pedal::OjdParam;
use ojd_pedal::params::{VOLUME_MAX_DB, VOLUME_MIN_DB};

#[derive(Args)]
pub struct ParamsArgs {
    /// Show a single parameter by id (e.g. "drive", "hplp")
    #[arg(value_name = "PARAM")]
    param: Option<String>,
}

pub fn run(args: &ParamsArgs) -> anyhow::Result<()> {
    let selected: Vec<OjdParam> = match &args.param {
        Some(id) => vec![OjdParam::from_id(id).ok_or_else(|| anyhow::anyhow!("Unknown parameter: {}", id))?],
        None => OjdParam::ALL.to_vec(),
    };

    println!("OJD Parameters");
    println!("==============");
    println!();
    println!("  {:8}  {:10}  {:12}  {:8}  {}", "Id", "Name", "Range", "Default", "Notes");
    println!("  {:8}  {:10}  {:12}  {:8}  {}", "--", "----", "-----", "-------", "-----");

    for param in selected {
        let desc = param.descriptor();
        let range = if desc.is_switch() {
            "off / on".to_owned()
        } else {
            format!("{:.0} - {:.0}{}", desc.min, desc.max, desc.unit.suffix())
        };
        println!(
            "  {:8}  {:10}  {:12}  {:8}  {}",
            param.id(),
            desc.name,
            range,
            param.value_to_text(desc.default, 0),
            notes(param)
        );
    }

    println!();
    println!("Example usage:");
    println!();
    println!("  ojd render input.wav output.wav --drive 6.5 --tone 4 --hp");

    Ok(())
}

fn notes(param: OjdParam) -> String {
    match param {
        OjdParam::Drive => "pre-clip EQ and boost".to_owned(),
        OjdParam::Tone => "high-side blend of the tone stack".to_owned(),
        OjdParam::Volume => format!("{VOLUME_MIN_DB:.0} to {VOLUME_MAX_DB:.0} dB"),
        OjdParam::HpLp => "tone stack voicing (HP / LP)".to_owned(),
        OjdParam::Bypass => "\"Off\" when bypassed".to_owned(),
    }
}
