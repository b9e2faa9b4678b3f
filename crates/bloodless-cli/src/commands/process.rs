//! File-based processing command.

use std::path::PathBuf;

use anyhow::Context;
use bloodless_core::{MINUS_INFINITY_DB, gain_to_db, rms};
use bloodless_effects::SignalChain;
use bloodless_io::{OfflineRenderer, SUPPORTED_BIT_DEPTHS, WavSpec, read_wav_stereo, write_wav_stereo};
use clap::Args;

use super::common::{ParamArgs, frame_progress, load_settings, print_params};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    params: ParamArgs,

    /// Processor settings file (TOML)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

fn level_db(gain: f32) -> f32 {
    gain_to_db(gain, MINUS_INFINITY_DB)
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !SUPPORTED_BIT_DEPTHS.contains(&args.bit_depth) {
        anyhow::bail!("unsupported bit depth {} (use 16, 24 or 32)", args.bit_depth);
    }

    println!("Reading {}...", args.input.display());
    let (input, spec) = read_wav_stereo(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let sample_rate = spec.sample_rate as f32;
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        input.len(),
        spec.channels,
        spec.sample_rate,
        input.len() as f32 / sample_rate
    );

    let settings = load_settings(args.settings.as_deref())?;
    let params = args.params.build_store()?;
    let (chain, _taps) = SignalChain::new(settings.to_chain_config(sample_rate)?, params.clone())?;
    let mut renderer = OfflineRenderer::new(chain, args.block_size)?;

    println!("Processing with {} high-pass stage(s)...", settings.filter_stages);
    print_params(&params);

    let pb = frame_progress(input.len())?;
    let (output, summary) = renderer.render(&input, |report| {
        pb.set_position(report.frames_done as u64);
    });
    pb.finish_and_clear();

    let input_mono = input.to_mono();
    let output_mono = output.to_mono();
    println!("\nLevels:");
    println!(
        "  Dry:    mean {:.1} dB, max {:.1} dB",
        summary.mean_dry_db, summary.max_dry_db
    );
    println!(
        "  Wet:    mean {:.1} dB, max {:.1} dB",
        summary.mean_wet_db, summary.max_wet_db
    );
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        level_db(rms(&input_mono)),
        level_db(peak(&input_mono))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        level_db(rms(&output_mono)),
        level_db(peak(&output_mono))
    );

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &output, out_spec)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Done.");

    Ok(())
}
