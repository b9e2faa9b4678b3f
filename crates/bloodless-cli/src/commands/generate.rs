//! Test signal generation command.

use std::path::PathBuf;

use anyhow::Context;
use bloodless_io::{StereoSamples, WavSpec, write_wav_stereo};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a sine tone on both channels
    Sine {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value = "1000.0")]
        freq: f32,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f32,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Amplitude (0-1)
        #[arg(long, default_value = "0.8")]
        amplitude: f32,
    },

    /// Generate independent white noise on each channel
    Noise {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f32,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Amplitude (0-1)
        #[arg(long, default_value = "0.5")]
        amplitude: f32,

        /// Generator seed
        #[arg(long, default_value = "305419896")]
        seed: u32,
    },
}

fn frame_count(duration: f32, sample_rate: u32) -> anyhow::Result<usize> {
    if !(duration.is_finite() && duration > 0.0) {
        anyhow::bail!("duration must be positive, got {duration}");
    }
    if sample_rate == 0 {
        anyhow::bail!("sample rate must be non-zero");
    }
    Ok((duration * sample_rate as f32) as usize)
}

fn sine(freq: f32, amplitude: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    let step = std::f64::consts::TAU * f64::from(freq) / f64::from(sample_rate);
    (0..frames)
        .map(|n| amplitude * (step * n as f64).sin() as f32)
        .collect()
}

/// Xorshift32 white noise in [-1, 1).
struct Noise {
    state: u32,
}

impl Noise {
    fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let (output, samples, sample_rate) = match args.command {
        GenerateCommand::Sine {
            output,
            freq,
            duration,
            sample_rate,
            amplitude,
        } => {
            let frames = frame_count(duration, sample_rate)?;
            println!("Generating {freq} Hz sine, {duration}s at {sample_rate} Hz");
            let mono = sine(freq, amplitude, sample_rate, frames);
            (output, StereoSamples::from_mono(mono), sample_rate)
        }
        GenerateCommand::Noise {
            output,
            duration,
            sample_rate,
            amplitude,
            seed,
        } => {
            let frames = frame_count(duration, sample_rate)?;
            println!("Generating white noise, {duration}s at {sample_rate} Hz");
            let mut noise = Noise::new(seed);
            let (left, right) = (0..frames)
                .map(|_| (noise.next_sample() * amplitude, noise.next_sample() * amplitude))
                .unzip();
            (output, StereoSamples::new(left, right), sample_rate)
        }
    };

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav_stereo(&output, &samples, spec)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {} frames to {}", samples.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_bounded_and_seeded() {
        let mut a = Noise::new(7);
        let mut b = Noise::new(7);
        for _ in 0..1000 {
            let s = a.next_sample();
            assert!((-1.0..=1.0).contains(&s));
            assert_eq!(s, b.next_sample());
        }
    }

    #[test]
    fn zero_seed_still_moves() {
        let mut noise = Noise::new(0);
        assert_ne!(noise.next_sample(), noise.next_sample());
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(frame_count(0.0, 48000).is_err());
        assert!(frame_count(1.0, 0).is_err());
        assert_eq!(frame_count(0.5, 48000).unwrap(), 24000);
    }
}
