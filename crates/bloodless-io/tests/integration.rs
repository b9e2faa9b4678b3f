//! Integration tests for bloodless-io WAV I/O and offline rendering.

use std::sync::Arc;

use bloodless_core::rms;
use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};
use bloodless_io::{
    Error, OfflineRenderer, StereoSamples, WavFormat, WavSpec, read_wav_info, read_wav_stereo,
    write_wav_stereo,
};
use tempfile::NamedTempFile;

fn sine_wave(sample_rate: u32, freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn write_raw(path: &std::path::Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as usize {
        writer.write_sample((i % 100) as i16 * 100).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn mono_file_is_expanded_to_stereo() {
    let file = NamedTempFile::new().unwrap();
    write_raw(file.path(), 1, 480);

    let (stereo, spec) = read_wav_stereo(file.path()).unwrap();
    assert_eq!(spec.channels, 1);
    assert_eq!(stereo.len(), 480);
    assert_eq!(stereo.left, stereo.right);
}

#[test]
fn multichannel_file_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    write_raw(file.path(), 4, 100);

    let err = read_wav_stereo(file.path()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedLayout(4)), "got {err}");
}

#[test]
fn info_reports_frames_and_format() {
    let file = NamedTempFile::new().unwrap();
    let samples = StereoSamples::from_mono(sine_wave(48000, 440.0, 24000));
    write_wav_stereo(file.path(), &samples, WavSpec::default()).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, 24000);
    assert_eq!(info.format, WavFormat::IeeeFloat);
    assert!((info.duration_secs - 0.5).abs() < 1e-9);
}

#[test]
fn missing_file_is_wav_error() {
    let err = read_wav_stereo("/definitely/not/here.wav").unwrap_err();
    assert!(matches!(err, Error::Wav(_)));
}

/// Read, render and write a file the way the CLI does.
#[test]
fn render_file_end_to_end() {
    let sr = 48000;
    let input_file = NamedTempFile::new().unwrap();
    let output_file = NamedTempFile::new().unwrap();
    let input = StereoSamples::from_mono(sine_wave(sr, 200.0, sr as usize / 2));
    write_wav_stereo(input_file.path(), &input, WavSpec::default()).unwrap();

    let (loaded, spec) = read_wav_stereo(input_file.path()).unwrap();
    let params = Arc::new(ParameterStore::new());
    params.set_threshold_db(36.0);
    params.set_cutoff_hz(8000.0);
    let (chain, _taps) =
        SignalChain::new(ChainConfig::new(spec.sample_rate as f32), params).unwrap();
    let mut renderer = OfflineRenderer::new(chain, 512).unwrap();
    let (output, summary) = renderer.render(&loaded, |_| {});
    write_wav_stereo(output_file.path(), &output, spec).unwrap();

    let (written, _) = read_wav_stereo(output_file.path()).unwrap();
    assert_eq!(written.len(), input.len());
    // 200 Hz sits far below the cutoff: removed from wet, kept in the output.
    let settled = &written.left[4096..];
    assert!((rms(settled) - rms(&input.left[4096..])).abs() < 0.01);
    assert!((summary.mean_dry_db + 3.01).abs() < 0.5);
    assert!(summary.blocks > 0);
}
