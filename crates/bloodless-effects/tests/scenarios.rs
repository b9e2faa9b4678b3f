//! End-to-end scenarios for the signal chain.
//!
//! Drives the chain block by block as a host would, with the analysis taps
//! drained from a second thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bloodless_core::{ANALYSIS_FRAME_LEN, rms};
use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

fn sine_block(freq: f32, amplitude: f32, len: usize, offset: usize) -> Vec<f32> {
    (0..len)
        .map(|n| amplitude * libm::sinf(TAU * freq * (n + offset) as f32 / SAMPLE_RATE))
        .collect()
}

/// Unit sine, no compression, lowest cutoff: the wet path is near-transparent,
/// so the wet copy tracks the dry copy and the recombined output is a small
/// residual.
#[test]
fn transparent_settings_leave_small_residual() {
    let params = Arc::new(ParameterStore::new());
    params.set_threshold_db(36.0);
    params.set_cutoff_hz(20.0);
    params.set_bypass(false);
    let (mut chain, _taps) =
        SignalChain::new(ChainConfig::new(SAMPLE_RATE), Arc::clone(&params)).unwrap();

    let block_len = 1024;
    let mut last_residual = f32::MAX;
    let mut last_input_rms = 0.0;
    for block in 0..10 {
        let input = sine_block(12_000.0, 1.0, block_len, block * block_len);
        let mut left = input.clone();
        let mut right = input.clone();
        chain.process(&mut left, &mut right);

        // Output has the input's shape.
        assert_eq!(left.len(), block_len);
        assert_eq!(right.len(), block_len);
        assert_eq!(left, right);

        last_residual = rms(&left);
        last_input_rms = rms(&input);
    }

    // dry - output == wet, which must track the input closely.
    assert!(
        last_residual < 0.03 * last_input_rms,
        "residual {} for input rms {}",
        last_residual,
        last_input_rms
    );
    // No compression at +36 dB threshold: dry and wet meters agree.
    assert!((chain.dry_rms_db() - chain.wet_rms_db()).abs() < 1e-4);
    assert!((chain.dry_rms_db() + 3.01).abs() < 0.05);
}

/// A tone far below the cutoff is removed from the wet path, so it survives
/// recombination almost untouched.
#[test]
fn tone_below_cutoff_passes_through_recombination() {
    let params = Arc::new(ParameterStore::new());
    params.set_threshold_db(36.0);
    params.set_cutoff_hz(8000.0);
    let (mut chain, _taps) =
        SignalChain::new(ChainConfig::new(SAMPLE_RATE), Arc::clone(&params)).unwrap();

    let mut input = Vec::new();
    let mut output = Vec::new();
    for block in 0..4 {
        let block_in = sine_block(200.0, 0.5, 512, block * 512);
        let mut left = block_in.clone();
        let mut right = block_in.clone();
        chain.process(&mut left, &mut right);
        input.extend_from_slice(&block_in);
        output.extend_from_slice(&left);
    }

    let settled = 1024;
    let error: Vec<f32> = input[settled..]
        .iter()
        .zip(&output[settled..])
        .map(|(a, b)| a - b)
        .collect();
    assert!(rms(&error) < 1e-3, "error rms {}", rms(&error));
}

/// Parameters written from another thread take effect on a later block.
#[test]
fn parameter_updates_cross_threads() {
    let params = Arc::new(ParameterStore::new());
    let (mut chain, _taps) =
        SignalChain::new(ChainConfig::new(SAMPLE_RATE), Arc::clone(&params)).unwrap();

    let writer = Arc::clone(&params);
    std::thread::spawn(move || writer.set_bypass(true))
        .join()
        .unwrap();

    let input = sine_block(1000.0, 0.8, 256, 0);
    let mut left = input.clone();
    let mut right = input.clone();
    chain.process(&mut left, &mut right);
    assert!(chain.current_params().bypass);
    assert_eq!(left, input);
}

/// The audio thread runs the chain while an analysis thread polls the taps.
/// Every published frame is either consumed or counted as dropped.
#[test]
fn analysis_thread_accounts_for_every_frame() {
    let params = Arc::new(ParameterStore::new());
    let (mut chain, mut taps) =
        SignalChain::new(ChainConfig::new(SAMPLE_RATE), Arc::clone(&params)).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let done_reader = Arc::clone(&done);
    let reader = std::thread::spawn(move || {
        let mut received = 0u64;
        loop {
            let finished = done_reader.load(Ordering::Acquire);
            if let Some(frame) = taps.post_filter.consume() {
                assert_eq!(frame.len(), ANALYSIS_FRAME_LEN);
                assert!(frame.iter().all(|s| s.is_finite()));
                received += 1;
            }
            if finished && !taps.post_filter.is_ready() {
                break;
            }
            std::thread::yield_now();
        }
        (received, taps)
    });

    let blocks = 64;
    for block in 0..blocks {
        let mut left = sine_block(3000.0, 0.7, 512, block * 512);
        let mut right = left.clone();
        chain.process(&mut left, &mut right);
    }
    done.store(true, Ordering::Release);

    let (received, taps) = reader.join().unwrap();
    let published = (blocks * 512 / ANALYSIS_FRAME_LEN) as u64;
    assert_eq!(chain.frames_published(), (published, published));
    assert!(received >= 1);
    assert_eq!(
        taps.post_filter.frames_consumed() + taps.post_filter.frames_dropped(),
        published
    );
}
