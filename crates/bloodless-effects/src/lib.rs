//! Bloodless Effects - the processing chain
//!
//! This crate assembles the bloodless processor from bloodless-core:
//!
//! - [`Compressor`] - Per-channel hard-knee compressor (8:1, 20 ms / 20 ms)
//! - [`HighPassBank`] - N series high-pass stages with a shared cutoff
//! - [`LevelTracker`] / [`LevelMeters`] - Block RMS in dB and its shared readout
//! - [`ParameterStore`] - Lock-free threshold, cutoff and bypass
//! - [`SignalChain`] - Compression, filtering and phase-inverted recombination
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};
//!
//! let params = Arc::new(ParameterStore::new());
//! let (mut chain, mut taps) = SignalChain::new(ChainConfig::new(48000.0), params.clone())?;
//!
//! params.set_threshold_db(-24.0);
//! params.set_cutoff_hz(800.0);
//!
//! let mut left = vec![0.0f32; 1024];
//! let mut right = vec![0.0f32; 1024];
//! chain.process(&mut left, &mut right);
//!
//! // Analysis side
//! assert!(taps.post_filter.consume().is_some());
//! let dry_db = taps.meters.dry_db();
//! # assert_eq!(dry_db, -60.0);
//! # Ok::<(), bloodless_effects::ChainError>(())
//! ```

pub mod chain;
pub mod compressor;
pub mod error;
pub mod filter_bank;
pub mod level;
pub mod params;

pub use chain::{
    AnalysisTaps, ChainConfig, DEFAULT_MAX_BLOCK_SIZE, MIN_SAMPLE_RATE, SignalChain,
    check_channel_layout, check_sample_rate,
};
pub use compressor::Compressor;
pub use error::ChainError;
pub use filter_bank::{DEFAULT_FILTER_STAGES, HighPassBank, MAX_FILTER_STAGES};
pub use level::{LevelMeters, LevelReading, LevelTracker, MeterRange};
pub use params::{
    AtomicParam, BYPASS_DEFAULT, CUTOFF_RANGE, ParamRange, ParamScale, ParamSnapshot,
    ParameterStore, THRESHOLD_RANGE,
};
