//! Phase-cancelling compressor/high-pass signal chain.
//!
//! # Signal Flow
//!
//! ```text
//!            ┌──────────────────────────────── dry ─────────────────────┐
//! input ─────┤                                                          (+)── output
//!            └─ wet ─ Compressor ─┬─ HighPassBank ─┬─ × -1 ─────────────┘
//!                                 │                │
//!                        post-compression     post-filter
//!                          fifo (mono)        fifo (mono)
//! ```
//!
//! The output is `dry - wet`: whatever the compressor and filters leave
//! unchanged cancels, and only their difference signal remains. With bypass
//! engaged the output is the dry input, bit for bit. Bypass does not stop the
//! wet path, so meters, fifos and filter state keep running.
//!
//! Parameters are read from the shared [`ParameterStore`] once at the start
//! of every [`process`](SignalChain::process) call; updates made during a
//! block apply from the next one.

use std::sync::Arc;

use bloodless_core::{
    ANALYSIS_FRAME_LEN, FifoConsumer, FifoProducer, StereoEffect, mono_sum, sample_fifo,
};

use crate::compressor::Compressor;
use crate::error::ChainError;
use crate::filter_bank::{DEFAULT_FILTER_STAGES, HighPassBank, MAX_FILTER_STAGES};
use crate::level::{LevelMeters, LevelTracker, MeterRange};
use crate::params::{CUTOFF_RANGE, ParamSnapshot, ParameterStore};

/// Default per-call block capacity.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4096;

/// Lowest sample rate whose stable filter range still reaches the lowest cutoff.
pub const MIN_SAMPLE_RATE: f32 = CUTOFF_RANGE.min / 0.49;

/// Construction-time settings of a [`SignalChain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block processed in one pass. Longer calls are split.
    pub max_block_size: usize,
    /// Number of series high-pass stages.
    pub filter_stages: usize,
    /// Clamp range of the dry/wet level readings.
    pub meter_range: MeterRange,
}

impl ChainConfig {
    /// Default configuration at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            filter_stages: DEFAULT_FILTER_STAGES,
            meter_range: MeterRange::default(),
        }
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ChainError> {
        check_sample_rate(self.sample_rate)?;
        if self.max_block_size == 0 {
            return Err(ChainError::ZeroBlockSize);
        }
        if self.filter_stages == 0 || self.filter_stages > MAX_FILTER_STAGES {
            return Err(ChainError::InvalidFilterStages {
                stages: self.filter_stages,
                max: MAX_FILTER_STAGES,
            });
        }
        MeterRange::new(self.meter_range.floor_db, self.meter_range.ceiling_db)?;
        Ok(())
    }
}

/// Check that a sample rate is finite and high enough for the filter range.
///
/// The high-pass stages cap their cutoff at 0.49 × the sample rate, so rates
/// below [`MIN_SAMPLE_RATE`] leave no room for the lowest cutoff.
pub fn check_sample_rate(sample_rate: f32) -> Result<(), ChainError> {
    if sample_rate.is_finite() && sample_rate >= MIN_SAMPLE_RATE {
        Ok(())
    } else {
        Err(ChainError::InvalidSampleRate(sample_rate))
    }
}

/// Check that an input layout can be fed to the chain.
///
/// Stereo is processed directly; mono is accepted when the caller duplicates
/// it to both channels.
pub fn check_channel_layout(channels: usize) -> Result<(), ChainError> {
    match channels {
        1 | 2 => Ok(()),
        n => Err(ChainError::UnsupportedChannels(n)),
    }
}

/// Consumer ends handed to the analysis/display context.
#[derive(Debug)]
pub struct AnalysisTaps {
    /// Mono frames of the compressed wet signal, before filtering.
    pub post_compression: FifoConsumer<ANALYSIS_FRAME_LEN>,
    /// Mono frames of the wet signal after the high-pass bank.
    pub post_filter: FifoConsumer<ANALYSIS_FRAME_LEN>,
    /// Latest dry/wet RMS readings.
    pub meters: Arc<LevelMeters>,
}

/// The audio-context processor.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};
///
/// let params = Arc::new(ParameterStore::new());
/// let (mut chain, _taps) = SignalChain::new(ChainConfig::new(48000.0), params.clone())?;
///
/// params.set_bypass(true);
/// let mut left = vec![0.25; 256];
/// let mut right = vec![-0.25; 256];
/// chain.process(&mut left, &mut right);
/// assert!(left.iter().all(|&s| s == 0.25));
/// # Ok::<(), bloodless_effects::ChainError>(())
/// ```
pub struct SignalChain {
    params: Arc<ParameterStore>,
    current: ParamSnapshot,

    compressor: Compressor,
    filters: HighPassBank,

    dry_level: LevelTracker,
    wet_level: LevelTracker,
    meters: Arc<LevelMeters>,

    post_compression: FifoProducer<ANALYSIS_FRAME_LEN>,
    post_filter: FifoProducer<ANALYSIS_FRAME_LEN>,

    dry: [Vec<f32>; 2],
    wet: [Vec<f32>; 2],

    config: ChainConfig,
}

impl SignalChain {
    /// Build a chain and the analysis taps that read from it.
    ///
    /// All working buffers are allocated here.
    pub fn new(
        config: ChainConfig,
        params: Arc<ParameterStore>,
    ) -> Result<(Self, AnalysisTaps), ChainError> {
        config.validate()?;

        let current = params.snapshot();
        let mut compressor = Compressor::new(config.sample_rate);
        compressor.set_threshold_db(current.threshold_db);
        let mut filters = HighPassBank::new(config.sample_rate, config.filter_stages);
        filters.set_cutoff(current.cutoff_hz);

        let (post_compression, post_compression_rx) = sample_fifo::<ANALYSIS_FRAME_LEN>();
        let (post_filter, post_filter_rx) = sample_fifo::<ANALYSIS_FRAME_LEN>();
        let meters = Arc::new(LevelMeters::new(config.meter_range.floor_db));

        let capacity = config.max_block_size;

        tracing::debug!(
            sample_rate = config.sample_rate,
            max_block_size = capacity,
            filter_stages = config.filter_stages,
            threshold_db = current.threshold_db,
            cutoff_hz = current.cutoff_hz,
            "signal chain prepared"
        );

        let chain = Self {
            params,
            current,
            compressor,
            filters,
            dry_level: LevelTracker::new(config.meter_range),
            wet_level: LevelTracker::new(config.meter_range),
            meters: Arc::clone(&meters),
            post_compression,
            post_filter,
            dry: [vec![0.0; capacity], vec![0.0; capacity]],
            wet: [vec![0.0; capacity], vec![0.0; capacity]],
            config,
        };
        let taps = AnalysisTaps {
            post_compression: post_compression_rx,
            post_filter: post_filter_rx,
            meters,
        };
        Ok((chain, taps))
    }

    /// Process a split-channel stereo block in place.
    ///
    /// # Panics
    ///
    /// Panics if `left` and `right` differ in length.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        assert_eq!(
            left.len(),
            right.len(),
            "left and right buffers must have the same length"
        );
        self.begin_block();

        let capacity = self.config.max_block_size;
        for (l, r) in left.chunks_mut(capacity).zip(right.chunks_mut(capacity)) {
            let n = l.len();
            self.dry[0][..n].copy_from_slice(l);
            self.dry[1][..n].copy_from_slice(r);
            self.run(n);
            l.copy_from_slice(&self.wet[0][..n]);
            r.copy_from_slice(&self.wet[1][..n]);
        }

        self.end_block();
    }

    /// Process an interleaved stereo block (`L R L R ...`) in place.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length is odd.
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        assert!(
            buffer.len() % 2 == 0,
            "interleaved stereo buffer must have an even length"
        );
        self.begin_block();

        let capacity = self.config.max_block_size;
        for chunk in buffer.chunks_mut(capacity * 2) {
            let n = chunk.len() / 2;
            for (i, frame) in chunk.chunks_exact(2).enumerate() {
                self.dry[0][i] = frame[0];
                self.dry[1][i] = frame[1];
            }
            self.run(n);
            for (i, frame) in chunk.chunks_exact_mut(2).enumerate() {
                frame[0] = self.wet[0][i];
                frame[1] = self.wet[1][i];
            }
        }

        self.end_block();
    }

    fn begin_block(&mut self) {
        let snapshot = self.params.snapshot();
        if snapshot.threshold_db != self.current.threshold_db {
            self.compressor.set_threshold_db(snapshot.threshold_db);
        }
        if snapshot.cutoff_hz != self.current.cutoff_hz {
            self.filters.set_cutoff(snapshot.cutoff_hz);
        }
        self.current = snapshot;
    }

    fn end_block(&mut self) {
        let dry_db = self.dry_level.finish_block();
        let wet_db = self.wet_level.finish_block();
        self.meters.publish(dry_db, wet_db);
    }

    /// Run `n` frames from `dry` through the wet path; the output lands in `wet`.
    fn run(&mut self, n: usize) {
        let [dry_l, dry_r] = &self.dry;
        let [wet_l, wet_r] = &mut self.wet;
        let (dry_l, dry_r) = (&dry_l[..n], &dry_r[..n]);
        let (wet_l, wet_r) = (&mut wet_l[..n], &mut wet_r[..n]);

        wet_l.copy_from_slice(dry_l);
        wet_r.copy_from_slice(dry_r);

        self.compressor.process_block_stereo_inplace(wet_l, wet_r);

        self.dry_level.accumulate(dry_l, dry_r);
        self.wet_level.accumulate(wet_l, wet_r);

        for (&l, &r) in wet_l.iter().zip(wet_r.iter()) {
            self.post_compression.push(mono_sum(l, r));
        }

        self.filters.process_block_stereo_inplace(wet_l, wet_r);

        for (&l, &r) in wet_l.iter().zip(wet_r.iter()) {
            self.post_filter.push(mono_sum(l, r));
        }

        if self.current.bypass {
            wet_l.copy_from_slice(dry_l);
            wet_r.copy_from_slice(dry_r);
        } else {
            for (w, &d) in wet_l.iter_mut().zip(dry_l) {
                *w = d - *w;
            }
            for (w, &d) in wet_r.iter_mut().zip(dry_r) {
                *w = d - *w;
            }
        }
    }

    /// Clear compressor envelopes, filter memory and partial fifo frames.
    ///
    /// Not called between blocks; use between unrelated renders.
    pub fn reset(&mut self) {
        self.compressor.reset();
        self.filters.reset();
        self.dry_level.reset();
        self.wet_level.reset();
        self.post_compression.clear();
        self.post_filter.clear();
    }

    /// Change the sample rate, keeping parameters.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<(), ChainError> {
        check_sample_rate(sample_rate)?;
        self.config.sample_rate = sample_rate;
        self.compressor.set_sample_rate(sample_rate);
        self.filters.set_sample_rate(sample_rate);
        tracing::debug!(sample_rate, "signal chain sample rate changed");
        Ok(())
    }

    /// Dry level of the last block in dB.
    pub fn dry_rms_db(&self) -> f32 {
        self.dry_level.last_db()
    }

    /// Compressed wet level of the last block in dB.
    pub fn wet_rms_db(&self) -> f32 {
        self.wet_level.last_db()
    }

    /// Compressor gain reduction at the end of the last block, in dB.
    pub fn gain_reduction_db(&self) -> f32 {
        self.compressor.gain_reduction_db()
    }

    /// Parameters applied to the last block.
    pub fn current_params(&self) -> ParamSnapshot {
        self.current
    }

    /// Shared parameter store.
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// Shared level meters.
    pub fn meters(&self) -> &Arc<LevelMeters> {
        &self.meters
    }

    /// Construction settings (with the current sample rate).
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Frames published on the (post-compression, post-filter) taps.
    pub fn frames_published(&self) -> (u64, u64) {
        (
            self.post_compression.frames_published(),
            self.post_filter.frames_published(),
        )
    }
}

impl core::fmt::Debug for SignalChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignalChain")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("dry_rms_db", &self.dry_rms_db())
            .field("wet_rms_db", &self.wet_rms_db())
            .finish_non_exhaustive()
    }
}
