//! Error types for signal chain construction.

use thiserror::Error;

/// Errors raised while building or preparing a [`SignalChain`](crate::SignalChain).
///
/// All of these are configuration errors: they surface before processing
/// starts, never from the per-block path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    /// Sample rate is not finite or too low for the filter range
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Block capacity of zero
    #[error("maximum block size must be non-zero")]
    ZeroBlockSize,

    /// Filter stage count outside 1..=max
    #[error("filter stage count {stages} outside 1..={max}")]
    InvalidFilterStages {
        /// Requested stage count.
        stages: usize,
        /// Largest accepted stage count.
        max: usize,
    },

    /// Channel layout other than mono or stereo
    #[error("unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(usize),

    /// Meter floor not below ceiling, or a non-finite bound
    #[error("invalid meter range: floor {floor_db} dB, ceiling {ceiling_db} dB")]
    InvalidMeterRange {
        /// Requested floor.
        floor_db: f32,
        /// Requested ceiling.
        ceiling_db: f32,
    },
}
