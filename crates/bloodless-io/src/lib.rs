//! Audio file I/O and offline rendering for bloodless.
//!
//! - **WAV file I/O**: [`read_wav_stereo`] and [`write_wav_stereo`]; mono
//!   files are expanded to stereo
//! - **Offline rendering**: [`OfflineRenderer`] drives a
//!   [`SignalChain`](bloodless_effects::SignalChain) block by block, the way
//!   a host's audio callback would
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bloodless_effects::{ChainConfig, ParameterStore, SignalChain};
//! use bloodless_io::{OfflineRenderer, read_wav_stereo, write_wav_stereo};
//!
//! let (input, spec) = read_wav_stereo("input.wav")?;
//! let params = Arc::new(ParameterStore::new());
//! let (chain, _taps) = SignalChain::new(ChainConfig::new(spec.sample_rate as f32), params)?;
//!
//! let mut renderer = OfflineRenderer::new(chain, 512)?;
//! let (output, summary) = renderer.render(&input, |_| {});
//! println!("wet level {:.1} dB", summary.mean_wet_db);
//!
//! write_wav_stereo("output.wav", &output, spec)?;
//! # Ok::<(), bloodless_io::Error>(())
//! ```

mod render;
mod wav;

pub use render::{BlockReport, OfflineRenderer, RenderSummary};
pub use wav::{
    StereoSamples, SUPPORTED_BIT_DEPTHS, WavFormat, WavInfo, WavSpec, read_wav_info,
    read_wav_stereo, write_wav_stereo,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// File has a channel layout the processor does not accept.
    #[error("unsupported channel layout: {0} channels (expected mono or stereo)")]
    UnsupportedLayout(u16),

    /// Requested output bit depth is not supported.
    #[error("unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Signal chain could not be prepared.
    #[error("signal chain error: {0}")]
    Chain(#[from] bloodless_effects::ChainError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
