//! Bloodless Analysis - spectrum estimation and display mapping
//!
//! This crate runs on the analysis/display side of the processor:
//!
//! - [`fft`] - Hann-windowed magnitude FFT ([`SpectralEstimator`])
//! - [`axis`] - Skewed frequency axis ([`FrequencyAxis`]) and gridlines
//! - [`scope`] - Magnitude spectrum to dB display curve ([`SpectrumScope`])
//! - [`analyzer`] - Polls the chain's fifo taps and keeps the latest curves
//!
//! ## Example
//!
//! ```rust
//! use bloodless_analysis::{FrequencyAxis, ScopeRange, SpectralEstimator, SpectrumScope};
//!
//! let mut estimator = SpectralEstimator::new(1024);
//! let scope = SpectrumScope::new(512, 1024, ScopeRange::default());
//!
//! let frame: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.2).sin()).collect();
//! let curve = scope.render(estimator.transform(&frame));
//! assert_eq!(curve.len(), 512);
//!
//! let axis = FrequencyAxis::new(48000.0);
//! let marker = axis.to_position(4000.0);
//! assert!(marker > 0.0 && marker < 1.0);
//! ```

pub mod analyzer;
pub mod axis;
pub mod fft;
pub mod scope;

pub use analyzer::{Analyzer, DISPLAY_SMOOTHING, PollOutcome, Tap, TapStats};
pub use axis::{FrequencyAxis, GRIDLINE_FREQUENCIES, SKEW_K1, SKEW_K2};
pub use fft::{SpectralEstimator, Window};
pub use scope::{DEFAULT_SCOPE_POINTS, ScopeRange, SpectrumScope};
