//! Windowed magnitude FFT.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Symmetric Hann window (raised cosine, zero at both ends)
    Hann,
}

impl Window {
    /// Window coefficients of length `size`.
    ///
    /// With `normalize`, coefficients are scaled to a mean of 1.0 so the
    /// window does not change the level of a stationary signal.
    pub fn coefficients(&self, size: usize, normalize: bool) -> Vec<f32> {
        let mut coeffs: Vec<f32> = match self {
            Window::Rectangular => vec![1.0; size],
            Window::Hann => {
                if size == 1 {
                    vec![1.0]
                } else {
                    let denom = (size - 1) as f32;
                    (0..size)
                        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / denom).cos())
                        .collect()
                }
            }
        };

        if normalize {
            let sum: f32 = coeffs.iter().sum();
            if sum > 0.0 {
                let scale = size as f32 / sum;
                for c in &mut coeffs {
                    *c *= scale;
                }
            }
        }
        coeffs
    }
}

/// Magnitude spectrum of fixed-length frames.
///
/// The frame length is fixed at construction; all buffers are allocated
/// there, so [`transform`](Self::transform) does not allocate.
///
/// # Example
///
/// ```rust
/// use bloodless_analysis::SpectralEstimator;
///
/// let mut estimator = SpectralEstimator::new(1024);
/// let frame = [0.0f32; 1024];
/// let magnitudes = estimator.transform(&frame);
/// assert_eq!(magnitudes.len(), 512);
/// ```
pub struct SpectralEstimator {
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectralEstimator {
    /// Create an estimator for frames of `frame_len` samples using a
    /// normalized Hann window.
    ///
    /// # Panics
    ///
    /// Panics if `frame_len` is less than 2.
    pub fn new(frame_len: usize) -> Self {
        Self::with_window(frame_len, Window::Hann)
    }

    /// Create an estimator with an explicit window (normalized to unit mean).
    ///
    /// # Panics
    ///
    /// Panics if `frame_len` is less than 2.
    pub fn with_window(frame_len: usize, window: Window) -> Self {
        assert!(frame_len >= 2, "frame length must be at least 2");

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_len);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft,
            window: window.coefficients(frame_len, true),
            buffer: vec![Complex::new(0.0, 0.0); frame_len],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            magnitudes: vec![0.0; frame_len / 2],
        }
    }

    /// Frame length in samples.
    pub fn frame_len(&self) -> usize {
        self.window.len()
    }

    /// Number of magnitude bins (`frame_len / 2`).
    pub fn bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Window, transform and return `frame_len / 2` linear magnitudes.
    ///
    /// Magnitudes are unnormalized: a full-scale sine centred on a bin reads
    /// about `frame_len / 2`.
    ///
    /// # Panics
    ///
    /// Panics if `frame.len()` differs from the construction frame length.
    pub fn transform(&mut self, frame: &[f32]) -> &[f32] {
        assert_eq!(
            frame.len(),
            self.window.len(),
            "frame length does not match estimator"
        );

        for ((slot, &x), &w) in self.buffer.iter_mut().zip(frame).zip(&self.window) {
            *slot = Complex::new(x * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (mag, c) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *mag = c.norm();
        }
        &self.magnitudes
    }

    /// Magnitudes from the last [`transform`](Self::transform).
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }
}

impl std::fmt::Debug for SpectralEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralEstimator")
            .field("frame_len", &self.frame_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_shape() {
        let w = Window::Hann.coefficients(9, false);
        assert!(w[0].abs() < 1e-7);
        assert!(w[8].abs() < 1e-7);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert!((w[2] - w[6]).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_window_has_unit_mean() {
        let w = Window::Hann.coefficients(1024, true);
        let mean = w.iter().sum::<f32>() / 1024.0;
        assert!((mean - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_sine_peak_bin() {
        let n = 1024;
        let mut estimator = SpectralEstimator::new(n);
        // Exactly bin 64.
        let frame: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 64.0 * i as f32 / n as f32).sin())
            .collect();
        let mags = estimator.transform(&frame);

        let peak = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 64);
        assert!((mags[64] - n as f32 / 2.0).abs() < n as f32 * 0.01);
        assert!(mags.iter().all(|&m| m >= 0.0));
    }

    #[test]
    fn test_rectangular_dc_lands_in_bin_zero() {
        assert_eq!(Window::Rectangular.coefficients(4, true), vec![1.0; 4]);
        let mut estimator = SpectralEstimator::with_window(64, Window::Rectangular);
        let mags = estimator.transform(&[0.5; 64]);
        assert!((mags[0] - 32.0).abs() < 1e-4);
        assert!(mags[1..].iter().all(|&m| m < 1e-4));
    }

    #[test]
    fn test_deterministic() {
        let mut estimator = SpectralEstimator::new(256);
        let frame: Vec<f32> = (0..256).map(|i| ((i * 7) % 13) as f32 / 13.0).collect();
        let first = estimator.transform(&frame).to_vec();
        let second = estimator.transform(&frame).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "frame length")]
    fn test_length_mismatch_panics() {
        let mut estimator = SpectralEstimator::new(256);
        estimator.transform(&[0.0; 128]);
    }
}
