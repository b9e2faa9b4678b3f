//! Skewed frequency axis for spectrum display.
//!
//! Maps frequency to a 0..1 display position with
//!
//! ```text
//! position  = K1 * ln(K2 * f / nyquist + 1)
//! frequency = nyquist * (exp(position / K1) - 1) / K2
//! ```
//!
//! The constants are empirical; they put 0 Hz at 0 and Nyquist just above 1.
//! They must not be re-derived: scopes, gridlines and the cutoff marker all
//! rely on the exact values.

/// Outer scale of the skew.
pub const SKEW_K1: f32 = 0.164;
/// Inner scale of the skew.
pub const SKEW_K2: f32 = 443.158;

/// Frequencies (Hz) at which the display draws gridlines.
pub const GRIDLINE_FREQUENCIES: [f32; 7] = [80.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 10000.0];

/// Frequency ↔ display-position mapping for one sample rate.
///
/// # Example
///
/// ```rust
/// use bloodless_analysis::FrequencyAxis;
///
/// let axis = FrequencyAxis::new(48000.0);
/// let p = axis.to_position(1000.0);
/// assert!((axis.to_frequency(p) - 1000.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyAxis {
    nyquist: f32,
}

impl FrequencyAxis {
    /// Axis for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            nyquist: sample_rate / 2.0,
        }
    }

    /// Nyquist frequency in Hz.
    pub fn nyquist(&self) -> f32 {
        self.nyquist
    }

    /// Display position of a frequency.
    #[inline]
    pub fn to_position(&self, frequency_hz: f32) -> f32 {
        SKEW_K1 * libm::logf(SKEW_K2 * (frequency_hz / self.nyquist) + 1.0)
    }

    /// Frequency at a display position.
    #[inline]
    pub fn to_frequency(&self, position: f32) -> f32 {
        self.nyquist * Self::nyquist_ratio(position)
    }

    /// Fraction of Nyquist at a display position.
    #[inline]
    pub fn nyquist_ratio(position: f32) -> f32 {
        (libm::expf(position / SKEW_K1) - 1.0) / SKEW_K2
    }

    /// Linear FFT bin sampled at a display position.
    ///
    /// `bins` is the magnitude spectrum length (`frame_len / 2`). The result
    /// is truncated toward zero and clamped into `0..bins`.
    ///
    /// # Panics
    ///
    /// Panics if `bins` is zero.
    #[inline]
    pub fn bin_for_position(position: f32, bins: usize) -> usize {
        assert!(bins > 0, "spectrum must have at least one bin");
        let index = Self::nyquist_ratio(position) * bins as f32;
        if index.is_nan() || index <= 0.0 {
            0
        } else {
            (index as usize).min(bins - 1)
        }
    }

    /// Gridline frequencies paired with their display positions.
    pub fn gridlines(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        GRIDLINE_FREQUENCIES
            .iter()
            .map(move |&hz| (hz, self.to_position(hz)))
    }
}
