//! Magnitude spectrum → display points in dB.
//!
//! A linear-frequency magnitude spectrum is resampled onto the skewed
//! [`FrequencyAxis`](crate::FrequencyAxis): display point `i` of `M` samples
//! the bin under position `i / M` (non-uniform decimation, no interpolation).
//! Each sampled magnitude becomes
//!
//! ```text
//! level = dB(mag) - dB(frame_len) + dB(512) + 0.05 * i
//! ```
//!
//! where `dB` floors at -100 dB. The `0.05 * i` term tilts the display
//! upward toward high frequencies. Levels are clamped into the scope range.

use bloodless_core::{MINUS_INFINITY_DB, gain_to_db};

use crate::axis::FrequencyAxis;

/// Default number of display points.
pub const DEFAULT_SCOPE_POINTS: usize = 512;

/// Reference magnitude offset of the level formula.
const REFERENCE_GAIN: f32 = 512.0;
/// Upward tilt per display point in dB.
const TILT_DB_PER_POINT: f32 = 0.05;

/// Vertical range of the spectrum display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeRange {
    /// Lowest displayed level.
    pub floor_db: f32,
    /// Highest displayed level.
    pub ceiling_db: f32,
}

impl Default for ScopeRange {
    fn default() -> Self {
        Self {
            floor_db: -96.0,
            ceiling_db: 36.0,
        }
    }
}

/// Converts magnitude spectra into fixed-length dB display curves.
///
/// # Example
///
/// ```rust
/// use bloodless_analysis::{ScopeRange, SpectrumScope};
///
/// let scope = SpectrumScope::new(512, 1024, ScopeRange::default());
/// let silence = vec![0.0f32; 512];
/// let points = scope.render(&silence);
/// assert_eq!(points[0], -96.0);
/// assert!(points.iter().all(|&db| db < -80.0));
/// ```
#[derive(Debug, Clone)]
pub struct SpectrumScope {
    bin_map: Vec<usize>,
    frame_offset_db: f32,
    range: ScopeRange,
    bins: usize,
}

impl SpectrumScope {
    /// Scope of `points` display points for spectra of `frame_len / 2` bins.
    ///
    /// # Panics
    ///
    /// Panics if `points` is zero, `frame_len` is below 2, or the range is
    /// inverted.
    pub fn new(points: usize, frame_len: usize, range: ScopeRange) -> Self {
        assert!(points > 0, "scope needs at least one point");
        assert!(frame_len >= 2, "frame length must be at least 2");
        assert!(
            range.floor_db < range.ceiling_db,
            "scope floor must be below ceiling"
        );

        let bins = frame_len / 2;
        let bin_map = (0..points)
            .map(|i| FrequencyAxis::bin_for_position(i as f32 / points as f32, bins))
            .collect();
        let frame_offset_db = gain_to_db(REFERENCE_GAIN, MINUS_INFINITY_DB)
            - gain_to_db(frame_len as f32, MINUS_INFINITY_DB);

        Self {
            bin_map,
            frame_offset_db,
            range,
            bins,
        }
    }

    /// Number of display points.
    pub fn points(&self) -> usize {
        self.bin_map.len()
    }

    /// Expected magnitude spectrum length.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Display range.
    pub fn range(&self) -> ScopeRange {
        self.range
    }

    /// Spectrum bin sampled by each display point.
    pub fn bin_map(&self) -> &[usize] {
        &self.bin_map
    }

    /// Render into a caller-provided slice of [`points`](Self::points) values.
    ///
    /// # Panics
    ///
    /// Panics if `magnitudes` is not [`bins`](Self::bins) long or `out` is
    /// not [`points`](Self::points) long.
    pub fn render_into(&self, magnitudes: &[f32], out: &mut [f32]) {
        assert_eq!(magnitudes.len(), self.bins, "spectrum length mismatch");
        assert_eq!(out.len(), self.bin_map.len(), "scope length mismatch");

        for (i, (slot, &bin)) in out.iter_mut().zip(&self.bin_map).enumerate() {
            let level = gain_to_db(magnitudes[bin], MINUS_INFINITY_DB)
                + self.frame_offset_db
                + i as f32 * TILT_DB_PER_POINT;
            *slot = level.clamp(self.range.floor_db, self.range.ceiling_db);
        }
    }

    /// Render into a new vector.
    pub fn render(&self, magnitudes: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; self.points()];
        self.render_into(magnitudes, &mut out);
        out
    }
}
